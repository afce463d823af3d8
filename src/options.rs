use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

/// How the loader gets at the bytes of a map file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backing {
    /// Seek and read through a buffered file handle.
    #[default]
    Buffered,
    /// Memory-map the file and parse the mapped bytes.
    Mapped,
}

/// Tunables for [`AtlasLoader`](crate::AtlasLoader).
///
/// Every field has a default, so an options file only needs the keys it
/// changes:
///
/// ```json
/// { "max_section_len": 1048576, "backing": "mapped" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Largest section, in bytes, the loader will accept.
    pub max_section_len: u32,
    /// Reject names that run to the end of the string section without a NUL.
    pub require_nul_terminator: bool,
    pub backing: Backing,
}

pub const DEFAULT_MAX_SECTION_LEN: u32 = 64 * 1024 * 1024;

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_section_len: DEFAULT_MAX_SECTION_LEN,
            require_nul_terminator: false,
            backing: Backing::Buffered,
        }
    }
}

impl LoadOptions {
    pub fn from_json_str(path: &Path, json: &str) -> Result<Self, AtlasError> {
        serde_json::from_str(json).map_err(|source| AtlasError::Options {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AtlasError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(path, &json)
    }

    pub fn with_backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    pub fn with_max_section_len(mut self, max_section_len: u32) -> Self {
        self.max_section_len = max_section_len;
        self
    }

    pub fn with_nul_terminator_required(mut self, required: bool) -> Self {
        self.require_nul_terminator = required;
        self
    }
}
