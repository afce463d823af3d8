use std::{fmt, path::PathBuf};

use thiserror::Error;

/// One of the three sections a map file header points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Textures,
    Strings,
    Frames,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Textures => f.write_str("texture section"),
            Section::Strings => f.write_str("string section"),
            Section::Frames => f.write_str("frame section"),
        }
    }
}

/// Fieldless mirror of [`AtlasError`], handy for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IoOpenFailed,
    Io,
    TruncatedHeader,
    BadMagic,
    TruncatedTextureRecord,
    TruncatedStringSection,
    TruncatedFrameSection,
    OutOfBounds,
    SectionTooLarge,
    InvalidName,
    NotFound,
    Options,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AtlasError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("map file is shorter than its {need}-byte header ({have} bytes)")]
    TruncatedHeader { need: usize, have: usize },

    #[error("invalid header magic {found:#010x} (expected {expected:#010x})")]
    BadMagic { expected: u32, found: u32 },

    #[error("texture record {index} is truncated")]
    TruncatedTextureRecord { index: u32 },

    #[error("string section is truncated (need {expected} bytes, have {actual})")]
    TruncatedStringSection { expected: u32, actual: usize },

    #[error("frame section is truncated (need {expected} bytes, have {actual})")]
    TruncatedFrameSection { expected: u32, actual: usize },

    #[error("texture {texture} reaches byte {end} of the {section}, which holds {len} bytes")]
    OutOfBounds {
        texture: usize,
        section: Section,
        end: u64,
        len: usize,
    },

    #[error("{section} is {len} bytes, over the {limit}-byte limit")]
    SectionTooLarge { section: Section, len: u32, limit: u32 },

    #[error("texture {texture} has a name at string offset {offset} that is not valid UTF-8")]
    InvalidName { texture: usize, offset: u32 },

    #[error("texture \"{name}\" not found")]
    NotFound { name: String },

    #[error("failed to parse load options {}: {source}", .path.display())]
    Options {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl AtlasError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtlasError::Open { .. } => ErrorKind::IoOpenFailed,
            AtlasError::Io(_) => ErrorKind::Io,
            AtlasError::TruncatedHeader { .. } => ErrorKind::TruncatedHeader,
            AtlasError::BadMagic { .. } => ErrorKind::BadMagic,
            AtlasError::TruncatedTextureRecord { .. } => ErrorKind::TruncatedTextureRecord,
            AtlasError::TruncatedStringSection { .. } => ErrorKind::TruncatedStringSection,
            AtlasError::TruncatedFrameSection { .. } => ErrorKind::TruncatedFrameSection,
            AtlasError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            AtlasError::SectionTooLarge { .. } => ErrorKind::SectionTooLarge,
            AtlasError::InvalidName { .. } => ErrorKind::InvalidName,
            AtlasError::NotFound { .. } => ErrorKind::NotFound,
            AtlasError::Options { .. } => ErrorKind::Options,
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
