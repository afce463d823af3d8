#![allow(dead_code)]

#[path = "../../src/utils/fixtures.rs"]
mod fixtures;

pub use fixtures::*;

use std::path::{Path, PathBuf};

/// Writes `bytes` to `name` inside `dir` and returns the full path.
pub fn write_map(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write map file");
    path
}
