pub mod mapfile;
pub mod source;

#[cfg(test)]
pub(crate) mod fixtures;

pub use mapfile::*;
pub use source::*;
