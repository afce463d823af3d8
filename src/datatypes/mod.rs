pub mod atlas;
pub mod json_map;

pub use atlas::*;
pub use json_map::*;
