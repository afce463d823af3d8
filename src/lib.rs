pub mod datatypes;
pub mod error;
pub mod loader;
pub mod options;
mod utils;

pub use datatypes::*;
pub use error::{AtlasError, ErrorKind, Section};
pub use loader::{AtlasLoader, load};
pub use options::{Backing, LoadOptions};
pub use utils::{FRAME_RECORD_SIZE, HEADER_SIZE, MAGIC, TEXTURE_RECORD_SIZE};
