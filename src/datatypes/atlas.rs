use std::{fmt, ops::Range, sync::Arc};

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{error::AtlasError, utils::FrameRecord};

/// One rectangle of the atlas image, in atlas pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Frame {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Top edge measured from the bottom of an atlas `atlas_height` pixels
    /// tall. Negative when the frame pokes above the atlas.
    pub fn flipped_y(&self, atlas_height: u32) -> i64 {
        i64::from(atlas_height) - i64::from(self.y) - i64::from(self.height)
    }
}

impl From<FrameRecord> for Frame {
    fn from(record: FrameRecord) -> Self {
        Self::new(record.x, record.y, record.width, record.height)
    }
}

/// A named sprite made of one or more frames, in animation order.
///
/// Names and frames live in pools shared by every texture of the atlas they
/// were loaded from; a texture only holds its range into each pool.
#[derive(Clone, Default)]
pub struct Texture {
    pub(crate) names: Arc<str>,
    pub(crate) name: Range<usize>,
    pub(crate) frame_pool: Arc<[Frame]>,
    pub(crate) frames: Range<usize>,
}

impl Texture {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        let names: Arc<str> = Arc::from(name.into());
        let frame_pool: Arc<[Frame]> = Arc::from(frames);
        Self {
            name: 0..names.len(),
            names,
            frames: 0..frame_pool.len(),
            frame_pool,
        }
    }

    pub fn name(&self) -> &str {
        &self.names[self.name.clone()]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frame_pool[self.frames.clone()]
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames().get(index)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("name", &self.name())
            .field("frames", &self.frames())
            .finish()
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.frames() == other.frames()
    }
}

impl Eq for Texture {}

impl Serialize for Texture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Texture", 2)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("frames", self.frames())?;
        state.end()
    }
}

////////////////////////////////////////////////
/// Atlas
/// * Read-only metadata for one packed atlas image: its size and the
///   textures packed into it, in file order.
///
/// * Built in one piece by [`AtlasLoader`](crate::AtlasLoader); there is no
///   way to observe a half-loaded atlas.
/// * Owns every name and frame. Dropping it releases them all.
////////////////////////////////////////////////
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Atlas {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) textures: Vec<Texture>,
}

impl Atlas {
    pub fn new(width: u32, height: u32, textures: Vec<Texture>) -> Self {
        Self {
            width,
            height,
            textures,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.textures.get(index)
    }

    /// Number of textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Texture> {
        self.textures.iter()
    }

    /// First texture whose name matches `name` byte for byte.
    pub fn lookup(&self, name: &str) -> Option<&Texture> {
        self.textures.iter().find(|texture| texture.name() == name)
    }

    /// Same as [`Atlas::lookup`], but a miss is an [`AtlasError::NotFound`].
    pub fn find(&self, name: &str) -> Result<&Texture, AtlasError> {
        self.lookup(name).ok_or_else(|| AtlasError::NotFound {
            name: name.to_string(),
        })
    }
}

impl<'a> IntoIterator for &'a Atlas {
    type Item = &'a Texture;
    type IntoIter = std::slice::Iter<'a, Texture>;

    fn into_iter(self) -> Self::IntoIter {
        self.textures.iter()
    }
}

/// Free-function form of [`Atlas::lookup`].
pub fn lookup<'a>(atlas: &'a Atlas, name: &str) -> Option<&'a Texture> {
    atlas.lookup(name)
}
