use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeMap};

use super::{Atlas, Texture};

/// JSON view of an atlas in the companion `.map` JSON layout:
/// `{ "name": [[x, y, width, height], ...], ... }`.
///
/// Keys follow texture order. A name used by several textures appears once,
/// where it first occurs, holding the frames of the last texture with that
/// name, so the output is always a valid JSON object. `y` is measured from the bottom edge of the
/// atlas, as image formats with a bottom-left origin expect.
pub struct JsonMap<'a> {
    atlas_height: u32,
    textures: Vec<&'a Texture>,
}

impl<'a> JsonMap<'a> {
    pub fn new(atlas: &'a Atlas) -> Self {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut textures: Vec<&'a Texture> = Vec::with_capacity(atlas.len());
        for texture in atlas {
            match slots.get(texture.name()) {
                Some(&slot) => textures[slot] = texture,
                None => {
                    slots.insert(texture.name(), textures.len());
                    textures.push(texture);
                }
            }
        }

        Self {
            atlas_height: atlas.height(),
            textures,
        }
    }

    /// A map holding just `texture`.
    pub fn single(atlas: &Atlas, texture: &'a Texture) -> Self {
        Self {
            atlas_height: atlas.height(),
            textures: vec![texture],
        }
    }
}

impl Serialize for JsonMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.textures.len()))?;
        for texture in &self.textures {
            let frames: Vec<[i64; 4]> = texture
                .frames()
                .iter()
                .map(|frame| {
                    [
                        i64::from(frame.x),
                        frame.flipped_y(self.atlas_height),
                        i64::from(frame.width),
                        i64::from(frame.height),
                    ]
                })
                .collect();
            map.serialize_entry(texture.name(), &frames)?;
        }
        map.end()
    }
}
