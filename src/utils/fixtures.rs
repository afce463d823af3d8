//! Test-only map file builder. Lays sections out the way the atlas packer
//! does: header, texture records, strings, frames.

#![allow(dead_code)]

pub const MAGIC_OFFSET: usize = 0;
pub const NUM_TEXTURES_OFFSET: usize = 12;
pub const TEX_LEN_OFFSET: usize = 20;
pub const STR_LEN_OFFSET: usize = 28;
pub const FRM_LEN_OFFSET: usize = 36;

/// Byte offset of texture record `index`, field `field` (0 name, 1 frames, 2 offset).
pub fn record_field_offset(index: usize, field: usize) -> usize {
    40 + index * 12 + field * 4
}

pub fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[derive(Clone, Debug, Default)]
pub struct MapBuilder {
    width: u32,
    height: u32,
    textures: Vec<(Vec<u8>, Vec<[u32; 4]>)>,
}

impl MapBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            textures: Vec::new(),
        }
    }

    /// Frames are `[x, y, width, height]`.
    pub fn texture(self, name: &str, frames: &[[u32; 4]]) -> Self {
        self.raw_texture(name.as_bytes(), frames)
    }

    pub fn raw_texture(mut self, name: &[u8], frames: &[[u32; 4]]) -> Self {
        self.textures.push((name.to_vec(), frames.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let tex_off = 40u32;
        let tex_len = (self.textures.len() * 12) as u32;
        let str_off = tex_off + tex_len;
        let str_len: u32 = self
            .textures
            .iter()
            .map(|(name, _)| name.len() as u32 + 1)
            .sum();
        let frm_off = str_off + str_len;
        let frm_len: u32 = self
            .textures
            .iter()
            .map(|(_, frames)| frames.len() as u32 * 16)
            .sum();

        let mut out = Vec::new();
        out.extend_from_slice(b"TEXA");
        for word in [
            self.width,
            self.height,
            self.textures.len() as u32,
            tex_off,
            tex_len,
            str_off,
            str_len,
            frm_off,
            frm_len,
        ] {
            out.extend_from_slice(&word.to_le_bytes());
        }

        let mut name_offset = 0u32;
        let mut frames_offset = 0u32;
        for (name, frames) in &self.textures {
            for word in [name_offset, frames.len() as u32, frames_offset] {
                out.extend_from_slice(&word.to_le_bytes());
            }
            name_offset += name.len() as u32 + 1;
            frames_offset += frames.len() as u32 * 16;
        }

        for (name, _) in &self.textures {
            out.extend_from_slice(name);
            out.push(0);
        }

        for (_, frames) in &self.textures {
            for frame in frames {
                for word in frame {
                    out.extend_from_slice(&word.to_le_bytes());
                }
            }
        }

        out
    }
}

/// The single-texture "hero" map: 256x256, one 32x32 frame at the origin,
/// string section padded to six bytes.
pub fn hero_map() -> Vec<u8> {
    let mut out = Vec::new();
    for word in [0x4158_4554u32, 256, 256, 1, 40, 12, 52, 6, 58, 16] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    for word in [0u32, 1, 0] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.extend_from_slice(b"hero\0\0");
    for word in [0u32, 0, 32, 32] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}
