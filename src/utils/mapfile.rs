use bytemuck::{Pod, Zeroable};

/// "TEXA" read as a little-endian word.
pub const MAGIC: u32 = 0x4158_4554;

pub const HEADER_SIZE: usize = std::mem::size_of::<Header>();
pub const TEXTURE_RECORD_SIZE: usize = std::mem::size_of::<TextureRecord>();
pub const FRAME_RECORD_SIZE: usize = std::mem::size_of::<FrameRecord>();

// All records are packed little-endian u32 words. `decode` reads them
// unaligned and swaps to host order, so big-endian hosts read the same files.

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
pub struct Header {
    pub magic: u32,
    pub width: u32,
    pub height: u32,
    pub num_textures: u32,
    pub tex_section_offset: u32,
    pub tex_section_len: u32,
    pub str_section_offset: u32,
    pub str_section_len: u32,
    pub frm_section_offset: u32,
    pub frm_section_len: u32,
}

impl Header {
    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Self {
        let raw: Header = bytemuck::pod_read_unaligned(bytes);
        Self {
            magic: u32::from_le(raw.magic),
            width: u32::from_le(raw.width),
            height: u32::from_le(raw.height),
            num_textures: u32::from_le(raw.num_textures),
            tex_section_offset: u32::from_le(raw.tex_section_offset),
            tex_section_len: u32::from_le(raw.tex_section_len),
            str_section_offset: u32::from_le(raw.str_section_offset),
            str_section_len: u32::from_le(raw.str_section_len),
            frm_section_offset: u32::from_le(raw.frm_section_offset),
            frm_section_len: u32::from_le(raw.frm_section_len),
        }
    }

    /// Bytes the declared texture count needs in the texture section.
    pub fn texture_bytes_needed(&self) -> u64 {
        u64::from(self.num_textures) * TEXTURE_RECORD_SIZE as u64
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
pub struct TextureRecord {
    pub name_offset: u32, // into the string section
    pub num_frames: u32,
    pub frames_offset: u32, // byte offset into the frame section
}

impl TextureRecord {
    pub fn decode(bytes: &[u8; TEXTURE_RECORD_SIZE]) -> Self {
        let raw: TextureRecord = bytemuck::pod_read_unaligned(bytes);
        Self {
            name_offset: u32::from_le(raw.name_offset),
            num_frames: u32::from_le(raw.num_frames),
            frames_offset: u32::from_le(raw.frames_offset),
        }
    }

    /// One past the last frame-section byte this record refers to.
    pub fn frames_end(&self) -> u64 {
        u64::from(self.frames_offset) + u64::from(self.num_frames) * FRAME_RECORD_SIZE as u64
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
pub struct FrameRecord {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRecord {
    /// Panics if `bytes` is not exactly one record long.
    pub fn decode(bytes: &[u8]) -> Self {
        let raw: FrameRecord = bytemuck::pod_read_unaligned(bytes);
        Self {
            x: u32::from_le(raw.x),
            y: u32::from_le(raw.y),
            width: u32::from_le(raw.width),
            height: u32::from_le(raw.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes_match_the_file_format() {
        assert_eq!(HEADER_SIZE, 40);
        assert_eq!(TEXTURE_RECORD_SIZE, 12);
        assert_eq!(FRAME_RECORD_SIZE, 16);
    }

    #[test]
    fn magic_spells_texa() {
        assert_eq!(&MAGIC.to_le_bytes(), b"TEXA");
    }

    #[test]
    fn header_fields_are_little_endian() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(b"TEXA");
        bytes[4..8].copy_from_slice(&256u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&128u32.to_le_bytes());
        bytes[12..16].copy_from_slice(&3u32.to_le_bytes());
        bytes[36..40].copy_from_slice(&0x0102_0304u32.to_le_bytes());

        let header = Header::decode(&bytes);
        assert_eq!(header.magic, MAGIC);
        assert_eq!(header.width, 256);
        assert_eq!(header.height, 128);
        assert_eq!(header.num_textures, 3);
        assert_eq!(header.frm_section_len, 0x0102_0304);
        assert_eq!(header.texture_bytes_needed(), 36);
    }

    #[test]
    fn frames_end_does_not_overflow() {
        let record = TextureRecord {
            name_offset: 0,
            num_frames: u32::MAX,
            frames_offset: u32::MAX,
        };
        assert_eq!(
            record.frames_end(),
            u64::from(u32::MAX) + u64::from(u32::MAX) * 16
        );
    }

    #[test]
    fn frame_record_decodes_from_unaligned_bytes() {
        let mut bytes = vec![0xFFu8];
        for v in [1u32, 2, 3, 4] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let frame = FrameRecord::decode(&bytes[1..]);
        assert_eq!(
            frame,
            FrameRecord {
                x: 1,
                y: 2,
                width: 3,
                height: 4
            }
        );
    }
}
