use std::{
    collections::BTreeMap,
    io::{self, Read, Seek, SeekFrom},
    ops::Range,
    path::Path,
    sync::Arc,
};

use tracing::{debug, warn};

use crate::{
    datatypes::{Atlas, Frame, Texture},
    error::{AtlasError, Result, Section},
    options::LoadOptions,
    utils::{
        FRAME_RECORD_SIZE, FrameRecord, HEADER_SIZE, Header, MAGIC, MapSource,
        TEXTURE_RECORD_SIZE, TextureRecord,
    },
};

// Untrusted counts never reserve more than this up front; buffers grow as
// bytes actually arrive.
const MAX_PREALLOC: usize = 64 * 1024;

////////////////////////////////////////////////
/// AtlasLoader
/// * Parses binary texture atlas map files into an [`Atlas`].
///
/// * Works on any `Read + Seek` source; `load` opens a path as a buffered
///   file or a memory map depending on [`LoadOptions::backing`].
/// * Every offset and length read from the file is checked against the
///   section it points into before it is used.
/// * A load either returns a complete atlas or an error. Partial state and
///   the file handle are dropped on every exit path.
////////////////////////////////////////////////
#[derive(Debug, Clone, Default)]
pub struct AtlasLoader {
    options: LoadOptions,
}

impl AtlasLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Loads the map file at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Atlas> {
        let path = path.as_ref();
        let atlas = match MapSource::open(path, self.options.backing)? {
            MapSource::Buffered(reader) => self.load_reader(reader)?,
            MapSource::Mapped(map) => self.load_bytes(&map)?,
        };

        debug!(
            resource = "atlas",
            path = %path.display(),
            backing = ?self.options.backing,
            "loaded map file"
        );
        Ok(atlas)
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Atlas> {
        self.load_reader(io::Cursor::new(bytes))
    }

    pub fn load_reader<R: Read + Seek>(&self, mut reader: R) -> Result<Atlas> {
        let header = read_header(&mut reader)?;
        if header.magic != MAGIC {
            return Err(AtlasError::BadMagic {
                expected: MAGIC,
                found: header.magic,
            });
        }
        self.check_section_limits(&header)?;

        let records = read_texture_records(&mut reader, &header)?;

        let strings = read_section(
            &mut reader,
            header.str_section_offset,
            header.str_section_len,
        )?;
        if strings.len() < header.str_section_len as usize {
            return Err(AtlasError::TruncatedStringSection {
                expected: header.str_section_len,
                actual: strings.len(),
            });
        }

        let frames = read_section(
            &mut reader,
            header.frm_section_offset,
            header.frm_section_len,
        )?;
        if frames.len() < header.frm_section_len as usize {
            return Err(AtlasError::TruncatedFrameSection {
                expected: header.frm_section_len,
                actual: frames.len(),
            });
        }
        debug!(
            strings = strings.len(),
            frames = frames.len(),
            "read string and frame sections"
        );

        let textures = self.resolve_textures(&records, &strings, &frames)?;

        debug!(
            resource = "atlas",
            width = header.width,
            height = header.height,
            textures = textures.len(),
            "parsed atlas"
        );

        Ok(Atlas {
            width: header.width,
            height: header.height,
            textures,
        })
    }

    fn check_section_limits(&self, header: &Header) -> Result<()> {
        let limit = self.options.max_section_len;
        for (section, len) in [
            (Section::Textures, header.tex_section_len),
            (Section::Strings, header.str_section_len),
            (Section::Frames, header.frm_section_len),
        ] {
            if len > limit {
                return Err(AtlasError::SectionTooLarge {
                    section,
                    len,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Checks every record against the sections, then builds the textures
    /// over one name pool and one decoded frame array per alignment. Records
    /// that alias the same bytes share them instead of copying.
    fn resolve_textures(
        &self,
        records: &[TextureRecord],
        strings: &[u8],
        frames: &[u8],
    ) -> Result<Vec<Texture>> {
        let mut names = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            names.push(self.resolve_name(index, record, strings)?);
            check_frames(index, record, frames)?;
        }

        let (pool, name_ranges) = name_pool(&names);
        let mut frame_pools = FramePools::new(frames);
        Ok(records
            .iter()
            .zip(name_ranges)
            .map(|(record, name)| {
                let (frame_pool, frames) = frame_pools.resolve(record);
                Texture {
                    names: Arc::clone(&pool),
                    name,
                    frame_pool,
                    frames,
                }
            })
            .collect())
    }

    /// Start offset and text of the name `record` points at.
    fn resolve_name<'a>(
        &self,
        index: usize,
        record: &TextureRecord,
        strings: &'a [u8],
    ) -> Result<(usize, &'a str)> {
        let start = record.name_offset as usize;
        if start >= strings.len() {
            return Err(AtlasError::OutOfBounds {
                texture: index,
                section: Section::Strings,
                end: u64::from(record.name_offset) + 1,
                len: strings.len(),
            });
        }

        let tail = &strings[start..];
        let bytes = match tail.iter().position(|&b| b == 0) {
            Some(nul) => &tail[..nul],
            None if self.options.require_nul_terminator => {
                return Err(AtlasError::OutOfBounds {
                    texture: index,
                    section: Section::Strings,
                    end: strings.len() as u64 + 1,
                    len: strings.len(),
                });
            }
            None => {
                warn!(
                    texture = index,
                    offset = record.name_offset,
                    "name runs to the end of the string section without a NUL"
                );
                tail
            }
        };

        std::str::from_utf8(bytes)
            .map(|name| (start, name))
            .map_err(|_| AtlasError::InvalidName {
                texture: index,
                offset: record.name_offset,
            })
    }
}

/// Loads the map file at `path` with default [`LoadOptions`].
pub fn load(path: impl AsRef<Path>) -> Result<Atlas> {
    AtlasLoader::default().load(path)
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut bytes = [0u8; HEADER_SIZE];
    let have = read_full(reader, &mut bytes)?;
    if have < HEADER_SIZE {
        return Err(AtlasError::TruncatedHeader {
            need: HEADER_SIZE,
            have,
        });
    }
    Ok(Header::decode(&bytes))
}

fn read_texture_records<R: Read + Seek>(
    reader: &mut R,
    header: &Header,
) -> Result<Vec<TextureRecord>> {
    let declared = u64::from(header.tex_section_len);
    let needed = header.texture_bytes_needed();
    if declared < needed {
        // First record the declared section cannot hold.
        return Err(AtlasError::TruncatedTextureRecord {
            index: (declared / TEXTURE_RECORD_SIZE as u64) as u32,
        });
    }
    if declared > needed {
        warn!(declared, needed, "texture section is longer than its records need");
    }

    reader.seek(SeekFrom::Start(u64::from(header.tex_section_offset)))?;

    let count = header.num_textures as usize;
    let mut records = Vec::with_capacity(count.min(MAX_PREALLOC / TEXTURE_RECORD_SIZE));
    let mut bytes = [0u8; TEXTURE_RECORD_SIZE];
    for index in 0..header.num_textures {
        if read_full(reader, &mut bytes)? < TEXTURE_RECORD_SIZE {
            return Err(AtlasError::TruncatedTextureRecord { index });
        }
        records.push(TextureRecord::decode(&bytes));
    }

    debug!(textures = records.len(), "read texture records");
    Ok(records)
}

/// Reads up to `len` bytes at `offset`. Fewer come back only at end of input.
fn read_section<R: Read + Seek>(reader: &mut R, offset: u32, len: u32) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(u64::from(offset)))?;
    let mut data = Vec::with_capacity((len as usize).min(MAX_PREALLOC));
    reader.take(u64::from(len)).read_to_end(&mut data)?;
    Ok(data)
}

/// Like `read_exact`, but reports how much was read instead of failing on EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(filled)
}

fn check_frames(index: usize, record: &TextureRecord, frames: &[u8]) -> Result<()> {
    let end = record.frames_end();
    if end > frames.len() as u64 {
        return Err(AtlasError::OutOfBounds {
            texture: index,
            section: Section::Frames,
            end,
            len: frames.len(),
        });
    }
    Ok(())
}

/// Copies each distinct name out of the string section once. Names that end
/// at the same byte are suffixes of the longest one and index into it, so the
/// pool never holds more than the section.
fn name_pool(names: &[(usize, &str)]) -> (Arc<str>, Vec<Range<usize>>) {
    // end offset -> (start, text, position in pool) of the longest name.
    let mut runs: BTreeMap<usize, (usize, &str, usize)> = BTreeMap::new();
    for &(start, name) in names {
        let run = runs
            .entry(start + name.len())
            .or_insert((start, name, 0));
        if start < run.0 {
            *run = (start, name, 0);
        }
    }

    let mut pool = String::new();
    for run in runs.values_mut() {
        run.2 = pool.len();
        pool.push_str(run.1);
    }

    let ranges = names
        .iter()
        .map(|&(start, name)| {
            let (run_start, _, base) = runs[&(start + name.len())];
            let first = base + start - run_start;
            first..first + name.len()
        })
        .collect();
    (Arc::from(pool), ranges)
}

/// The frame section decoded lazily, once for each byte alignment records
/// start at.
struct FramePools<'a> {
    bytes: &'a [u8],
    decoded: [Option<Arc<[Frame]>>; FRAME_RECORD_SIZE],
    empty: Arc<[Frame]>,
}

impl<'a> FramePools<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            decoded: Default::default(),
            empty: Arc::default(),
        }
    }

    /// Shared frames and range for a record that already passed `check_frames`.
    fn resolve(&mut self, record: &TextureRecord) -> (Arc<[Frame]>, Range<usize>) {
        if record.num_frames == 0 {
            return (Arc::clone(&self.empty), 0..0);
        }

        let offset = record.frames_offset as usize;
        let align = offset % FRAME_RECORD_SIZE;
        let bytes = self.bytes;
        let pool = self.decoded[align].get_or_insert_with(|| {
            bytes[align..]
                .chunks_exact(FRAME_RECORD_SIZE)
                .map(|chunk| Frame::from(FrameRecord::decode(chunk)))
                .collect()
        });

        let first = offset / FRAME_RECORD_SIZE;
        (Arc::clone(pool), first..first + record.num_frames as usize)
    }
}
