use std::{fs::File, io::BufReader, path::Path};

use memmap2::Mmap;

use crate::{error::AtlasError, options::Backing};

/// An opened map file. Dropping it closes the handle or unmaps the file.
pub enum MapSource {
    Buffered(BufReader<File>),
    Mapped(Mmap),
}

impl MapSource {
    pub fn open(path: &Path, backing: Backing) -> Result<Self, AtlasError> {
        let file = File::open(path).map_err(|source| AtlasError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        match backing {
            Backing::Buffered => Ok(MapSource::Buffered(BufReader::new(file))),
            Backing::Mapped => {
                // The mapping is read-only and dropped before `load` returns.
                let map = unsafe { Mmap::map(&file) }.map_err(|source| AtlasError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(MapSource::Mapped(map))
            }
        }
    }
}
