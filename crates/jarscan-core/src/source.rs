//! Random-access backing stores for archive layers.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;
use zip::ZipArchive;

use crate::error::ScanError;

/// Most buffer space reserved up front on the strength of a declared size.
const PREALLOCATE_LIMIT: u64 = 1 << 20;

/// Object-safe `Read + Seek` so archive layers can be opened uniformly.
pub(crate) trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// A zip archive that can be reopened at will for random access.
///
/// Cloning is cheap; in-memory and spooled copies are shared and released
/// when the last clone (including content handles) is dropped.
#[derive(Clone)]
pub(crate) enum ArchiveSource {
    /// An archive file on the local filesystem.
    Path(PathBuf),
    /// A nested archive copied into memory.
    Memory(Arc<[u8]>),
    /// A nested archive spooled to a temporary file, deleted on last drop.
    Spooled(Arc<TempPath>),
}

impl ArchiveSource {
    /// Open a fresh independent reader over the archive bytes.
    pub(crate) fn reader(&self) -> io::Result<Box<dyn ReadSeek>> {
        Ok(match self {
            Self::Path(path) => Box::new(File::open(path)?),
            Self::Memory(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
            Self::Spooled(path) => Box::new(File::open(&**path)?),
        })
    }

    /// Open the archive's central directory.
    pub(crate) fn open(&self, location: &str) -> Result<ZipArchive<Box<dyn ReadSeek>>, ScanError> {
        let reader = self
            .reader()
            .map_err(|e| ScanError::storage(location, e))?;
        ZipArchive::new(reader).map_err(|e| ScanError::archive(location, e))
    }

    /// Decompress a single member into memory.
    pub(crate) fn read_member(&self, member: &str) -> io::Result<Vec<u8>> {
        let mut archive = ZipArchive::new(self.reader()?).map_err(zip_to_io)?;
        let mut file = archive.by_name(member).map_err(zip_to_io)?;
        let mut buf = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Copy a reader into a random-access source.
    ///
    /// Payloads up to `max_in_memory` bytes stay in memory, larger ones are
    /// spooled to a temporary file.
    pub(crate) fn materialize<R: Read>(
        reader: &mut R,
        size_hint: u64,
        max_in_memory: u64,
    ) -> io::Result<Self> {
        if size_hint <= max_in_memory {
            let mut buf = Vec::with_capacity(capacity_hint(size_hint));
            reader.read_to_end(&mut buf)?;
            return Ok(Self::Memory(buf.into()));
        }

        let mut spool = tempfile::NamedTempFile::new()?;
        io::copy(reader, &mut spool)?;
        spool.flush()?;
        Ok(Self::Spooled(Arc::new(spool.into_temp_path())))
    }
}

impl fmt::Debug for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            Self::Spooled(path) => {
                let path: &Path = path;
                f.debug_tuple("Spooled").field(&path).finish()
            }
        }
    }
}

/// Initial capacity for a payload whose header declares `declared` bytes.
///
/// Archive headers are untrusted; buffers grow past the hint as data arrives.
pub(crate) fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared.min(PREALLOCATE_LIMIT)).unwrap_or(0)
}

pub(crate) fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
