//! Scan entries and their one-shot content handles.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{self, BufReader, Cursor, Read};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use crate::source::ArchiveSource;

/// Where a content handle gets its bytes from once it is first read.
#[derive(Debug, Clone)]
pub(crate) enum ContentSource {
    /// A regular file inside a directory root.
    File(PathBuf),
    /// A member of a random-access archive.
    ArchiveMember {
        archive: ArchiveSource,
        member: String,
    },
    /// Bytes copied out of a forward-only stream during the scan pass.
    Buffer(Arc<[u8]>),
}

enum State {
    Pending(ContentSource),
    Open(Box<dyn Read + Send>),
    Closed,
}

/// Lazily opened, single-use readable handle to a member's raw bytes.
///
/// The underlying file or decompressor is opened on the first read. After
/// [`Content::close`] (or a failed open) every read returns an error.
/// Dropping the handle releases whatever it holds.
pub struct Content {
    state: State,
}

impl Content {
    pub(crate) fn new(source: ContentSource) -> Self {
        Self {
            state: State::Pending(source),
        }
    }

    /// Wrap an in-memory buffer as a content handle.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(ContentSource::Buffer(bytes.into()))
    }

    /// Whether the underlying reader has been opened.
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Release the handle. Subsequent reads fail.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    /// Read the remaining bytes and close the handle.
    ///
    /// The handle is closed on both success and failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be opened or read, or if the
    /// handle was already closed.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let result = self.read_to_end(&mut buf);
        self.close();
        result.map(|_| buf)
    }

    fn ensure_open(&mut self) -> io::Result<()> {
        if !matches!(self.state, State::Pending(_)) {
            return Ok(());
        }
        let State::Pending(source) = mem::replace(&mut self.state, State::Closed) else {
            return Ok(());
        };
        let reader: Box<dyn Read + Send> = match source {
            ContentSource::File(path) => Box::new(BufReader::new(File::open(path)?)),
            ContentSource::ArchiveMember { archive, member } => {
                Box::new(Cursor::new(archive.read_member(&member)?))
            }
            ContentSource::Buffer(bytes) => Box::new(Cursor::new(bytes)),
        };
        self.state = State::Open(reader);
        Ok(())
    }
}

impl Read for Content {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        match &mut self.state {
            State::Open(reader) => reader.read(buf),
            State::Pending(_) | State::Closed => Err(io::Error::other("content handle is closed")),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Pending(ContentSource::File(path)) => format!("pending file {}", path.display()),
            State::Pending(ContentSource::ArchiveMember { member, .. }) => {
                format!("pending member {member}")
            }
            State::Pending(ContentSource::Buffer(bytes)) => {
                format!("pending buffer ({} bytes)", bytes.len())
            }
            State::Open(_) => "open".to_string(),
            State::Closed => "closed".to_string(),
        };
        f.debug_struct("Content").field("state", &state).finish()
    }
}

/// A discovered member: its normalized name plus an optional content handle.
///
/// Equality, ordering and hashing use the name only, so an entry with a
/// handle equals one without.
#[derive(Debug)]
pub struct Entry {
    name: String,
    content: Option<Content>,
}

impl Entry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, content: Option<Content>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Normalized member name (type name, package name or resource path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a content handle is attached.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Mutable access to the content handle, if any.
    pub fn content_mut(&mut self) -> Option<&mut Content> {
        self.content.as_mut()
    }

    /// Detach the content handle, leaving the entry without one.
    pub fn take_content(&mut self) -> Option<Content> {
        self.content.take()
    }

    /// Split the entry into name and content handle.
    pub fn into_parts(self) -> (String, Option<Content>) {
        (self.name, self.content)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Borrow<str> for Entry {
    fn borrow(&self) -> &str {
        &self.name
    }
}
