//! Error taxonomy for a single scan.
//!
//! Resolution, storage and archive-format errors abort the whole scan.
//! Content-read errors never appear here: they surface from
//! [`Content`](crate::entry::Content) when a caller reads a handle.

use std::io;

use thiserror::Error;

use crate::locator::LocatorError;

/// Errors that abort a scan call. No partial result accompanies them.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The locator string could not be parsed.
    #[error("Invalid locator: {0}")]
    Locator(#[from] LocatorError),

    /// An inner segment of a nested locator does not exist in its enclosing layer.
    #[error("Segment '{segment}' not found in {location}")]
    SegmentNotFound { location: String, segment: String },

    /// The physical location could not be opened.
    #[error("Cannot access {location}: {source}")]
    Storage {
        location: String,
        #[source]
        source: io::Error,
    },

    /// A remote location could not be connected to or answered with an error status.
    #[error("Cannot fetch {location}: {source}")]
    Remote {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// The bytes at a resolved location are not a valid archive.
    #[error("Invalid archive at {location}: {source}")]
    Archive {
        location: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Reading member data failed while the traversal was still in progress.
    #[error("IO error in {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    /// The caller supplied an empty filter list.
    #[error("At least one filter is required")]
    NoFilters,
}

impl ScanError {
    pub(crate) fn storage(location: impl Into<String>, source: io::Error) -> Self {
        Self::Storage {
            location: location.into(),
            source,
        }
    }

    pub(crate) fn io(location: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }

    /// Classify a zip error: I/O failures stay I/O, everything else is a format error.
    pub(crate) fn archive(location: impl Into<String>, source: zip::result::ZipError) -> Self {
        match source {
            zip::result::ZipError::Io(err) => Self::io(location, err),
            other => Self::Archive {
                location: location.into(),
                source: other,
            },
        }
    }

    pub(crate) fn segment_not_found(location: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::SegmentNotFound {
            location: location.into(),
            segment: segment.into(),
        }
    }

    /// Whether the error happened before any storage was read.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::Locator(_) | Self::SegmentNotFound { .. } | Self::NoFilters)
    }
}
