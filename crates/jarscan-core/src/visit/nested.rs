//! Nested locator chains: resolve `outer!inner!...` layer by layer.
//!
//! Each layer is either an exploded directory or a random-access archive.
//! An inner segment names a nested archive member, a directory inside the
//! enclosing archive, or (for directory layers) a path beneath it. Remote
//! chains never become random-access; they are handed to the stream engine
//! whole.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::{Collector, archive, directory, stream};
use crate::config::{NestedMode, ScanConfig};
use crate::error::ScanError;
use crate::locator::{Locator, PhysicalLocation};
use crate::remote;
use crate::source::ArchiveSource;

#[derive(Debug)]
enum Layer {
    Directory(PathBuf),
    Archive {
        source: ArchiveSource,
        /// Directory inside the archive acting as its root, empty for the whole archive.
        prefix: String,
    },
}

/// Resolve every segment of `locator` and traverse the innermost root.
///
/// # Errors
///
/// Fails if the physical location cannot be opened, if any segment does not
/// exist in its enclosing layer, or on malformed archive data.
pub(crate) fn visit(
    locator: &Locator,
    config: &ScanConfig,
    collector: &mut Collector<'_>,
) -> Result<(), ScanError> {
    let physical = locator.physical();
    collector.enter_unit(&physical.file_name());

    match physical {
        PhysicalLocation::Local(path) => {
            let meta = fs::metadata(path).map_err(|e| ScanError::storage(physical.to_string(), e))?;
            let layer = if meta.is_dir() {
                Layer::Directory(path.clone())
            } else {
                Layer::Archive {
                    source: ArchiveSource::Path(path.clone()),
                    prefix: String::new(),
                }
            };
            descend(layer, locator.segments(), 0, locator, config, collector)
        }
        PhysicalLocation::Remote(url) => {
            let mut response = remote::open(url, config)?;
            stream::visit(&mut response, &physical.to_string(), locator.segments(), collector)
        }
    }
}

fn descend(
    layer: Layer,
    segments: &[String],
    depth: usize,
    locator: &Locator,
    config: &ScanConfig,
    collector: &mut Collector<'_>,
) -> Result<(), ScanError> {
    let location = locator.layer_location(depth);
    let Some((segment, rest)) = segments.split_first() else {
        return match layer {
            Layer::Directory(root) => directory::visit(&root, collector),
            Layer::Archive { source, prefix } => archive::visit(&source, &location, &prefix, collector),
        };
    };
    tracing::trace!("Resolving {segment} in {location}");

    match layer {
        Layer::Directory(dir) => {
            let path = dir.join(segment);
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(ScanError::segment_not_found(location, segment.as_str()));
                }
                Err(e) => return Err(ScanError::storage(path.display().to_string(), e)),
            };
            collector.enter_unit(segment);
            let next = if meta.is_dir() {
                Layer::Directory(path)
            } else {
                Layer::Archive {
                    source: ArchiveSource::Path(path),
                    prefix: String::new(),
                }
            };
            descend(next, rest, depth + 1, locator, config, collector)
        }
        Layer::Archive { source, prefix } => {
            let mut zip = source.open(&location)?;
            let candidate = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{prefix}/{segment}")
            };

            if let Some(index) = zip.index_for_name(&candidate) {
                let nested_location = locator.layer_location(depth + 1);
                tracing::debug!("Opening nested archive {nested_location}");
                collector.enter_unit(segment);
                let mut file = zip
                    .by_index(index)
                    .map_err(|e| ScanError::archive(location.as_str(), e))?;

                return match config.nested_mode {
                    NestedMode::Stream => stream::visit(&mut file, &nested_location, rest, collector),
                    NestedMode::Materialize => {
                        let size = file.size();
                        let inner = ArchiveSource::materialize(&mut file, size, config.max_in_memory_bytes)
                            .map_err(|e| ScanError::io(nested_location.as_str(), e))?;
                        drop(file);
                        tracing::trace!("Materialized {nested_location} as {inner:?}");
                        let next = Layer::Archive {
                            source: inner,
                            prefix: String::new(),
                        };
                        descend(next, rest, depth + 1, locator, config, collector)
                    }
                };
            }

            let dir_prefix = format!("{candidate}/");
            let is_directory = zip
                .file_names()
                .any(|name| name.trim_start_matches('/').starts_with(&dir_prefix));
            if !is_directory {
                return Err(ScanError::segment_not_found(location, segment.as_str()));
            }
            drop(zip);

            // A directory inside the archive narrows the root without opening a new unit.
            let next = Layer::Archive {
                source,
                prefix: candidate,
            };
            descend(next, rest, depth + 1, locator, config, collector)
        }
    }
}
