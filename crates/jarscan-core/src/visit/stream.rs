//! Forward-only archive traversal.
//!
//! Local headers are read in storage order and the cursor never moves back.
//! A member's bytes are copied into memory only while the cursor sits on it
//! and only when a filter needs them; everything else is skipped.

use std::io::{self, Read};
use std::sync::Arc;

use zip::read::read_zipfile_from_stream;

use super::{Collector, Payload};
use crate::entry::Content;
use crate::error::ScanError;
use crate::member::{normalize_path, strip_root};

struct StreamPayload<'a> {
    reader: &'a mut dyn Read,
    cached: Option<Arc<[u8]>>,
}

impl Payload for StreamPayload<'_> {
    fn bytes(&mut self) -> io::Result<Arc<[u8]>> {
        if let Some(bytes) = &self.cached {
            return Ok(Arc::clone(bytes));
        }
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        let bytes: Arc<[u8]> = buf.into();
        self.cached = Some(Arc::clone(&bytes));
        Ok(bytes)
    }

    fn handle(&mut self) -> io::Result<Content> {
        // Copies share one buffer; every handle keeps its own cursor.
        Ok(Content::from_bytes(self.bytes()?))
    }
}

/// Traverse the archive read from `reader`, descending through `path`.
///
/// `path` is resolved inside this archive the way a random-access layer
/// resolves it: a member equal to a leading join of its segments is a nested
/// archive traversed in place with the remaining segments, and the full join
/// is the traversal root, either a directory prefix or, if a member with
/// exactly that name turns up, a nested archive traversed in the same pass.
///
/// # Errors
///
/// Fails on malformed archive data, on read errors, and when the end of the
/// stream is reached without any member at or under a segment of `path`.
pub(crate) fn visit(
    reader: &mut dyn Read,
    location: &str,
    path: &[String],
    collector: &mut Collector<'_>,
) -> Result<(), ScanError> {
    let joins: Vec<String> = (1..=path.len()).map(|n| path[..n].join("/")).collect();
    let (hops, prefix) = match joins.split_last() {
        Some((root, hops)) => (hops, root.as_str()),
        None => (&[][..], ""),
    };
    tracing::debug!("Streaming members of {location}");

    // Leading segments of `path` seen to exist in this archive so far.
    let mut reached = 0;
    let mut reader = reader;
    while let Some(mut file) =
        read_zipfile_from_stream(&mut reader).map_err(|e| ScanError::archive(location, e))?
    {
        let raw = normalize_path(file.name());
        reached = reached.max(segments_present(&raw, &joins));
        if file.is_dir() {
            continue;
        }

        if let Some(depth) = hops.iter().position(|hop| *hop == raw) {
            tracing::debug!("Descending into {raw} inside {location}");
            collector.enter_unit(&path[depth]);
            let nested = format!("{location}!{raw}");
            return visit(&mut file, &nested, &path[depth + 1..], collector);
        }

        if !prefix.is_empty() && raw == prefix {
            // The root names a nested archive: traverse it without leaving this pass.
            tracing::debug!("Descending into {prefix} inside {location}");
            collector.enter_unit(&path[path.len() - 1]);
            let nested = format!("{location}!{prefix}");
            visit(&mut file, &nested, &[], collector)?;
            continue;
        }

        let Some(name) = strip_root(&raw, prefix) else {
            continue;
        };
        let mut payload = StreamPayload {
            reader: &mut file,
            cached: None,
        };
        collector
            .offer(name, &mut payload)
            .map_err(|e| ScanError::io(format!("{location}!{raw}"), e))?;
        // Dropping `file` skips whatever payload was not consumed.
    }

    match path.get(reached) {
        Some(missing) => Err(ScanError::segment_not_found(location, missing.as_str())),
        None => Ok(()),
    }
}

/// Count the leading joins that `raw` equals or lives under.
fn segments_present(raw: &str, joins: &[String]) -> usize {
    joins
        .iter()
        .take_while(|join| raw == join.as_str() || strip_root(raw, join).is_some())
        .count()
}
