//! Directory traversal: every regular file beneath an exploded unit.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{Collector, Payload};
use crate::entry::{Content, ContentSource};
use crate::error::ScanError;

struct FilePayload<'a> {
    path: &'a Path,
    cached: Option<Arc<[u8]>>,
}

impl Payload for FilePayload<'_> {
    fn bytes(&mut self) -> io::Result<Arc<[u8]>> {
        if let Some(bytes) = &self.cached {
            return Ok(Arc::clone(bytes));
        }
        let bytes: Arc<[u8]> = std::fs::read(self.path)?.into();
        self.cached = Some(Arc::clone(&bytes));
        Ok(bytes)
    }

    fn handle(&mut self) -> io::Result<Content> {
        Ok(Content::new(ContentSource::File(self.path.to_path_buf())))
    }
}

/// Relative path of `path` under `root`, `/`-separated.
fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

/// Walk `root` and offer every regular file to the collector.
///
/// # Errors
///
/// Fails if the root or any directory beneath it cannot be read, or if a
/// content-inspecting filter needs bytes from an unreadable file.
pub(crate) fn visit(root: &Path, collector: &mut Collector<'_>) -> Result<(), ScanError> {
    tracing::debug!("Walking directory {}", root.display());
    let location = root.display().to_string();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let at = e
                .path()
                .map_or_else(|| location.clone(), |p| p.display().to_string());
            ScanError::storage(at, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path: PathBuf = entry.into_path();
        let Some(name) = relative_name(root, &path) else {
            continue;
        };
        let mut payload = FilePayload {
            path: &path,
            cached: None,
        };
        collector
            .offer(&name, &mut payload)
            .map_err(|e| ScanError::io(path.display().to_string(), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_name_uses_slashes() {
        let root = Path::new("/srv/explodedpar.par");
        let file = root.join("org").join("acme").join("Carpet.class");
        assert_eq!(relative_name(root, &file).as_deref(), Some("org/acme/Carpet.class"));
        assert_eq!(relative_name(root, Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn test_missing_root_is_a_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let filters: Vec<Box<dyn crate::filter::Filter>> =
            vec![Box::new(crate::filter::PackageFilter::any())];
        let mut collector = Collector::new(&filters);
        let err = visit(&dir.path().join("gone"), &mut collector).unwrap_err();
        assert!(matches!(err, ScanError::Storage { .. }));
    }
}
