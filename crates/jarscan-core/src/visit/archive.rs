//! Random-access archive traversal.
//!
//! Member names come from the central directory; payloads are only touched
//! when a content-inspecting filter asks for them. Content handles reopen the
//! archive independently, so they stay valid after the traversal is done.

use std::io::{self, Read};
use std::sync::Arc;

use zip::ZipArchive;

use super::{Collector, Payload};
use crate::entry::{Content, ContentSource};
use crate::error::ScanError;
use crate::member::strip_root;
use crate::source::{ArchiveSource, ReadSeek, capacity_hint, zip_to_io};

struct MemberPayload<'a> {
    archive: &'a mut ZipArchive<Box<dyn ReadSeek>>,
    source: &'a ArchiveSource,
    member: &'a str,
    cached: Option<Arc<[u8]>>,
}

impl Payload for MemberPayload<'_> {
    fn bytes(&mut self) -> io::Result<Arc<[u8]>> {
        if let Some(bytes) = &self.cached {
            return Ok(Arc::clone(bytes));
        }
        let mut file = self.archive.by_name(self.member).map_err(zip_to_io)?;
        let mut buf = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut buf)?;
        let bytes: Arc<[u8]> = buf.into();
        self.cached = Some(Arc::clone(&bytes));
        Ok(bytes)
    }

    fn handle(&mut self) -> io::Result<Content> {
        Ok(Content::new(ContentSource::ArchiveMember {
            archive: self.source.clone(),
            member: self.member.to_string(),
        }))
    }
}

/// Enumerate the members of `source` under `prefix` (empty for all).
///
/// # Errors
///
/// Fails if the archive cannot be opened, is not a valid zip, or a member
/// needed for content inspection cannot be decompressed.
pub(crate) fn visit(
    source: &ArchiveSource,
    location: &str,
    prefix: &str,
    collector: &mut Collector<'_>,
) -> Result<(), ScanError> {
    let mut archive = source.open(location)?;
    tracing::debug!(
        "Enumerating {} members of {location}{}",
        archive.len(),
        if prefix.is_empty() {
            String::new()
        } else {
            format!(" under {prefix}/")
        }
    );

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    for raw in &names {
        let Some(name) = strip_root(raw.trim_start_matches('/'), prefix) else {
            continue;
        };
        let mut payload = MemberPayload {
            archive: &mut archive,
            source,
            member: raw,
            cached: None,
        };
        collector
            .offer(name, &mut payload)
            .map_err(|e| ScanError::io(format!("{location}!{raw}"), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, ResourceFilter};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn war() -> ArchiveSource {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.add_directory("WEB-INF/classes/", options).unwrap();
        for (name, body) in [
            ("WEB-INF/web.xml", "<web-app/>"),
            ("WEB-INF/classes/META-INF/orm.xml", "<entity-mappings/>"),
            ("index.html", "<html/>"),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        ArchiveSource::Memory(writer.finish().unwrap().into_inner().into())
    }

    #[test]
    fn test_prefix_restricts_and_strips() {
        let filters: Vec<Box<dyn Filter>> = vec![Box::new(ResourceFilter::patterns(["xml"], []))];
        let mut collector = Collector::new(&filters);
        visit(&war(), "war.war", "WEB-INF/classes", &mut collector).unwrap();

        let mut sets = collector.into_sets();
        assert_eq!(sets[0].len(), 1);
        let mut entry = sets[0].pop_first().unwrap();
        assert_eq!(entry.name(), "META-INF/orm.xml");

        // The handle reopens the archive after traversal finished.
        let body = entry.take_content().unwrap().read_all().unwrap();
        assert_eq!(body, b"<entity-mappings/>");
    }

    #[test]
    fn test_not_a_zip() {
        let filters: Vec<Box<dyn Filter>> = vec![Box::new(ResourceFilter::patterns(["xml"], []))];
        let mut collector = Collector::new(&filters);
        let source = ArchiveSource::Memory(vec![b'x'; 512].into());
        let err = visit(&source, "broken.jar", "", &mut collector).unwrap_err();
        assert!(matches!(err, ScanError::Archive { .. }), "{err}");
    }
}
