//! Traversal engines and the per-scan collector they feed.
//!
//! Every engine walks its storage once and hands each member to
//! [`Collector::offer`] together with a [`Payload`] that can produce the
//! member's bytes or a content handle on demand. The collector tests the
//! name first, so rejected members never cost any payload I/O.

pub(crate) mod archive;
pub(crate) mod directory;
pub(crate) mod nested;
pub(crate) mod stream;

use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;

use crate::entry::{Content, Entry};
use crate::filter::Filter;
use crate::member::Member;

/// Lazy access to one member's data while the traversal sits on it.
pub(crate) trait Payload {
    /// Raw member bytes. Read at most once per member and cached.
    fn bytes(&mut self) -> io::Result<Arc<[u8]>>;

    /// A new content handle for the member.
    fn handle(&mut self) -> io::Result<Content>;
}

/// Accumulates index-aligned result sets for one scan.
pub(crate) struct Collector<'f> {
    filters: &'f [Box<dyn Filter>],
    sets: Vec<BTreeSet<Entry>>,
    unit: String,
    visited: usize,
}

impl<'f> Collector<'f> {
    pub(crate) fn new(filters: &'f [Box<dyn Filter>]) -> Self {
        Self {
            filters,
            sets: filters.iter().map(|_| BTreeSet::new()).collect(),
            unit: String::new(),
            visited: 0,
        }
    }

    /// Record that traversal entered a unit (directory or archive).
    /// The innermost unit entered names the scan.
    pub(crate) fn enter_unit(&mut self, name: &str) {
        tracing::trace!("Entering unit {name}");
        self.unit = name.to_string();
    }

    /// Classify a raw member path and insert it into every accepting filter's set.
    pub(crate) fn offer(&mut self, raw: &str, payload: &mut dyn Payload) -> io::Result<()> {
        let Some(member) = Member::classify(raw) else {
            return Ok(());
        };
        self.visited += 1;

        let mut accepted: Vec<usize> = self
            .filters
            .iter()
            .enumerate()
            .filter(|(_, f)| f.scope() == member.kind && f.accept(&member.name))
            .map(|(i, _)| i)
            .collect();
        if accepted.is_empty() {
            tracing::trace!("{raw}: no filter accepted");
            return Ok(());
        }

        if accepted.iter().any(|&i| self.filters[i].inspects_content()) {
            let bytes = payload.bytes()?;
            let filters = self.filters;
            accepted.retain(|&i| !filters[i].inspects_content() || filters[i].accept_content(&bytes));
        }

        for i in accepted {
            let content = if self.filters[i].wants_content() {
                Some(payload.handle()?)
            } else {
                None
            };
            tracing::trace!("{raw}: matched filter {i} as {}", member.name);
            self.sets[i].insert(Entry::new(member.name.clone(), content));
        }
        Ok(())
    }

    pub(crate) fn visited(&self) -> usize {
        self.visited
    }

    pub(crate) fn unit(&self) -> &str {
        &self.unit
    }

    pub(crate) fn into_sets(self) -> Vec<BTreeSet<Entry>> {
        self.sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PackageFilter, ResourceFilter, TypeFilter};
    use std::io::Read;

    /// Payload that counts how often it is asked for data.
    struct Counting {
        bytes: &'static [u8],
        reads: usize,
        handles: usize,
    }

    impl Counting {
        fn new(bytes: &'static [u8]) -> Self {
            Self {
                bytes,
                reads: 0,
                handles: 0,
            }
        }
    }

    impl Payload for Counting {
        fn bytes(&mut self) -> io::Result<Arc<[u8]>> {
            self.reads += 1;
            Ok(self.bytes.into())
        }

        fn handle(&mut self) -> io::Result<Content> {
            self.handles += 1;
            Ok(Content::from_bytes(self.bytes))
        }
    }

    fn filters() -> Vec<Box<dyn Filter>> {
        vec![
            Box::new(PackageFilter::any()),
            Box::new(TypeFilter::with_markers(["javax.persistence.Entity"])),
            Box::new(ResourceFilter::patterns(["hbm.xml"], ["META-INF/orm.xml"])),
            Box::new(ResourceFilter::patterns(["xml"], [])),
        ]
    }

    #[test]
    fn test_rejected_members_cost_nothing() {
        let filters = filters();
        let mut collector = Collector::new(&filters);
        let mut payload = Counting::new(b"ignored");
        collector.offer("META-INF/MANIFEST.MF", &mut payload).unwrap();

        assert_eq!(payload.reads + payload.handles, 0);
        assert_eq!(collector.visited(), 1);
        assert!(collector.into_sets().iter().all(BTreeSet::is_empty));
    }

    #[test]
    fn test_member_lands_in_every_accepting_set() {
        let filters = filters();
        let mut collector = Collector::new(&filters);
        let mut payload = Counting::new(b"<hibernate-mapping/>");
        collector.offer("org/acme/Mouse.hbm.xml", &mut payload).unwrap();

        // One handle per accepting content filter, never merged.
        assert_eq!(payload.handles, 2);
        let mut sets = collector.into_sets();
        assert_eq!(sets.len(), 4);
        assert!(sets[0].is_empty() && sets[1].is_empty());
        for set in sets.iter_mut().skip(2) {
            let mut entry = set.pop_first().unwrap();
            assert_eq!(entry.name(), "org/acme/Mouse.hbm.xml");
            let mut body = String::new();
            entry.content_mut().unwrap().read_to_string(&mut body).unwrap();
            assert_eq!(body, "<hibernate-mapping/>");
        }
    }

    #[test]
    fn test_marker_inspection_reads_once() {
        let filters = filters();
        let mut collector = Collector::new(&filters);

        let mut entity = Counting::new(b"\xCA\xFE\xBA\xBE Ljavax/persistence/Entity; ");
        collector.offer("org/acme/Carpet.class", &mut entity).unwrap();
        let mut plain = Counting::new(b"\xCA\xFE\xBA\xBE Ljava/lang/Object; ");
        collector.offer("org/acme/Helper.class", &mut plain).unwrap();

        assert_eq!((entity.reads, entity.handles), (1, 0));
        assert_eq!((plain.reads, plain.handles), (1, 0));

        let sets = collector.into_sets();
        assert_eq!(sets[1].len(), 1);
        let entry = sets[1].first().unwrap();
        assert_eq!(entry.name(), "org.acme.Carpet");
        assert!(!entry.has_content());
    }

    #[test]
    fn test_unit_tracks_innermost() {
        let filters = filters();
        let mut collector = Collector::new(&filters);
        collector.enter_unit("app.ear");
        collector.enter_unit("defaultpar.par");
        assert_eq!(collector.unit(), "defaultpar.par");
    }
}
