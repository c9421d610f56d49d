//! The scan entry point: pick a traversal engine from the locator's shape.

use std::collections::BTreeSet;
use std::fs;
use std::ops::Index;
use std::path::PathBuf;

use reqwest::Url;

use crate::config::{RemotePolicy, ScanConfig};
use crate::entry::Entry;
use crate::error::ScanError;
use crate::filter::Filter;
use crate::locator::{Locator, PhysicalLocation, unqualify};
use crate::remote;
use crate::source::ArchiveSource;
use crate::visit::{Collector, archive, directory, nested, stream};

/// The traversal engine a locator maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalKind {
    /// An exploded unit on the local filesystem.
    Directory(PathBuf),
    /// A local archive file with random access.
    FileArchive(PathBuf),
    /// A remote archive readable only forward.
    StreamArchive(Url),
    /// A locator with at least one `!` segment.
    NestedChain(Locator),
}

impl TraversalKind {
    /// Classify a parsed locator.
    ///
    /// Local locations are inspected to tell directories from archive files;
    /// remote ones are never contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Storage`] if a local physical location does not
    /// exist or cannot be inspected.
    pub fn for_locator(locator: &Locator) -> Result<Self, ScanError> {
        if locator.is_nested() {
            return Ok(Self::NestedChain(locator.clone()));
        }
        match locator.physical() {
            PhysicalLocation::Remote(url) => Ok(Self::StreamArchive(url.clone())),
            PhysicalLocation::Local(path) => {
                let meta = fs::metadata(path).map_err(|e| ScanError::storage(path.display().to_string(), e))?;
                if meta.is_dir() {
                    Ok(Self::Directory(path.clone()))
                } else {
                    Ok(Self::FileArchive(path.clone()))
                }
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::FileArchive(_) => "file archive",
            Self::StreamArchive(_) => "stream archive",
            Self::NestedChain(_) => "nested chain",
        }
    }
}

/// Matched members per filter, index-aligned with the filters of the scan.
#[derive(Debug)]
pub struct ScanResult {
    unqualified_name: String,
    sets: Vec<BTreeSet<Entry>>,
    visited: usize,
}

impl ScanResult {
    /// Name of the scanned unit without directories or extension.
    ///
    /// For nested locators this is the innermost unit that was entered.
    pub fn unqualified_name(&self) -> &str {
        &self.unqualified_name
    }

    /// Number of result sets; always equal to the number of filters.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no filters were involved. Never true for a successful scan.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The set for filter `index`.
    pub fn get(&self, index: usize) -> Option<&BTreeSet<Entry>> {
        self.sets.get(index)
    }

    /// All sets in filter order.
    pub fn sets(&self) -> &[BTreeSet<Entry>] {
        &self.sets
    }

    /// Move the set for filter `index` out, leaving an empty set behind.
    pub fn take(&mut self, index: usize) -> Option<BTreeSet<Entry>> {
        self.sets.get_mut(index).map(std::mem::take)
    }

    /// Consume the result, returning the sets in filter order.
    pub fn into_sets(self) -> Vec<BTreeSet<Entry>> {
        self.sets
    }

    /// Members classified during traversal, matched or not.
    pub fn members_visited(&self) -> usize {
        self.visited
    }

    /// Whether every set is empty.
    pub fn no_matches(&self) -> bool {
        self.sets.iter().all(BTreeSet::is_empty)
    }
}

impl Index<usize> for ScanResult {
    type Output = BTreeSet<Entry>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.sets[index]
    }
}

/// Runs scans under one configuration.
///
/// A scanner holds no per-scan state; independent scans may run on separate
/// threads with clones of the same scanner.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner with the given configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// The configuration scans run with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Parse `locator` and scan it. See [`Scanner::scan_locator`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Locator`] for malformed locators, otherwise as
    /// [`Scanner::scan_locator`].
    pub fn scan(&self, locator: &str, filters: &[Box<dyn Filter>]) -> Result<ScanResult, ScanError> {
        let locator = Locator::parse(locator)?;
        self.scan_locator(&locator, filters)
    }

    /// Traverse the unit at `locator` once, testing every member against
    /// `filters` in order.
    ///
    /// # Errors
    ///
    /// Fails with [`ScanError::NoFilters`] for an empty filter list, and with
    /// a resolution, storage or archive-format error if traversal cannot
    /// complete. No partial result is returned. Under
    /// [`RemotePolicy::BestEffort`] an unreachable remote location yields a
    /// result with every set empty instead.
    pub fn scan_locator(
        &self,
        locator: &Locator,
        filters: &[Box<dyn Filter>],
    ) -> Result<ScanResult, ScanError> {
        if filters.is_empty() {
            return Err(ScanError::NoFilters);
        }
        let kind = TraversalKind::for_locator(locator)?;
        tracing::debug!("Scanning {locator} as {} with {} filters", kind.label(), filters.len());

        let mut collector = Collector::new(filters);
        match self.traverse(&kind, locator, &mut collector) {
            Ok(()) => {}
            Err(ScanError::Remote { location, source })
                if self.config.remote_policy == RemotePolicy::BestEffort =>
            {
                // Remote errors only arise while connecting, before any member is read.
                tracing::warn!("Treating unreachable {location} as empty: {source}");
                return Ok(ScanResult {
                    unqualified_name: locator.unqualified_name(),
                    sets: Collector::new(filters).into_sets(),
                    visited: 0,
                });
            }
            Err(e) => return Err(e),
        }

        let unqualified_name = match collector.unit() {
            "" => locator.unqualified_name(),
            unit => unqualify(unit),
        };
        let visited = collector.visited();
        let sets = collector.into_sets();
        tracing::debug!(
            "Scanned {unqualified_name}: {visited} members, matches per filter {:?}",
            sets.iter().map(BTreeSet::len).collect::<Vec<_>>()
        );

        Ok(ScanResult {
            unqualified_name,
            sets,
            visited,
        })
    }

    fn traverse(
        &self,
        kind: &TraversalKind,
        locator: &Locator,
        collector: &mut Collector<'_>,
    ) -> Result<(), ScanError> {
        let location = locator.layer_location(0);
        match kind {
            TraversalKind::Directory(root) => {
                collector.enter_unit(&locator.physical().file_name());
                directory::visit(root, collector)
            }
            TraversalKind::FileArchive(path) => {
                collector.enter_unit(&locator.physical().file_name());
                archive::visit(&ArchiveSource::Path(path.clone()), &location, "", collector)
            }
            TraversalKind::StreamArchive(url) => {
                collector.enter_unit(&locator.physical().file_name());
                let mut response = remote::open(url, &self.config)?;
                stream::visit(&mut response, &location, &[], collector)
            }
            TraversalKind::NestedChain(chain) => nested::visit(chain, &self.config, collector),
        }
    }
}

/// Scan `locator` with the default configuration.
///
/// # Errors
///
/// See [`Scanner::scan`].
pub fn scan(locator: &str, filters: &[Box<dyn Filter>]) -> Result<ScanResult, ScanError> {
    Scanner::default().scan(locator, filters)
}
