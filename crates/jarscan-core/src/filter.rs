//! Filter contract and the stock filter implementations.
//!
//! A filter is evaluated only against members of its [`MemberKind`]. The name
//! predicate always runs first; a filter that also inspects content is only
//! handed bytes for members its name predicate already accepted.

use std::fmt;
use std::sync::Arc;

use crate::member::MemberKind;

/// Predicate over normalized member names.
pub trait Filter: Send + Sync + fmt::Debug {
    /// Which kind of member this filter is evaluated against.
    fn scope(&self) -> MemberKind;

    /// Decide on a member by name alone.
    fn accept(&self, name: &str) -> bool;

    /// Whether accepted members should carry a ready content handle.
    fn wants_content(&self) -> bool;

    /// Whether [`Filter::accept_content`] must be consulted after the name matched.
    fn inspects_content(&self) -> bool {
        false
    }

    /// Second-stage decision on the member's raw bytes.
    fn accept_content(&self, _bytes: &[u8]) -> bool {
        true
    }
}

/// Name predicate shared by the stock filters.
#[derive(Clone, Default)]
pub enum NamePredicate {
    /// Accept every name.
    #[default]
    Any,
    /// Accept names starting with one of the prefixes.
    Prefixes(Vec<String>),
    /// Accept names ending with one of the suffixes or equal to one of the
    /// exact paths.
    Patterns {
        /// Accepted name endings (e.g. `hbm.xml`).
        suffixes: Vec<String>,
        /// Accepted exact names (e.g. `META-INF/orm.xml`).
        paths: Vec<String>,
    },
    /// Caller-supplied predicate.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl NamePredicate {
    /// Evaluate the predicate.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefixes(prefixes) => prefixes.iter().any(|p| name.starts_with(p.as_str())),
            Self::Patterns { suffixes, paths } => {
                suffixes.iter().any(|s| name.ends_with(s.as_str()))
                    || paths.iter().any(|p| name == p)
            }
            Self::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for NamePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Prefixes(p) => f.debug_tuple("Prefixes").field(p).finish(),
            Self::Patterns { suffixes, paths } => f
                .debug_struct("Patterns")
                .field("suffixes", suffixes)
                .field("paths", paths)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Selects package markers.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    /// Package-name predicate.
    pub predicate: NamePredicate,
    /// Attach content to accepted packages.
    pub content: bool,
}

impl PackageFilter {
    /// Package filter accepting every package.
    pub fn any() -> Self {
        Self::default()
    }
}

impl Filter for PackageFilter {
    fn scope(&self) -> MemberKind {
        MemberKind::Package
    }

    fn accept(&self, name: &str) -> bool {
        self.predicate.matches(name)
    }

    fn wants_content(&self) -> bool {
        self.content
    }
}

/// Selects compiled types, optionally only those referencing a marker type.
///
/// Markers are fully qualified type names such as `javax.persistence.Entity`.
/// A type matches when its bytes contain the marker's descriptor
/// (`Ljavax/persistence/Entity;`), which is how annotation references appear
/// in a compiled unit's constant pool.
#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    /// Type-name predicate.
    pub predicate: NamePredicate,
    descriptors: Vec<Vec<u8>>,
    /// Attach content to accepted types.
    pub content: bool,
}

impl TypeFilter {
    /// Type filter with the given marker types.
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            predicate: NamePredicate::Any,
            descriptors: markers
                .into_iter()
                .map(|m| format!("L{};", m.as_ref().replace('.', "/")).into_bytes())
                .collect(),
            content: false,
        }
    }

    /// Replace the name predicate.
    pub fn with_predicate(mut self, predicate: NamePredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Number of recognized markers.
    pub fn marker_count(&self) -> usize {
        self.descriptors.len()
    }
}

impl Filter for TypeFilter {
    fn scope(&self) -> MemberKind {
        MemberKind::Type
    }

    fn accept(&self, name: &str) -> bool {
        self.predicate.matches(name)
    }

    fn wants_content(&self) -> bool {
        self.content
    }

    fn inspects_content(&self) -> bool {
        !self.descriptors.is_empty()
    }

    fn accept_content(&self, bytes: &[u8]) -> bool {
        self.descriptors
            .iter()
            .any(|d| bytes.windows(d.len()).any(|w| w == d.as_slice()))
    }
}

/// Selects resource files by path pattern.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    /// Resource-path predicate.
    pub predicate: NamePredicate,
    /// Attach content to accepted resources.
    pub content: bool,
}

impl ResourceFilter {
    /// Resource filter on suffixes and exact paths, with content attached.
    pub fn patterns<S: Into<String>>(
        suffixes: impl IntoIterator<Item = S>,
        paths: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            predicate: NamePredicate::Patterns {
                suffixes: suffixes.into_iter().map(Into::into).collect(),
                paths: paths.into_iter().map(Into::into).collect(),
            },
            content: true,
        }
    }
}

impl Filter for ResourceFilter {
    fn scope(&self) -> MemberKind {
        MemberKind::Resource
    }

    fn accept(&self, name: &str) -> bool {
        self.predicate.matches(name)
    }

    fn wants_content(&self) -> bool {
        self.content
    }
}

/// Filters commonly used to discover persistence units' managed types and
/// mapping files: every package, entity-like types, and mapping resources.
pub fn persistence_filters() -> Vec<Box<dyn Filter>> {
    vec![
        Box::new(PackageFilter::any()),
        Box::new(TypeFilter::with_markers([
            "javax.persistence.Entity",
            "javax.persistence.MappedSuperclass",
            "javax.persistence.Embeddable",
        ])),
        // Mapping files count wherever they sit, e.g. under `WEB-INF/classes/`.
        Box::new(ResourceFilter::patterns(["hbm.xml", "META-INF/orm.xml"], [])),
    ]
}
