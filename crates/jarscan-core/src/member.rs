//! Member naming: raw storage paths to canonical member names.
//!
//! `a/b/C.class` becomes the type `a.b.C`, `a/b/package-info.class` the
//! package `a.b`, and anything else a resource keeping its relative path.

use serde::{Deserialize, Serialize};

const CLASS_SUFFIX: &str = ".class";
const PACKAGE_INFO: &str = "package-info";

/// Kind of member a raw path denotes. Filters are scoped to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// A package marker (`package-info.class`).
    Package,
    /// A compiled type (`*.class`).
    Type,
    /// Any other file.
    Resource,
}

/// A classified member: its kind and normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Kind used to select applicable filters.
    pub kind: MemberKind,
    /// Normalized name handed to filters and stored in entries.
    pub name: String,
}

impl Member {
    /// Classify a raw `/`- or `\`-separated path.
    ///
    /// Returns `None` for directory entries and empty names.
    pub fn classify(raw: &str) -> Option<Self> {
        if raw.ends_with('/') || raw.ends_with('\\') {
            return None;
        }
        let path = normalize_path(raw);
        if path.is_empty() {
            return None;
        }

        let Some(stem) = path.strip_suffix(CLASS_SUFFIX) else {
            return Some(Self {
                kind: MemberKind::Resource,
                name: path,
            });
        };

        if stem == PACKAGE_INFO {
            // Default package marker: nothing meaningful to name.
            return Some(Self {
                kind: MemberKind::Package,
                name: String::new(),
            });
        }
        if let Some(package) = stem.strip_suffix(PACKAGE_INFO).and_then(|p| p.strip_suffix('/')) {
            return Some(Self {
                kind: MemberKind::Package,
                name: package.replace('/', "."),
            });
        }

        Some(Self {
            kind: MemberKind::Type,
            name: stem.replace('/', "."),
        })
    }
}

/// Convert separators to `/` and drop leading, trailing and empty components.
pub fn normalize_path(raw: &str) -> String {
    raw.split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Strip a directory prefix from a member path.
///
/// An empty prefix matches everything. Returns `None` when `path` does not
/// live under `prefix`.
pub fn strip_root<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)?.strip_prefix('/')
}
