//! Filter profiles: an ordered list of filters described in TOML.
//!
//! ```toml
//! [scan]
//! nested-mode = "stream"
//!
//! [[filter]]
//! kind = "type"
//! markers = ["javax.persistence.Entity"]
//!
//! [[filter]]
//! kind = "resource"
//! suffixes = ["hbm.xml"]
//! paths = ["META-INF/persistence.xml"]
//! ```
//!
//! The order of `[[filter]]` tables is the order of the result sets.

use std::path::Path;

use anyhow::{Context, Result, bail};
use jarscan_core::{
    Filter, MemberKind, NamePredicate, PackageFilter, ResourceFilter, ScanConfig, TypeFilter,
};
use serde::Deserialize;

/// Built-in profile: every package, persistence-annotated types and mapping files.
pub const DEFAULT_PROFILE: &str = r#"
[[filter]]
label = "packages"
kind = "package"

[[filter]]
label = "entities"
kind = "type"
markers = [
    "javax.persistence.Entity",
    "javax.persistence.MappedSuperclass",
    "javax.persistence.Embeddable",
]

[[filter]]
label = "mappings"
kind = "resource"
suffixes = ["hbm.xml", "META-INF/orm.xml"]
"#;

/// One `[[filter]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    /// Display name; defaults to the kind.
    pub label: Option<String>,
    /// Member kind the filter applies to.
    pub kind: MemberKind,
    /// Accept names starting with any of these.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Accept names ending with any of these.
    #[serde(default)]
    pub suffixes: Vec<String>,
    /// Accept exactly these names.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Marker types a compiled type must reference (types only).
    #[serde(default)]
    pub markers: Vec<String>,
    /// Attach content handles; resources default to yes, everything else to no.
    pub content: Option<bool>,
}

impl FilterSpec {
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            match self.kind {
                MemberKind::Package => "package",
                MemberKind::Type => "type",
                MemberKind::Resource => "resource",
            }
            .to_string()
        })
    }

    fn predicate(&self) -> Result<NamePredicate> {
        let patterns = !self.suffixes.is_empty() || !self.paths.is_empty();
        match (self.prefixes.is_empty(), patterns) {
            (true, false) => Ok(NamePredicate::Any),
            (false, false) => Ok(NamePredicate::Prefixes(self.prefixes.clone())),
            (true, true) => Ok(NamePredicate::Patterns {
                suffixes: self.suffixes.clone(),
                paths: self.paths.clone(),
            }),
            (false, true) => bail!(
                "filter '{}': 'prefixes' cannot be combined with 'suffixes'/'paths'",
                self.label()
            ),
        }
    }

    /// Build the filter this table describes.
    pub fn build(&self) -> Result<Box<dyn Filter>> {
        let predicate = self.predicate()?;
        if !self.markers.is_empty() && self.kind != MemberKind::Type {
            bail!("filter '{}': 'markers' only applies to kind = \"type\"", self.label());
        }

        Ok(match self.kind {
            MemberKind::Package => Box::new(PackageFilter {
                predicate,
                content: self.content.unwrap_or(false),
            }),
            MemberKind::Type => {
                let mut filter = TypeFilter::with_markers(&self.markers).with_predicate(predicate);
                filter.content = self.content.unwrap_or(false);
                Box::new(filter)
            }
            MemberKind::Resource => Box::new(ResourceFilter {
                predicate,
                content: self.content.unwrap_or(true),
            }),
        })
    }
}

/// A parsed profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Scan configuration overrides. Absent keys keep their defaults.
    pub scan: Option<ScanConfig>,
    /// Filters in result-set order.
    #[serde(rename = "filter", default)]
    pub filters: Vec<FilterSpec>,
}

impl Profile {
    /// Parse a profile from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let profile: Self = toml::from_str(text).context("Invalid profile")?;
        if profile.filters.is_empty() {
            bail!("Profile defines no [[filter]] tables");
        }
        // Surface predicate errors before any scan starts.
        for filter in &profile.filters {
            filter.build()?;
        }
        Ok(profile)
    }

    /// Load a profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to load profile {}", path.display()))
    }

    /// The built-in default profile.
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_PROFILE)
    }

    /// Build a fresh filter list for one scan.
    pub fn build_filters(&self) -> Result<Vec<Box<dyn Filter>>> {
        self.filters.iter().map(FilterSpec::build).collect()
    }

    /// Filter labels in result-set order.
    pub fn labels(&self) -> Vec<String> {
        self.filters.iter().map(FilterSpec::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profile_is_the_persistence_trio() {
        let profile = Profile::builtin().unwrap();
        assert_eq!(profile.labels(), ["packages", "entities", "mappings"]);
        assert!(profile.scan.is_none());

        let filters = profile.build_filters().unwrap();
        assert_eq!(filters[0].scope(), MemberKind::Package);
        assert!(filters[1].inspects_content());
        assert!(filters[2].accept("META-INF/orm.xml"));
        assert!(filters[2].accept("WEB-INF/classes/META-INF/orm.xml"));
        assert!(filters[2].wants_content());
        assert!(!filters[2].accept("META-INF/persistence.xml"));
    }

    #[test]
    fn test_scan_section_and_defaults() {
        let profile = Profile::parse(
            r#"
            [scan]
            nested-mode = "stream"
            max-in-memory-bytes = 1024

            [[filter]]
            kind = "type"
            prefixes = ["org.acme."]
            content = true
            "#,
        )
        .unwrap();

        let scan = profile.scan.clone().unwrap();
        assert_eq!(scan.nested_mode, jarscan_core::NestedMode::Stream);
        assert_eq!(scan.max_in_memory_bytes, 1024);
        assert_eq!(scan.connect_timeout_secs, ScanConfig::default().connect_timeout_secs);

        let filters = profile.build_filters().unwrap();
        assert_eq!(profile.labels(), ["type"]);
        assert!(filters[0].accept("org.acme.Carpet"));
        assert!(!filters[0].accept("com.other.Carpet"));
        assert!(filters[0].wants_content());
        assert!(!filters[0].inspects_content());
    }

    #[test]
    fn test_invalid_profiles() {
        assert!(Profile::parse("").is_err());
        assert!(Profile::parse("[[filter]]\nkind = \"class\"").is_err());
        assert!(Profile::parse("[[filter]]\nkind = \"resource\"\nmarkers = [\"x.Y\"]").is_err());
        let err = Profile::parse(
            "[[filter]]\nkind = \"resource\"\nprefixes = [\"a\"]\nsuffixes = [\"b\"]",
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("cannot be combined"));
    }
}
