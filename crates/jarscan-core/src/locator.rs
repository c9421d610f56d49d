//! Locator parsing: `["jar:"]* physical ["!" inner]*`.
//!
//! Parsing is purely lexical on `!` boundaries. Whether an inner segment is
//! really an archive (or a directory inside one) is only discovered during
//! traversal.

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

use crate::config::ScanConfig;
use crate::member::normalize_path;
use crate::remote;

const JAR_PREFIX: &str = "jar:";

/// Errors raised while parsing a locator string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// The locator (or its physical part) is empty.
    #[error("Empty locator")]
    Empty,

    /// Two `!` separators with nothing between them.
    #[error("Empty segment {position} in '{locator}'")]
    EmptySegment { locator: String, position: usize },

    /// The physical location uses a scheme that cannot be opened.
    #[error("Unsupported scheme '{scheme}' in '{locator}'")]
    UnsupportedScheme { locator: String, scheme: String },

    /// A `file:` URL that does not map to a local path.
    #[error("Invalid file URL '{0}'")]
    InvalidFileUrl(String),

    /// A resource locator that does not end with the resource's entry path.
    #[error("'{locator}' does not end with entry '{entry}'")]
    EntryMismatch { locator: String, entry: String },
}

/// Where the outermost archive or directory physically lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhysicalLocation {
    /// A path on the local filesystem (directory or archive file).
    Local(PathBuf),
    /// A remote archive reachable only as a forward-only byte stream.
    Remote(Url),
}

impl PhysicalLocation {
    fn parse(raw: &str, locator: &str) -> Result<Self, LocatorError> {
        match Url::parse(raw) {
            // Single-letter schemes are Windows drive letters, not URLs.
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "file" => url
                    .to_file_path()
                    .map(Self::Local)
                    .map_err(|()| LocatorError::InvalidFileUrl(raw.to_string())),
                "http" | "https" => Ok(Self::Remote(url)),
                scheme => Err(LocatorError::UnsupportedScheme {
                    locator: locator.to_string(),
                    scheme: scheme.to_string(),
                }),
            },
            _ => Ok(Self::Local(PathBuf::from(raw))),
        }
    }

    /// Whether the location can only be read as a stream.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Base name of the location (last path component).
    pub fn file_name(&self) -> String {
        match self {
            Self::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                // `.` and `..` only have a name once resolved.
                .or_else(|| {
                    let resolved = path.canonicalize().ok()?;
                    Some(resolved.file_name()?.to_string_lossy().into_owned())
                })
                .unwrap_or_default(),
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl fmt::Display for PhysicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// A parsed locator chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    physical: PhysicalLocation,
    segments: Vec<String>,
}

impl Locator {
    /// Parse a locator string.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError`] for empty locators, empty inner segments and
    /// unsupported URL schemes.
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let raw = input.trim();
        let mut body = raw;
        while body
            .get(..JAR_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(JAR_PREFIX))
        {
            body = &body[JAR_PREFIX.len()..];
        }

        let mut parts = body.split('!');
        let physical = parts.next().unwrap_or_default().trim();
        if physical.is_empty() {
            return Err(LocatorError::Empty);
        }

        let inner: Vec<&str> = parts.collect();
        let mut segments = Vec::with_capacity(inner.len());
        for (i, part) in inner.iter().enumerate() {
            let segment = normalize_path(part);
            if segment.is_empty() {
                // A trailing `!` or `!/` just names the archive root.
                if i + 1 == inner.len() {
                    continue;
                }
                return Err(LocatorError::EmptySegment {
                    locator: raw.to_string(),
                    position: i + 1,
                });
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            physical: PhysicalLocation::parse(physical, raw)?,
            segments,
        })
    }

    /// Recover the unit locator from the locator of a resource inside it.
    ///
    /// `jar:http://host/app.jar!/META-INF/persistence.xml` with entry
    /// `/META-INF/persistence.xml` yields the locator of `app.jar`.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::EntryMismatch`] if `resource` does not end with
    /// `entry`, or any error [`Locator::parse`] reports for the remainder.
    pub fn from_resource(resource: &str, entry: &str) -> Result<Self, LocatorError> {
        let resource = resource.trim();
        let stripped = resource
            .strip_suffix(entry.trim())
            .ok_or_else(|| LocatorError::EntryMismatch {
                locator: resource.to_string(),
                entry: entry.to_string(),
            })?;
        let stripped = stripped.trim_end_matches('/');
        Self::parse(stripped.strip_suffix('!').unwrap_or(stripped))
    }

    /// The locator as given (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The outermost physical location.
    pub fn physical(&self) -> &PhysicalLocation {
        &self.physical
    }

    /// Inner paths to descend through, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the locator has at least one `!` segment.
    pub fn is_nested(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Base name of the outermost physical location without its extension.
    pub fn unqualified_name(&self) -> String {
        unqualify(&self.physical.file_name())
    }

    /// Display form of the chain down to `depth` inner segments.
    pub fn layer_location(&self, depth: usize) -> String {
        let mut location = self.physical.to_string();
        for segment in self.segments.iter().take(depth) {
            location.push('!');
            location.push_str(segment);
        }
        location
    }

    /// Best-effort reachability check. Never fails; `false` means unreachable.
    pub fn probe(&self, config: &ScanConfig) -> bool {
        match &self.physical {
            PhysicalLocation::Local(path) => path.exists(),
            PhysicalLocation::Remote(url) => remote::probe(url, config),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Strip directories and the last extension from a unit name.
pub fn unqualify(name: &str) -> String {
    let base = Path::new(name.trim_end_matches(['/', '\\']))
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.rfind('.') {
        Some(dot) if dot > 0 => base[..dot].to_string(),
        _ => base,
    }
}
