//! Turning scan results into printable reports.

use std::io::{self, Write};

use jarscan_core::{Entry, ScanResult};
use serde::Serialize;

/// One matched member.
#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub name: String,
    /// Bytes read through the content handle, if one was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_bytes: Option<u64>,
    /// Why the content handle could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_error: Option<String>,
}

impl EntryReport {
    /// Drain the entry's content handle, if any, and record what happened.
    fn from_entry(entry: Entry) -> Self {
        let (name, content) = entry.into_parts();
        let mut report = Self {
            name,
            content_bytes: None,
            content_error: None,
        };
        if let Some(mut content) = content {
            match io::copy(&mut content, &mut io::sink()) {
                Ok(n) => report.content_bytes = Some(n),
                Err(e) => {
                    tracing::warn!("Content of {} unreadable: {e}", report.name);
                    report.content_error = Some(e.to_string());
                }
            }
            content.close();
        }
        report
    }
}

/// Matches of one filter.
#[derive(Debug, Serialize)]
pub struct SetReport {
    pub filter: String,
    pub entries: Vec<EntryReport>,
}

/// Everything found in one scanned unit.
#[derive(Debug, Serialize)]
pub struct UnitReport {
    pub locator: String,
    pub unqualified_name: String,
    pub members_visited: usize,
    pub sets: Vec<SetReport>,
}

impl UnitReport {
    /// Consume a scan result; `labels` name the filters in result-set order.
    pub fn new(locator: &str, result: ScanResult, labels: &[String]) -> Self {
        let unqualified_name = result.unqualified_name().to_string();
        let members_visited = result.members_visited();
        let sets = result
            .into_sets()
            .into_iter()
            .zip(labels)
            .map(|(set, label)| SetReport {
                filter: label.clone(),
                entries: set.into_iter().map(EntryReport::from_entry).collect(),
            })
            .collect();

        Self {
            locator: locator.to_string(),
            unqualified_name,
            members_visited,
            sets,
        }
    }

    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "{} ({}): {} members",
            self.unqualified_name, self.locator, self.members_visited
        )?;
        for (i, set) in self.sets.iter().enumerate() {
            writeln!(out, "  [{i}] {}: {}", set.filter, set.entries.len())?;
            for entry in &set.entries {
                match (&entry.content_bytes, &entry.content_error) {
                    (Some(n), _) => writeln!(out, "      {} ({n} bytes)", entry.name)?,
                    (None, Some(e)) => writeln!(out, "      {} (unreadable: {e})", entry.name)?,
                    (None, None) => writeln!(out, "      {}", entry.name)?,
                }
            }
        }
        Ok(())
    }
}

/// Result of `jarscan resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub locator: String,
    pub physical: String,
    pub remote: bool,
    pub segments: Vec<String>,
    pub unqualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
}

impl ResolveReport {
    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "locator:          {}", self.locator)?;
        writeln!(
            out,
            "physical:         {} ({})",
            self.physical,
            if self.remote { "remote" } else { "local" }
        )?;
        for (depth, segment) in self.segments.iter().enumerate() {
            writeln!(out, "segment {}:        {segment}", depth + 1)?;
        }
        writeln!(out, "unqualified name: {}", self.unqualified_name)?;
        if let Some(reachable) = self.reachable {
            writeln!(out, "reachable:        {}", if reachable { "yes" } else { "no" })?;
        }
        Ok(())
    }
}
