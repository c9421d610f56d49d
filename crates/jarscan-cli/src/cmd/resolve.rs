//! Resolve command

use std::io::Write;

use anyhow::{Context, Result};
use jarscan_core::{Locator, ScanConfig};

use crate::report::ResolveReport;

/// Parse a locator and print its chain without traversing it.
pub fn resolve(locator: &str, probe: bool, json: bool) -> Result<()> {
    let parsed = Locator::parse(locator).with_context(|| format!("Invalid locator '{locator}'"))?;
    let reachable = probe.then(|| parsed.probe(&ScanConfig::from_env()));

    let report = ResolveReport {
        locator: parsed.as_str().to_string(),
        physical: parsed.physical().to_string(),
        remote: parsed.physical().is_remote(),
        segments: parsed.segments().to_vec(),
        unqualified_name: parsed.unqualified_name(),
        reachable,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        report.write_text(&mut out)?;
    }
    Ok(())
}
