//! Scan command

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use jarscan_core::{NestedMode, RemotePolicy, ScanConfig, Scanner};

use crate::profile::Profile;
use crate::report::UnitReport;

/// Options shared by every locator of one invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub json: bool,
    pub best_effort: bool,
    pub stream_nested: bool,
}

/// Effective configuration: environment, then the profile's `[scan]` table, then flags.
fn effective_config(profile: &Profile, options: &ScanOptions) -> ScanConfig {
    let mut config = profile.scan.clone().unwrap_or_else(ScanConfig::from_env);
    if options.best_effort {
        config.remote_policy = RemotePolicy::BestEffort;
    }
    if options.stream_nested {
        config.nested_mode = NestedMode::Stream;
    }
    config
}

fn scan_one(scanner: &Scanner, profile: &Profile, locator: &str) -> Result<UnitReport> {
    let filters = profile.build_filters()?;
    let result = scanner
        .scan(locator, &filters)
        .with_context(|| format!("Failed to scan {locator}"))?;
    Ok(UnitReport::new(locator, result, &profile.labels()))
}

/// Scan every locator concurrently and print the reports in argument order.
pub async fn scan(locators: &[String], profile_path: Option<&Path>, options: &ScanOptions) -> Result<()> {
    let profile = match profile_path {
        Some(path) => Profile::load(path)?,
        None => Profile::builtin()?,
    };
    let scanner = Scanner::new(effective_config(&profile, options));
    tracing::debug!("Scanning {} locators with {:?}", locators.len(), scanner.config());
    let profile = Arc::new(profile);

    let handles: Vec<_> = locators
        .iter()
        .map(|locator| {
            let scanner = scanner.clone();
            let profile = Arc::clone(&profile);
            let locator = locator.clone();
            tokio::task::spawn_blocking(move || scan_one(&scanner, &profile, &locator))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    let mut failures = 0usize;
    for handle in handles {
        match handle.await.map_err(|e| anyhow!("Task panic: {e}"))? {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                eprintln!("error: {e:#}");
            }
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if options.json {
        serde_json::to_writer_pretty(&mut out, &reports)?;
        writeln!(out)?;
    } else {
        for report in &reports {
            report.write_text(&mut out)?;
        }
    }
    out.flush()?;

    if failures > 0 {
        bail!("{failures} of {} scans failed", locators.len());
    }
    Ok(())
}
