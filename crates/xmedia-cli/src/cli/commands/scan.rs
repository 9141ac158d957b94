//! `xmedia scan`: run the media scanner over a saved payload file.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use xmedia_core::scanner;

/// Reads and decodes a payload file.
pub fn load_payload(path: &str) -> Result<Value> {
    let bytes = std::fs::read(Path::new(path))
        .with_context(|| format!("read payload file: {}", path))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse payload JSON: {}", path))
}

pub fn run_scan(path: &str, max_depth: usize) -> Result<()> {
    let payload = load_payload(path)?;
    let records = scanner::scan(&payload, max_depth);
    if records.is_empty() {
        println!("no media records found");
        return Ok(());
    }
    tracing::info!(count = records.len(), "scan finished");
    for record in &records {
        println!("{}", serde_json::to_string_pretty(record)?);
    }
    Ok(())
}
