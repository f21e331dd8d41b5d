//! Single-run snapshots - one metadata file per run, separate from the combined store

use crate::MetaData;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Join the descriptions that are present with `"|"`, preserving order.
fn join_descriptions(descriptions: &[Option<String>]) -> String {
    descriptions
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

/// Write one run's metadata to `file`, with its `description` field set to
/// the joined descriptions. Overwrites prior content unconditionally.
///
/// Never returns an error: failures are reported through the log channel.
/// The `description` mutation is observable to the caller either way.
pub fn write_snapshot(meta: &mut MetaData, file: &Path, descriptions: &[Option<String>]) {
    meta.insert(
        "description".to_string(),
        Value::String(join_descriptions(descriptions)),
    );
    if let Err(e) = try_write_snapshot(meta, file) {
        tracing::error!("snapshot write failed for {}: {:#}", file.display(), e);
    }
}

fn try_write_snapshot(meta: &MetaData, file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let content = serde_json::to_string(meta).context("Failed to serialize metadata")?;
    fs::write(file, content).with_context(|| format!("Failed to write {}", file.display()))
}
