use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{OptionRecord, Snapshot};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Entry in the data manifest mapping a currency to its snapshot CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub spot: f64,
    pub captured_at: DateTime<Utc>,
    pub records: usize,
}

/// Load the data manifest from `manifest.json` in the data directory.
pub fn load_manifest(data_dir: &Path) -> Result<BTreeMap<String, ManifestEntry>> {
    let manifest_path = data_dir.join(MANIFEST_FILE);
    let contents = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("reading manifest at {}", manifest_path.display()))?;
    let manifest: BTreeMap<String, ManifestEntry> =
        serde_json::from_str(&contents).with_context(|| "parsing manifest.json")?;
    Ok(manifest)
}

/// Load CSV rows of type T from a file in the data directory.
pub fn load_csv<T: for<'de> Deserialize<'de>>(data_dir: &Path, filename: &str) -> Result<Vec<T>> {
    let path = data_dir.join(filename);
    let mut rdr = csv::Reader::from_path(&path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;
    let rows: Vec<T> = rdr
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parsing CSV file {}", path.display()))?;
    Ok(rows)
}

/// Rebuild the snapshot of `currency` that `fetch-data` saved to `data_dir`.
///
/// Records keep the day counts they had at capture time.
pub fn load_snapshot(data_dir: &Path, currency: &str) -> Result<Snapshot> {
    let manifest = load_manifest(data_dir)?;
    let key = currency.to_uppercase();
    let entry = manifest.get(&key).with_context(|| {
        format!(
            "no {key} snapshot in {}; run fetch-data --currency {key} first",
            data_dir.join(MANIFEST_FILE).display()
        )
    })?;
    let records: Vec<OptionRecord> = load_csv(data_dir, &entry.file)?;
    if records.len() != entry.records {
        tracing::warn!(
            file = %entry.file,
            expected = entry.records,
            found = records.len(),
            "snapshot row count differs from manifest"
        );
    }
    let snapshot = Snapshot::from_records(&key, entry.spot, entry.captured_at, records)
        .with_context(|| format!("rebuilding {key} snapshot from {}", entry.file))?;
    Ok(snapshot)
}

/// Timestamp embedded in every output filename, e.g. `20250314_081500`.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn file_stamp(at: DateTime<Utc>) -> String {
    at.format(FILE_STAMP_FORMAT).to_string()
}
