use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{MANIFEST_FILE, ManifestEntry, load_manifest};

/// Add or replace `currency`'s entry in `manifest.json`, keeping other currencies.
pub fn write_manifest(output_dir: &Path, currency: &str, entry: ManifestEntry) -> Result<()> {
    let path = output_dir.join(MANIFEST_FILE);
    let mut map: BTreeMap<String, ManifestEntry> = if path.exists() {
        load_manifest(output_dir)?
    } else {
        BTreeMap::new()
    };
    map.insert(currency.to_uppercase(), entry);

    let json = serde_json::to_string_pretty(&map)?;
    std::fs::write(&path, json).context("writing manifest.json")?;
    Ok(())
}

/// Write rows to a CSV file with a header line taken from `T`'s field names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV file {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
