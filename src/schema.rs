use schemars::schema_for;

use crate::analytics::DailySummary;

/// Generate and print the JSON Schema for `DailySummary`.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(DailySummary);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
