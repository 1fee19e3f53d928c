use std::path::PathBuf;

use anyhow::Result;

use crate::analyze::prepare;
use crate::config::{AppConfig, Currency};
use crate::report::console;

/// Options for the `hotspots` command.
pub struct HotspotsConfig {
    pub currency: Currency,
    pub threshold: Option<f64>,
    pub limit: usize,
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

/// Run the hotspots command.
pub fn run(cfg: &HotspotsConfig) -> Result<()> {
    let app = AppConfig::load(cfg.config_path.as_deref())?;
    let analyzer = prepare(&app, cfg.currency, cfg.data_dir.as_deref())?;

    let report = analyzer.hotspots(cfg.threshold)?;
    tracing::info!(
        currency = %cfg.currency,
        threshold = report.threshold_pct,
        hotspots = report.summary.total_hotspots,
        "hotspot scan complete"
    );
    console::print_hotspots(cfg.currency.as_str(), &report, cfg.limit);
    Ok(())
}
