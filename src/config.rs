use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::analytics::AnalyticsConfig;
use crate::fetch_data::deribit::DEFAULT_BASE_URL;

pub const API_KEY_ENV: &str = "DERIBIT_API_KEY";
pub const BASE_URL_ENV: &str = "DERIBIT_BASE_URL";

/// Underlyings with a listed options market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[value(name = "BTC", alias = "btc")]
    Btc,
    #[value(name = "ETH", alias = "eth")]
    Eth,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Btc, Currency::Eth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration shared by all commands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Read exchange settings from the environment and analytics settings
    /// from `config_path` (JSON) when given. Missing keys keep their defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let analytics = match config_path {
            Some(path) => load_analytics_config(path)?,
            None => AnalyticsConfig::default(),
        };

        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::debug!("{API_KEY_ENV} not set; using unauthenticated requests");
        }
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(AppConfig {
            base_url,
            api_key,
            analytics,
        })
    }

    /// Override the hotspot threshold when one was passed on the command line.
    pub fn with_hotspot_threshold(mut self, threshold_pct: Option<f64>) -> Self {
        if let Some(t) = threshold_pct {
            self.analytics.hotspot_threshold_pct = t;
        }
        self
    }
}

pub fn load_analytics_config(path: &Path) -> Result<AnalyticsConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    let config: AnalyticsConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config at {}", path.display()))?;
    anyhow::ensure!(
        config.near_term_max_days < config.mid_term_max_days,
        "near_term_max_days ({}) must be below mid_term_max_days ({})",
        config.near_term_max_days,
        config.mid_term_max_days
    );
    Ok(config)
}
