//! Options-chain analytics for Deribit-listed BTC and ETH options.
//!
//! [`model`] joins exchange payloads into a [`model::Snapshot`];
//! [`analytics`] derives every statistic from it as plain data. The
//! remaining modules (behind the default `full` feature) fetch snapshots,
//! render reports and drive the CLI.

pub mod analytics;
pub mod model;
pub mod schema;

#[cfg(feature = "full")]
pub mod analyze;
#[cfg(feature = "full")]
pub mod config;
#[cfg(feature = "full")]
pub mod daily;
#[cfg(feature = "full")]
pub mod data;
#[cfg(feature = "full")]
pub mod fetch_data;
#[cfg(feature = "full")]
pub mod hotspots;
#[cfg(feature = "full")]
pub mod report;
