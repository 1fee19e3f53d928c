use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::feed::{FeedError, OptionFeed};
use crate::model::{IndexPrice, InstrumentDescriptor, InstrumentSummary};

pub const DEFAULT_BASE_URL: &str = "https://www.deribit.com/api/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ── API response types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Deribit public REST API, v2.
pub struct DeribitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl DeribitClient {
    /// `api_key`, when present, is sent as a bearer token on every request.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("optchain/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(DeribitClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T, FeedError> {
        let url = format!("{}/public/{method}", self.base_url);
        let mut req = self.http.get(&url).query(params);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        tracing::debug!(method, ?params, "deribit request");
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = resp.json().await?;
        if let Some(err) = envelope.error {
            return Err(FeedError::Api {
                message: format!("{} (code {})", err.message, err.code),
            });
        }
        envelope.result.ok_or(FeedError::MissingResult)
    }
}

#[async_trait]
impl OptionFeed for DeribitClient {
    async fn index_price(&self, currency: &str) -> Result<IndexPrice, FeedError> {
        let index_name = format!("{}_usd", currency.to_lowercase());
        self.get("get_index_price", &[("index_name", index_name.as_str())])
            .await
    }

    async fn option_instruments(&self, currency: &str) -> Result<Vec<InstrumentDescriptor>, FeedError> {
        self.get(
            "get_instruments",
            &[("currency", currency), ("kind", "option"), ("expired", "false")],
        )
        .await
    }

    async fn option_summaries(&self, currency: &str) -> Result<Vec<InstrumentSummary>, FeedError> {
        self.get(
            "get_book_summary_by_currency",
            &[("currency", currency), ("kind", "option")],
        )
        .await
    }

    fn name(&self) -> &str {
        "deribit"
    }
}
