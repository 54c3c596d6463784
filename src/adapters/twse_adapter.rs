//! TWSE `STOCK_DAY` market data adapter.

use std::time::Duration;

use chrono::NaiveDate;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::error::EtfBalanceError;
use crate::domain::updater::month_key;
use crate::ports::market_port::{MarketDataPort, RawRow};

/// `STOCK_DAY` response body. Only `data` is used; `stat` is kept for logs.
#[derive(Debug, Deserialize)]
pub struct StockDayResponse {
    #[serde(default)]
    pub stat: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Vec<serde_json::Value>>>,
}

/// Parse a response body into raw rows. `Ok(None)` when `data` is absent or
/// empty.
pub fn parse_stock_day(body: &str) -> Result<Option<Vec<RawRow>>, EtfBalanceError> {
    let resp: StockDayResponse =
        serde_json::from_str(body).map_err(|e| EtfBalanceError::MalformedResponse {
            reason: format!("invalid STOCK_DAY JSON: {e}"),
        })?;

    let rows = match resp.data {
        Some(rows) if !rows.is_empty() => rows,
        _ => {
            debug!("STOCK_DAY returned no rows (stat: {:?})", resp.stat);
            return Ok(None);
        }
    };

    rows.into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect::<Result<RawRow, _>>())
        .collect::<Result<Vec<RawRow>, _>>()
        .map(Some)
}

fn cell_to_string(cell: serde_json::Value) -> Result<String, EtfBalanceError> {
    match cell {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(EtfBalanceError::MalformedResponse {
            reason: format!("unexpected cell {other}"),
        }),
    }
}

/// Blocking TWSE client.
pub struct TwseAdapter {
    client: Client,
    endpoint: String,
}

impl TwseAdapter {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, EtfBalanceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EtfBalanceError::Transport {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn request_url(&self, ticker: &str, month_start: NaiveDate) -> String {
        format!(
            "{}?response=json&date={}&stockNo={}",
            self.endpoint,
            month_key(month_start),
            ticker
        )
    }
}

impl MarketDataPort for TwseAdapter {
    fn fetch_month(
        &self,
        ticker: &str,
        month_start: NaiveDate,
    ) -> Result<Option<Vec<RawRow>>, EtfBalanceError> {
        let url = self.request_url(ticker, month_start);
        debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| EtfBalanceError::Transport {
                reason: format!("STOCK_DAY request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(EtfBalanceError::Transport {
                reason: format!("STOCK_DAY returned {}", resp.status()),
            });
        }

        let body = resp.text().map_err(|e| EtfBalanceError::Transport {
            reason: format!("failed to read STOCK_DAY body: {e}"),
        })?;
        parse_stock_day(&body)
    }
}
