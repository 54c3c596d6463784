//! Market data update: fetch one month, clean it, merge into the history.

use chrono::{Datelike, NaiveDate};
use log::{error, info, warn};

use crate::domain::error::EtfBalanceError;
use crate::domain::price::{merge_history, PriceRecord};
use crate::ports::data_port::PriceHistoryPort;
use crate::ports::market_port::{MarketDataPort, RawRow};

/// What to do with exchange rows that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the update and leave the history untouched.
    #[default]
    Abort,
    /// Drop the bad rows with a warning and merge the rest.
    Skip,
}

impl std::str::FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(MalformedPolicy::Abort),
            "skip" => Ok(MalformedPolicy::Skip),
            other => Err(format!("expected 'abort' or 'skip', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No history existed; a new one was written from the fetched rows.
    Created { rows: usize },
    /// Fetched rows were merged into the existing history.
    Merged { fetched: usize, total: usize },
    /// Nothing usable came back; the history was not touched.
    Skipped,
}

/// First day of the month containing `today`.
pub fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Exchange query key for a month, e.g. `20250901`.
pub fn month_key(month_start: NaiveDate) -> String {
    format!("{:04}{:02}01", month_start.year(), month_start.month())
}

/// Parse raw exchange rows into records according to `policy`.
pub fn clean_rows(
    raw: &[RawRow],
    policy: MalformedPolicy,
) -> Result<Vec<PriceRecord>, EtfBalanceError> {
    let mut records = Vec::with_capacity(raw.len());
    for row in raw {
        match PriceRecord::from_raw_row(row) {
            Ok(r) => records.push(r),
            Err(e) if policy == MalformedPolicy::Skip => {
                warn!("skipping exchange row {:?}: {}", row, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

pub fn update_price_history(
    market: &dyn MarketDataPort,
    store: &dyn PriceHistoryPort,
    ticker: &str,
    month_start: NaiveDate,
    policy: MalformedPolicy,
) -> Result<UpdateOutcome, EtfBalanceError> {
    info!("fetching {} for month {}", ticker, month_key(month_start));

    let raw = match market.fetch_month(ticker, month_start) {
        Ok(Some(rows)) if !rows.is_empty() => rows,
        Ok(_) => {
            warn!("exchange returned no data; skipping update");
            return Ok(UpdateOutcome::Skipped);
        }
        Err(e @ EtfBalanceError::Transport { .. }) => {
            error!("failed to fetch exchange data: {}", e);
            warn!("no new data; skipping update");
            return Ok(UpdateOutcome::Skipped);
        }
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    let fetched = match clean_rows(&raw, policy) {
        Ok(records) => records,
        Err(e) => {
            error!("aborting update: {}", e);
            return Err(e);
        }
    };

    if fetched.is_empty() {
        warn!("no usable rows after cleaning; skipping update");
        return Ok(UpdateOutcome::Skipped);
    }

    match store.load_prices()? {
        Some(existing) => {
            let count = fetched.len();
            let merged = merge_history(existing, fetched);
            store.save_prices(&merged)?;
            info!("price history updated, {} rows in total", merged.len());
            Ok(UpdateOutcome::Merged {
                fetched: count,
                total: merged.len(),
            })
        }
        None => {
            let created = merge_history(Vec::new(), fetched);
            store.save_prices(&created)?;
            info!("price history created with {} rows", created.len());
            Ok(UpdateOutcome::Created {
                rows: created.len(),
            })
        }
    }
}
