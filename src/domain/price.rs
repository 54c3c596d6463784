//! Daily price records and the persisted price history.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::domain::error::EtfBalanceError;

/// Offset between the ROC (Minguo) calendar year and the Gregorian year.
pub const ROC_YEAR_OFFSET: i32 = 1911;

/// Number of columns in one exchange row: date plus eight numeric fields.
pub const RAW_ROW_COLUMNS: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub volume: f64,
    pub value: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub change: f64,
    pub trade_count: f64,
}

impl PriceRecord {
    /// Build a record from one exchange row:
    /// `[roc date, volume, value, open, high, low, close, change, trades]`.
    pub fn from_raw_row(row: &[String]) -> Result<Self, EtfBalanceError> {
        if row.len() != RAW_ROW_COLUMNS {
            return Err(EtfBalanceError::MalformedResponse {
                reason: format!(
                    "expected {} columns, got {}",
                    RAW_ROW_COLUMNS,
                    row.len()
                ),
            });
        }

        let date = parse_roc_date(&row[0])?;
        let field = |idx: usize, name: &str| {
            parse_number(&row[idx]).map_err(|reason| EtfBalanceError::MalformedResponse {
                reason: format!("{} on {}: {}", name, date, reason),
            })
        };

        Ok(PriceRecord {
            date,
            volume: field(1, "volume")?,
            value: field(2, "value")?,
            open: field(3, "open")?,
            high: field(4, "high")?,
            low: field(5, "low")?,
            close: field(6, "close")?,
            change: field(7, "change")?,
            trade_count: field(8, "trade count")?,
        })
    }
}

/// Convert a ROC calendar date (`114/09/01`) to a Gregorian date.
pub fn parse_roc_date(input: &str) -> Result<NaiveDate, EtfBalanceError> {
    let malformed = || EtfBalanceError::MalformedResponse {
        reason: format!("invalid ROC date '{}'", input),
    };

    let mut parts = input.trim().split('/');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    let year: i32 = y.parse().map_err(|_| malformed())?;
    let month: u32 = m.parse().map_err(|_| malformed())?;
    let day: u32 = d.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year + ROC_YEAR_OFFSET, month, day).ok_or_else(malformed)
}

/// Parse a numeric field after stripping thousands separators.
pub fn parse_number(input: &str) -> Result<f64, String> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("not a number: '{}'", input))
}

/// Merge a fetched batch into an existing history.
///
/// Existing rows come first, so on a date collision the existing row is kept.
/// The result is sorted ascending by date with unique dates.
pub fn merge_history(existing: Vec<PriceRecord>, fetched: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<PriceRecord> = existing
        .into_iter()
        .chain(fetched)
        .filter(|r| seen.insert(r.date))
        .collect();
    merged.sort_by_key(|r| r.date);
    merged
}

/// The record with the latest date, if any.
pub fn latest(records: &[PriceRecord]) -> Option<&PriceRecord> {
    records.iter().max_by_key(|r| r.date)
}
