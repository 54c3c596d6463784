//! CSV file adapters for the price history, trade ledger and signal history.
//!
//! Files are written as UTF-8 with a byte-order mark; a leading BOM is
//! tolerated on read.

use crate::domain::error::EtfBalanceError;
use crate::domain::ledger::LedgerSnapshot;
use crate::domain::price::{parse_number, PriceRecord};
use crate::domain::signal::SignalRecord;
use crate::ports::data_port::{LedgerPort, PriceHistoryPort};
use crate::ports::signal_port::SignalPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const PRICE_HEADER: [&str; 9] = [
    "日期",
    "成交股數",
    "成交金額",
    "開盤價",
    "最高價",
    "最低價",
    "收盤價",
    "漲跌價差",
    "成交筆數",
];

pub const SIGNAL_HEADER: [&str; 14] = [
    "Date",
    "CurrentPrice",
    "TotalValue",
    "Holdings",
    "Cash",
    "CurrentRatio",
    "Action",
    "Shares",
    "TargetRatio",
    "Band",
    "Next_Buy_Price",
    "Next_Buy_Shares",
    "Next_Sell_Price",
    "Next_Sell_Shares",
];

const LEDGER_DATE: &str = "Date";
const LEDGER_CASH: &str = "Cash_After";
const LEDGER_HOLDINGS: &str = "Holdings_After";
const LEDGER_TOTAL: &str = "TotalValue_After";

const SIGNAL_DATE_FORMAT: &str = "%Y/%m/%d";

fn storage(reason: String) -> EtfBalanceError {
    EtfBalanceError::Storage { reason }
}

fn read_text(path: &Path) -> Result<String, EtfBalanceError> {
    let content = fs::read_to_string(path)
        .map_err(|e| storage(format!("failed to read {}: {}", path.display(), e)))?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

fn create_parent(path: &Path) -> Result<(), EtfBalanceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD` or `YYYY/MM/DD`, ignoring any trailing time part.
pub fn parse_stored_date(input: &str) -> Result<NaiveDate, EtfBalanceError> {
    Ok(parse_stored_timestamp(input)?.date())
}

/// Date as in [`parse_stored_date`], optionally followed by `HH:MM[:SS]`.
/// A bare date is taken as midnight.
pub fn parse_stored_timestamp(input: &str) -> Result<NaiveDateTime, EtfBalanceError> {
    let invalid = || storage(format!("invalid date '{}'", input));
    let mut parts = input.split_whitespace();
    let day = parts.next().unwrap_or("");
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y/%m/%d"))
        .map_err(|_| invalid())?;

    let time = match (parts.next(), parts.next()) {
        (None, _) => NaiveTime::default(),
        (Some(t), None) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
            .map_err(|_| invalid())?,
        (Some(_), Some(_)) => return Err(invalid()),
    };
    Ok(date.and_time(time))
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<&'r str, EtfBalanceError> {
    record
        .get(idx)
        .ok_or_else(|| storage(format!("missing {} column", name)))
}

fn number(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, EtfBalanceError> {
    parse_number(field(record, idx, name)?)
        .map_err(|e| storage(format!("invalid {} value: {}", name, e)))
}

fn count(record: &csv::StringRecord, idx: usize, name: &str) -> Result<u64, EtfBalanceError> {
    let value = number(record, idx, name)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(storage(format!("invalid {} value: {}", name, value)));
    }
    Ok(value as u64)
}

fn csv_error(path: &Path, e: csv::Error) -> EtfBalanceError {
    storage(format!("CSV error in {}: {}", path.display(), e))
}

/// Daily price history, rewritten in full on every save.
pub struct CsvPriceStore {
    path: PathBuf,
}

impl CsvPriceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PriceHistoryPort for CsvPriceStore {
    fn load_prices(&self) -> Result<Option<Vec<PriceRecord>>, EtfBalanceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = read_text(&self.path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            records.push(PriceRecord {
                date: parse_stored_date(field(&record, 0, "date")?)?,
                volume: number(&record, 1, "volume")?,
                value: number(&record, 2, "value")?,
                open: number(&record, 3, "open")?,
                high: number(&record, 4, "high")?,
                low: number(&record, 5, "low")?,
                close: number(&record, 6, "close")?,
                change: number(&record, 7, "change")?,
                trade_count: number(&record, 8, "trade count")?,
            });
        }

        records.sort_by_key(|r| r.date);
        Ok(Some(records))
    }

    fn save_prices(&self, records: &[PriceRecord]) -> Result<(), EtfBalanceError> {
        create_parent(&self.path)?;
        let mut file = File::create(&self.path)?;
        file.write_all(BOM)?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.write_record(PRICE_HEADER)
            .map_err(|e| csv_error(&self.path, e))?;
        for r in records {
            wtr.write_record([
                r.date.format("%Y-%m-%d").to_string(),
                r.volume.to_string(),
                r.value.to_string(),
                r.open.to_string(),
                r.high.to_string(),
                r.low.to_string(),
                r.close.to_string(),
                r.change.to_string(),
                r.trade_count.to_string(),
            ])
            .map_err(|e| csv_error(&self.path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Externally maintained trade ledger; columns are located by header name.
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl LedgerPort for CsvLedger {
    fn load_ledger(&self) -> Result<Vec<LedgerSnapshot>, EtfBalanceError> {
        let content = read_text(&self.path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| csv_error(&self.path, e))?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| storage(format!("ledger is missing column {}", name)))
        };
        let date_idx = column(LEDGER_DATE)?;
        let cash_idx = column(LEDGER_CASH)?;
        let holdings_idx = column(LEDGER_HOLDINGS)?;
        let total_idx = column(LEDGER_TOTAL)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            rows.push(LedgerSnapshot {
                date: parse_stored_timestamp(field(&record, date_idx, LEDGER_DATE)?)?,
                cash_after: number(&record, cash_idx, LEDGER_CASH)?,
                holdings_after: number(&record, holdings_idx, LEDGER_HOLDINGS)?,
                total_value_after: number(&record, total_idx, LEDGER_TOTAL)?,
            });
        }
        Ok(rows)
    }
}

/// Append-only signal history.
pub struct CsvSignalStore {
    path: PathBuf,
}

impl CsvSignalStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SignalPort for CsvSignalStore {
    fn append_signal(&self, s: &SignalRecord) -> Result<(), EtfBalanceError> {
        create_parent(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;
        if is_new {
            file.write_all(BOM)?;
        }

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            wtr.write_record(SIGNAL_HEADER)
                .map_err(|e| csv_error(&self.path, e))?;
        }
        wtr.write_record([
            s.date.format(SIGNAL_DATE_FORMAT).to_string(),
            s.current_price.to_string(),
            s.total_value.to_string(),
            s.holdings.to_string(),
            s.cash.to_string(),
            s.current_ratio.to_string(),
            s.action.to_string(),
            s.shares.to_string(),
            s.target_ratio.to_string(),
            s.band.to_string(),
            s.next_buy_price.to_string(),
            s.next_buy_shares.to_string(),
            s.next_sell_price.to_string(),
            s.next_sell_shares.to_string(),
        ])
        .map_err(|e| csv_error(&self.path, e))?;
        wtr.flush()?;
        Ok(())
    }

    fn load_signals(&self) -> Result<Vec<SignalRecord>, EtfBalanceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = read_text(&self.path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut signals = Vec::new();

        for result in rdr.records() {
            let r = result.map_err(|e| csv_error(&self.path, e))?;
            signals.push(SignalRecord {
                date: parse_stored_date(field(&r, 0, "Date")?)?,
                current_price: number(&r, 1, "CurrentPrice")?,
                total_value: number(&r, 2, "TotalValue")?,
                holdings: number(&r, 3, "Holdings")?,
                cash: number(&r, 4, "Cash")?,
                current_ratio: number(&r, 5, "CurrentRatio")?,
                action: field(&r, 6, "Action")?
                    .parse()
                    .map_err(|e| storage(format!("invalid Action value: {}", e)))?,
                shares: count(&r, 7, "Shares")?,
                target_ratio: number(&r, 8, "TargetRatio")?,
                band: number(&r, 9, "Band")?,
                next_buy_price: number(&r, 10, "Next_Buy_Price")?,
                next_buy_shares: count(&r, 11, "Next_Buy_Shares")?,
                next_sell_price: number(&r, 12, "Next_Sell_Price")?,
                next_sell_shares: count(&r, 13, "Next_Sell_Shares")?,
            });
        }
        Ok(signals)
    }
}
