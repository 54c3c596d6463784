#![allow(dead_code)]

use chrono::NaiveDate;
use etfbalance::domain::error::EtfBalanceError;
use etfbalance::domain::ledger::LedgerSnapshot;
pub use etfbalance::domain::price::PriceRecord;
use etfbalance::domain::signal::SignalRecord;
use etfbalance::ports::data_port::{LedgerPort, PriceHistoryPort};
use etfbalance::ports::market_port::{MarketDataPort, RawRow};
use etfbalance::ports::push_port::PushPort;
use etfbalance::ports::signal_port::SignalPort;
use std::cell::{Cell, RefCell};

pub enum MarketReply {
    Rows(Vec<RawRow>),
    NoData,
    Transport(String),
    Malformed(String),
}

pub struct MockMarket {
    pub reply: MarketReply,
    pub calls: RefCell<Vec<(String, NaiveDate)>>,
}

impl MockMarket {
    pub fn new(reply: MarketReply) -> Self {
        Self {
            reply,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MarketDataPort for MockMarket {
    fn fetch_month(
        &self,
        ticker: &str,
        month_start: NaiveDate,
    ) -> Result<Option<Vec<RawRow>>, EtfBalanceError> {
        self.calls
            .borrow_mut()
            .push((ticker.to_string(), month_start));
        match &self.reply {
            MarketReply::Rows(rows) => Ok(Some(rows.clone())),
            MarketReply::NoData => Ok(None),
            MarketReply::Transport(reason) => Err(EtfBalanceError::Transport {
                reason: reason.clone(),
            }),
            MarketReply::Malformed(reason) => Err(EtfBalanceError::MalformedResponse {
                reason: reason.clone(),
            }),
        }
    }
}

pub struct MemoryPrices {
    pub records: RefCell<Option<Vec<PriceRecord>>>,
    pub saves: Cell<usize>,
}

impl MemoryPrices {
    pub fn new(records: Option<Vec<PriceRecord>>) -> Self {
        Self {
            records: RefCell::new(records),
            saves: Cell::new(0),
        }
    }
}

impl PriceHistoryPort for MemoryPrices {
    fn load_prices(&self) -> Result<Option<Vec<PriceRecord>>, EtfBalanceError> {
        Ok(self.records.borrow().clone())
    }

    fn save_prices(&self, records: &[PriceRecord]) -> Result<(), EtfBalanceError> {
        *self.records.borrow_mut() = Some(records.to_vec());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

pub struct MemoryLedger {
    pub rows: Vec<LedgerSnapshot>,
}

impl LedgerPort for MemoryLedger {
    fn load_ledger(&self) -> Result<Vec<LedgerSnapshot>, EtfBalanceError> {
        Ok(self.rows.clone())
    }
}

#[derive(Default)]
pub struct MemorySignals {
    pub rows: RefCell<Vec<SignalRecord>>,
}

impl SignalPort for MemorySignals {
    fn append_signal(&self, record: &SignalRecord) -> Result<(), EtfBalanceError> {
        self.rows.borrow_mut().push(record.clone());
        Ok(())
    }

    fn load_signals(&self) -> Result<Vec<SignalRecord>, EtfBalanceError> {
        Ok(self.rows.borrow().clone())
    }
}

pub enum PushReply {
    Status(u16, String),
    Transport(String),
}

pub struct RecordingPush {
    pub reply: PushReply,
    pub calls: RefCell<Vec<(String, String, serde_json::Value)>>,
}

impl RecordingPush {
    pub fn new(reply: PushReply) -> Self {
        Self {
            reply,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl PushPort for RecordingPush {
    fn post_json(
        &self,
        url: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<(u16, String), EtfBalanceError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), token.to_string(), body.clone()));
        match &self.reply {
            PushReply::Status(status, text) => Ok((*status, text.clone())),
            PushReply::Transport(reason) => Err(EtfBalanceError::Transport {
                reason: reason.clone(),
            }),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn raw_row(roc_date: &str, close: &str) -> RawRow {
    [
        roc_date,
        "10,000,000",
        "1,900,000,000",
        close,
        close,
        close,
        close,
        "0.00",
        "9,876",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn price(date: NaiveDate, close: f64) -> PriceRecord {
    PriceRecord {
        date,
        volume: 10_000_000.0,
        value: 1_900_000_000.0,
        open: close,
        high: close,
        low: close,
        close,
        change: 0.0,
        trade_count: 9_876.0,
    }
}

pub fn snapshot(date: NaiveDate, cash: f64, holdings: f64, total: f64) -> LedgerSnapshot {
    LedgerSnapshot {
        date: date.and_hms_opt(0, 0, 0).unwrap(),
        cash_after: cash,
        holdings_after: holdings,
        total_value_after: total,
    }
}
