//! Price history and trade ledger access port traits.

use crate::domain::error::EtfBalanceError;
use crate::domain::ledger::LedgerSnapshot;
use crate::domain::price::PriceRecord;

pub trait PriceHistoryPort {
    /// Load the stored history, or `None` when no history exists yet.
    fn load_prices(&self) -> Result<Option<Vec<PriceRecord>>, EtfBalanceError>;

    /// Replace the stored history with `records`.
    fn save_prices(&self, records: &[PriceRecord]) -> Result<(), EtfBalanceError>;
}

pub trait LedgerPort {
    fn load_ledger(&self) -> Result<Vec<LedgerSnapshot>, EtfBalanceError>;
}
