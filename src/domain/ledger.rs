//! Trade ledger snapshot consumed by the rebalancing engine.

use chrono::NaiveDateTime;

/// One row of the externally maintained trade ledger, reduced to the
/// fields the engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    /// Trade time; midnight when the ledger records only a day.
    pub date: NaiveDateTime,
    pub cash_after: f64,
    pub holdings_after: f64,
    pub total_value_after: f64,
}

impl LedgerSnapshot {
    /// Value implied by cash plus holdings at `price`. Not checked against
    /// `total_value_after`.
    pub fn implied_total(&self, price: f64) -> f64 {
        self.cash_after + self.holdings_after * price
    }
}

/// Latest snapshot by timestamp; on an exact tie the row appearing last wins.
pub fn latest_snapshot(rows: &[LedgerSnapshot]) -> Option<&LedgerSnapshot> {
    rows.iter().max_by_key(|r| r.date)
}
