//! Exchange market data port trait.

use crate::domain::error::EtfBalanceError;
use chrono::NaiveDate;

/// Raw exchange row: ROC date followed by eight numeric strings.
pub type RawRow = Vec<String>;

pub trait MarketDataPort {
    /// Fetch every daily row of the month starting at `month_start`.
    ///
    /// `Ok(None)` means the exchange answered without data.
    fn fetch_month(
        &self,
        ticker: &str,
        month_start: NaiveDate,
    ) -> Result<Option<Vec<RawRow>>, EtfBalanceError>;
}
