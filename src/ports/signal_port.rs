//! Signal history port trait.

use crate::domain::error::EtfBalanceError;
use crate::domain::signal::SignalRecord;

/// Append-only sink for engine runs.
pub trait SignalPort {
    fn append_signal(&self, record: &SignalRecord) -> Result<(), EtfBalanceError>;

    /// Every stored row in file order.
    fn load_signals(&self) -> Result<Vec<SignalRecord>, EtfBalanceError>;
}
