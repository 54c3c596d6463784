//! One rebalancing run: latest price + latest ledger snapshot → signal.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::domain::error::EtfBalanceError;
use crate::domain::ledger::latest_snapshot;
use crate::domain::price::latest;
use crate::domain::rebalance::{decide, next_signal, RebalancePolicy, ZeroValuePolicy};
use crate::domain::signal::SignalRecord;
use crate::ports::data_port::{LedgerPort, PriceHistoryPort};

/// Evaluate the policy against stored state. Persisting the result is left
/// to the caller.
pub fn evaluate(
    prices: &dyn PriceHistoryPort,
    ledger: &dyn LedgerPort,
    policy: &RebalancePolicy,
    today: NaiveDate,
) -> Result<SignalRecord, EtfBalanceError> {
    let history = prices.load_prices()?.unwrap_or_default();
    let price = latest(&history)
        .map(|r| r.close)
        .ok_or(EtfBalanceError::NoPriceData)?;

    let rows = ledger.load_ledger()?;
    let snapshot = latest_snapshot(&rows).ok_or(EtfBalanceError::NoLedgerData)?;

    debug!(
        "ledger as of {}: total {}, implied at close {}: {}",
        snapshot.date,
        snapshot.total_value_after,
        price,
        snapshot.implied_total(price)
    );

    if snapshot.total_value_after <= 0.0 {
        match policy.on_zero_total_value {
            ZeroValuePolicy::Reject => {
                return Err(EtfBalanceError::ZeroTotalValue {
                    date: snapshot.date.date().to_string(),
                });
            }
            ZeroValuePolicy::Hold => {
                warn!(
                    "ledger total value is {} as of {}; allocation treated as 0",
                    snapshot.total_value_after, snapshot.date
                );
            }
        }
    }

    let decision = decide(
        price,
        snapshot.holdings_after,
        snapshot.cash_after,
        snapshot.total_value_after,
        policy,
    );
    let next = next_signal(
        price,
        snapshot.holdings_after,
        snapshot.total_value_after,
        policy,
    );

    Ok(SignalRecord::new(today, &decision, &next, policy))
}
