//! Persisted signal history rows.

use chrono::NaiveDate;

use super::rebalance::{Action, NextSignal, RebalanceDecision, RebalancePolicy};

/// One engine run, as appended to the signal history.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub current_price: f64,
    pub total_value: f64,
    pub holdings: f64,
    pub cash: f64,
    pub current_ratio: f64,
    pub action: Action,
    pub shares: u64,
    pub target_ratio: f64,
    pub band: f64,
    pub next_buy_price: f64,
    pub next_buy_shares: u64,
    pub next_sell_price: f64,
    pub next_sell_shares: u64,
}

impl SignalRecord {
    pub fn new(
        date: NaiveDate,
        decision: &RebalanceDecision,
        next: &NextSignal,
        policy: &RebalancePolicy,
    ) -> Self {
        SignalRecord {
            date,
            current_price: decision.price,
            total_value: decision.total_value,
            holdings: decision.holdings,
            cash: decision.cash,
            current_ratio: decision.current_ratio,
            action: decision.action,
            shares: decision.shares,
            target_ratio: policy.target_ratio,
            band: policy.band,
            next_buy_price: next.next_buy_price,
            next_buy_shares: next.next_buy_shares,
            next_sell_price: next.next_sell_price,
            next_sell_shares: next.next_sell_shares,
        }
    }

    /// One-line summary printed to the console, logged, and pushed to the
    /// notifier.
    pub fn message(&self) -> String {
        format!(
            "price {:.2}, total value {:.2}, allocation {:.2}%, action: {} {} shares",
            self.current_price,
            self.total_value,
            self.current_ratio * 100.0,
            self.action,
            self.shares
        )
    }

    /// Follow-up line with the look-ahead trigger levels.
    pub fn outlook(&self) -> String {
        format!(
            "next buy below {:.2} ({} shares), next sell above {:.2} ({} shares)",
            self.next_buy_price, self.next_buy_shares, self.next_sell_price, self.next_sell_shares
        )
    }
}
