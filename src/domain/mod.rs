//! Core domain types and logic.

pub mod price;
pub mod ledger;
pub mod rebalance;
pub mod signal;
pub mod engine;
pub mod updater;
pub mod notifier;
pub mod settings;
pub mod error;
