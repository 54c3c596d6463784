//! Port traits: interfaces the domain depends on.

pub mod config_port;
pub mod data_port;
pub mod market_port;
pub mod push_port;
pub mod signal_port;
