//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod line_push_adapter;
pub mod twse_adapter;
