//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_trade_exporter;
pub mod file_config_adapter;
pub mod json_report_exporter;
