//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod manual_input_adapter;
pub mod text_report;
pub mod csv_report;
