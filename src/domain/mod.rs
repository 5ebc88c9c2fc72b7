//! Core domain types and logic.

pub mod time_series;
pub mod calendar;
pub mod returns;
pub mod indicator;
pub mod manual_input;
pub mod checklist;
pub mod checklist_config;
pub mod scoring;
pub mod snapshot;
pub mod evaluate;
pub mod error;
