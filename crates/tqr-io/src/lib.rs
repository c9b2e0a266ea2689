//! Reporting surface for the tridiagonal QR solver.
//!
//! This crate provides:
//! - **Plain report records** (`StudyRow`, `EigenSummary`, `ModalSummary`, `TimeSeries`)
//!   that carry numbers only, no solver types
//! - **Text tables** for convergence studies and spectra
//! - **CSV export** of displacement time series
//! - **JSON reports** stamped with a UTC timestamp, and generic JSON config loading
//! - The `ReportSink` trait, so callers can swap the rendering target

pub mod error;
mod output;
mod report;
pub mod sink;

pub use error::{IoError, Result};
pub use output::{
    Channel, EigenSummary, ModalSummary, StudyRow, TimeSeries, render_eigen_summary,
    render_modal_summary, render_study_table, render_table, write_time_series_csv,
};
pub use report::{Report, load_json, save_json};
pub use sink::{ReportSink, TextReporter};
