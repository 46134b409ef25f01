//! Utility functions and helpers.
//!
//! - [`format`] - Thousands separators and half-to-even rounding
//! - [`time`] - Report date windows and date formats
//! - [`progress`] - Progress bar for multi-entity runs
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use lr_report_tools::utils::time::ReportWindow;
//!
//! let end = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
//! let window = ReportWindow::ending(end, 7);
//! assert_eq!(window.min_param(), "2025-02-26");
//! ```

pub mod format;
pub mod progress;
pub mod time;
