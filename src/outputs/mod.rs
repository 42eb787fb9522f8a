//! Output generation for batch results and the daily timeline.
//!
//! # Submodules
//!
//! - [`csv`]: Writes and reads the per-article result table
//! - [`json`]: Writes the daily timeline and single-article inspections
//!
//! # Output Structure
//!
//! ```text
//! results.csv     # date,url,title,sentiment_score,overall_sentiment,...
//! timeline.json   # [{"date": "2025-09-23", "mean_score": ..., ...}, ...]
//! ```
//!
//! Parent directories are created as needed.

pub mod csv;
pub mod json;
