//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - daily stats records (`DailyRecord`) and date ranges (`DateRange`)
//! - classification inputs and outputs (`Policy`, `BucketName`, `YearMonth`)
//! - run configuration (`ReportConfig`, `OutputFormat`)

pub mod types;

pub use types::*;
