//! `adstats` library crate.
//!
//! The binary (`adstats`) is a thin wrapper around this library so that:
//!
//! - classification and aggregation are testable without network or processes
//! - each report flavor is one policy value, not a separate script
//! - presentation stays separate from the numbers it presents

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
