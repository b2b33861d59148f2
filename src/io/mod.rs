//! Input/output helpers.
//!
//! - JSON export document build/write/read (`export`)

pub mod export;

pub use export::*;
