//! Data sources.
//!
//! - stats endpoint client + response decoding (`client`)

pub mod client;

pub use client::*;
