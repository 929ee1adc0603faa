//! strata driver library.
//!
//! This library exposes the driver components for testing.

pub mod config;
pub mod driver;
