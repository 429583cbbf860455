//! fuzzstat - Statistical comparison of repeated coverage-over-time runs
//!
//! This library aligns per-run event logs onto a shared one-second clock,
//! aggregates each group's runs into a mean with Student-t confidence bounds,
//! and tests every pair of groups for significant differences in their end
//! state (Student's t and Mann-Whitney U).

pub mod aggregate;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod plot_data;
pub mod series;
pub mod significance;

pub use error::{Result, StatError};
