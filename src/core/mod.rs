//! Core data types for race results.
//!
//! - [`types`]: bib numbers, genders and performance measures
//! - [`entry`]: registered runners and relay teams
//! - [`category`]: entry categories and prize categories
//! - [`raw`]: finish records as written down at the finish line
//! - [`result`]: per-entrant and per-leg resolved results
//!
//! ## Times
//!
//! All times are elapsed durations since the race (or first leg) started and are
//! held as [`std::time::Duration`]. A missing value is `None`, never a sentinel.

pub mod category;
pub mod entry;
pub mod raw;
pub mod result;
pub mod types;
