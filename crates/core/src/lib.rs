#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and logic for the stock watcher: snapshots, weather
//! normalization, change detection, cadence arithmetic and presentation.

pub mod change;
pub mod format;
pub mod model;
pub mod schedule;
pub mod store;
pub mod weather;

mod util;

pub use util::{now_ms, utc_from_ms};
