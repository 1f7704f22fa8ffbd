//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the CSV row timestamp (milliseconds, f64) as the only clock
//! - `window_index` orders emitted estimates, starting at 0

mod error;
mod estimate;
mod estimator_config;
mod gps;
mod sink;

pub use error::*;
pub use estimate::*;
pub use estimator_config::*;
pub use gps::*;
pub use sink::*;
