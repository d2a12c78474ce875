//! Vantage Core
//!
//! This crate contains the shared foundations of the Vantage chart geometry core:
//! the `f64` vector/matrix currency, the generational arena used by the coordinate
//! system tree, logging setup and profiling shims.

pub mod alloc;
pub mod logging;
pub mod math;
pub mod profiling;
