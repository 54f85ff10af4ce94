//! # PCBDrill Core
//!
//! Core types and utilities for PCBDrill.
//! Provides the shared data model (layer kinds and hole records),
//! millimeter/inch conversion, and the error taxonomy used by every crate.

pub mod data;
pub mod error;
pub mod units;

pub use data::{HoleRecord, LayerKind};
pub use error::{Error, ExcellonError, Result};
pub use units::{MeasurementSystem, MM_PER_INCH};
