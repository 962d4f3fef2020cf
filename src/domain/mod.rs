//! Domain types shared by both pipelines.
//!
//! This module defines:
//!
//! - date-indexed series (`Observation`, `Series`) and the inclusive `DateWindow`
//! - the per-file column selection descriptor (`SeriesSpec`)
//! - chart configuration (`ChartSpec`, `TraceSpec`, `AxisSlot`, ...)

pub mod chart;
pub mod types;

pub use chart::*;
pub use types::*;
