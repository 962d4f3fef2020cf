//! `sa-indicators` library crate.
//!
//! The binary (`sai`) is a thin wrapper around this library so the loaders,
//! fetchers and chart renderer are testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod series;
