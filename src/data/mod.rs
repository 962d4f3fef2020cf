//! Remote data sources.
//!
//! - `http`: the blocking transport seam and categorized `FetchError`
//! - `sources`: built-in source descriptors (Alpha Vantage Brent, Trading Economics PPI)
//! - `fetch`: the per-source download -> CSV pipeline

pub mod fetch;
pub mod http;
pub mod sources;

pub use fetch::{FetchOutcome, FetchReport, ParsedBody, fetch_source, parse_body};
pub use http::{DEFAULT_TIMEOUT, FetchError, HttpResponse, HttpTransport, Transport};
pub use sources::{RemoteSource, ResponseFormat, SourceKind};
