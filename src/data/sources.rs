//! Remote source descriptors.
//!
//! Each built-in source differs only in endpoint, response format and field
//! names; everything else goes through the same fetch pipeline.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use reqwest::Url;

use crate::data::http::FetchError;

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
const TRADING_ECONOMICS_PPI_URL: &str =
    "https://api.tradingeconomics.com/historical/country/south%20africa/indicator/producer%20prices%20change";

pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";
pub const TRADING_ECONOMICS_KEY_VAR: &str = "TRADING_ECONOMICS_API_KEY";

pub const BRENT_OUTPUT_FILE: &str = "brent_crude_oil_prices.csv";
pub const PPI_OUTPUT_FILE: &str = "sa_ppi_data.csv";

/// Built-in sources selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Daily Brent crude prices (Alpha Vantage, CSV).
    Brent,
    /// South African producer price change (Trading Economics, JSON).
    Ppi,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Brent, SourceKind::Ppi];

    /// Display name used in logs and summaries.
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Brent => "Brent crude oil",
            SourceKind::Ppi => "South Africa PPI",
        }
    }

    pub fn key_var(self) -> &'static str {
        match self {
            SourceKind::Brent => ALPHA_VANTAGE_KEY_VAR,
            SourceKind::Ppi => TRADING_ECONOMICS_KEY_VAR,
        }
    }

    /// Full descriptor for this source, writing into `out_dir`.
    pub fn descriptor(self, api_key: impl Into<String>, out_dir: &Path) -> RemoteSource {
        match self {
            SourceKind::Brent => RemoteSource {
                name: self.name().to_string(),
                endpoint: ALPHA_VANTAGE_URL.to_string(),
                query: vec![
                    ("function".to_string(), "BRENT".to_string()),
                    ("interval".to_string(), "daily".to_string()),
                    ("datatype".to_string(), "csv".to_string()),
                ],
                key_param: "apikey".to_string(),
                api_key: api_key.into(),
                format: ResponseFormat::Csv,
                date_field: "timestamp".to_string(),
                value_field: "value".to_string(),
                output_date_column: "Date".to_string(),
                output_value_column: "Price_USD_per_Barrel".to_string(),
                output_path: out_dir.join(BRENT_OUTPUT_FILE),
            },
            SourceKind::Ppi => RemoteSource {
                name: self.name().to_string(),
                endpoint: TRADING_ECONOMICS_PPI_URL.to_string(),
                query: vec![("f".to_string(), "json".to_string())],
                key_param: "c".to_string(),
                api_key: api_key.into(),
                format: ResponseFormat::JsonRecords,
                date_field: "DateTime".to_string(),
                value_field: "Value".to_string(),
                output_date_column: "Data_Date".to_string(),
                output_value_column: "Actual_Percent".to_string(),
                output_path: out_dir.join(PPI_OUTPUT_FILE),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// CSV body with a header row.
    Csv,
    /// JSON array of flat objects.
    JsonRecords,
}

/// Everything needed to fetch one source and persist it.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    pub name: String,
    pub endpoint: String,
    /// Fixed query parameters, sent in order before the API key.
    pub query: Vec<(String, String)>,
    pub key_param: String,
    pub api_key: String,
    pub format: ResponseFormat,
    /// Field names as the API reports them.
    pub date_field: String,
    pub value_field: String,
    /// Canonical column names written to the output CSV.
    pub output_date_column: String,
    pub output_value_column: String,
    pub output_path: PathBuf,
}

impl RemoteSource {
    pub fn url(&self) -> Result<Url, FetchError> {
        let params = self
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once((self.key_param.as_str(), self.api_key.as_str())));
        Url::parse_with_params(&self.endpoint, params)
            .map_err(|e| FetchError::Other(format!("invalid endpoint '{}': {e}", self.endpoint)))
    }

    /// The request URL with the API key masked, for logs and error messages.
    pub fn redacted_url(&self) -> String {
        let mut redacted = self.clone();
        redacted.api_key = "***".to_string();
        redacted
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.endpoint.clone())
    }
}
