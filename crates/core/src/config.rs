//! Configuration structures for the price feed system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the price feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outlier filtering and smoothing parameters.
    pub feed: FeedConfig,
    /// Listing search endpoint configuration.
    pub source: SourceConfig,
    /// Snapshot store configuration.
    pub store: StoreConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections and fields
    /// fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.feed.validate()?;
        Ok(config)
    }
}

/// Feed computation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Rolling window size in daily rows.
    pub window: usize,
    /// IQR multiplier for outlier bounds.
    pub iqr_multiplier: f64,
}

impl FeedConfig {
    /// Recommended window range (inclusive).
    pub const RECOMMENDED_WINDOW: (usize, usize) = (1, 7);
    /// Recommended multiplier range (inclusive).
    pub const RECOMMENDED_MULTIPLIER: (f64, f64) = (0.5, 3.0);

    /// Check hard limits: window >= 1, multiplier finite and >= 0.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::config("window must be at least 1"));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(Error::config(format!(
                "iqr_multiplier must be a non-negative number, got {}",
                self.iqr_multiplier
            )));
        }
        Ok(())
    }

    /// Whether both parameters sit inside the recommended operator ranges.
    pub fn is_within_recommended(&self) -> bool {
        let (wmin, wmax) = Self::RECOMMENDED_WINDOW;
        let (mmin, mmax) = Self::RECOMMENDED_MULTIPLIER;
        (wmin..=wmax).contains(&self.window) && (mmin..=mmax).contains(&self.iqr_multiplier)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            window: 3,
            iqr_multiplier: 1.5,
        }
    }
}

/// Geographic bounding box of the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            west: -118.88551790039062,
            east: -117.93794709960937,
            south: 33.63490745983598,
            north: 34.405484226648646,
        }
    }
}

/// Listing search endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Search endpoint URL.
    pub endpoint: String,
    /// Number of result pages to request.
    pub max_pages: u32,
    /// Region identifier.
    pub region_id: u32,
    /// Region type code.
    pub region_type: u32,
    /// Map bounds sent with each query.
    pub map_bounds: MapBounds,
    /// Days-on-site filter (e.g. "7" for sales in the last week).
    pub days_on_site: String,
    /// Origin header.
    pub origin: String,
    /// Referer header.
    pub referer: String,
    /// User-Agent header.
    pub user_agent: String,
    /// Accept-Language header.
    pub accept_language: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.zillow.com/async-create-search-page-state".to_string(),
            max_pages: 8,
            region_id: 12447,
            region_type: 6,
            map_bounds: MapBounds::default(),
            days_on_site: "7".to_string(),
            origin: "https://www.zillow.com".to_string(),
            referer: "https://www.zillow.com/los-angeles-ca/sold/".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-GB,en;q=0.9".to_string(),
        }
    }
}

/// Snapshot store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the SQLite database file.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "pricefeed.db".to_string(),
        }
    }
}
