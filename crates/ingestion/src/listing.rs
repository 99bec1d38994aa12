//! Listing normalization.
//!
//! Turns raw search results into validated transactions. Listings missing a
//! price, living area, sale date or address, or carrying non-positive values,
//! are skipped and counted by reason.

use pricefeed_core::{ms_to_datetime, Error, Result, Transaction};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    cat1: Category,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Category {
    search_results: SearchResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    #[serde(default)]
    list_results: Vec<Value>,
}

/// One entry of `listResults`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub unformatted_price: Option<f64>,
    pub address: Option<String>,
    pub hdp_data: Option<HdpData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdpData {
    pub home_info: Option<HomeInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeInfo {
    pub living_area: Option<f64>,
    /// Epoch milliseconds.
    pub date_sold: Option<i64>,
}

/// Why a listing was not turned into a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The listing did not match the expected shape.
    Malformed,
    /// No living area, or a zero living area.
    MissingArea,
    /// Negative or non-finite living area.
    InvalidArea,
    MissingPrice,
    /// Zero, negative or non-finite price.
    InvalidPrice,
    MissingDate,
    MissingAddress,
}

impl ListResult {
    /// Convert to a transaction, or report why it cannot be.
    pub fn to_transaction(&self) -> std::result::Result<Transaction, SkipReason> {
        let home_info = self
            .hdp_data
            .as_ref()
            .and_then(|h| h.home_info.as_ref())
            .ok_or(SkipReason::Malformed)?;

        let sqft = match home_info.living_area {
            None => return Err(SkipReason::MissingArea),
            Some(a) if a == 0.0 => return Err(SkipReason::MissingArea),
            Some(a) if !a.is_finite() || a < 0.0 => return Err(SkipReason::InvalidArea),
            Some(a) => a,
        };

        let sold_at = home_info
            .date_sold
            .and_then(ms_to_datetime)
            .ok_or(SkipReason::MissingDate)?;

        let price = self.unformatted_price.ok_or(SkipReason::MissingPrice)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(SkipReason::InvalidPrice);
        }

        let address = self.address.clone().ok_or(SkipReason::MissingAddress)?;

        Ok(Transaction::new(sold_at, price, sqft, address))
    }
}

/// Counts of accepted and skipped listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Listings seen.
    pub total_listings: u64,
    /// Listings turned into transactions.
    pub accepted: u64,
    pub malformed: u64,
    pub missing_area: u64,
    pub invalid_area: u64,
    pub missing_price: u64,
    pub invalid_price: u64,
    pub missing_date: u64,
    pub missing_address: u64,
}

impl NormalizationStats {
    /// Total skipped listings.
    pub fn skipped(&self) -> u64 {
        self.total_listings - self.accepted
    }

    /// Fraction of listings accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.total_listings > 0 {
            self.accepted as f64 / self.total_listings as f64
        } else {
            0.0
        }
    }

    fn record_skip(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::Malformed => &mut self.malformed,
            SkipReason::MissingArea => &mut self.missing_area,
            SkipReason::InvalidArea => &mut self.invalid_area,
            SkipReason::MissingPrice => &mut self.missing_price,
            SkipReason::InvalidPrice => &mut self.invalid_price,
            SkipReason::MissingDate => &mut self.missing_date,
            SkipReason::MissingAddress => &mut self.missing_address,
        };
        *counter += 1;
    }
}

/// Normalizer that parses result pages and tracks skip statistics.
#[derive(Debug, Default)]
pub struct ListingNormalizer {
    stats: NormalizationStats,
}

impl ListingNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one raw listing.
    pub fn normalize(&mut self, listing: &Value) -> Option<Transaction> {
        self.stats.total_listings += 1;

        let result = ListResult::deserialize(listing)
            .map_err(|_| SkipReason::Malformed)
            .and_then(|l| l.to_transaction());

        match result {
            Ok(tx) => {
                self.stats.accepted += 1;
                Some(tx)
            }
            Err(reason) => {
                self.stats.record_skip(reason);
                None
            }
        }
    }

    /// Parse a response body and normalize all its listings.
    ///
    /// Fails only when the body is not a search response at all; bad
    /// individual listings are skipped.
    pub fn normalize_page(&mut self, body: &str) -> Result<Vec<Transaction>> {
        let response: SearchResponse = serde_json::from_str(body)
            .map_err(|e| Error::data(format!("unexpected search response: {e}")))?;

        Ok(response
            .cat1
            .search_results
            .list_results
            .iter()
            .filter_map(|listing| self.normalize(listing))
            .collect())
    }

    /// Get current statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn make_listing(price: Value, area: Value, date_sold: Value) -> Value {
        json!({
            "unformattedPrice": price,
            "address": "123 Sunset Blvd, Los Angeles, CA",
            "hdpData": { "homeInfo": { "livingArea": area, "dateSold": date_sold } }
        })
    }

    fn make_page(listings: Vec<Value>) -> String {
        json!({ "cat1": { "searchResults": { "listResults": listings } } }).to_string()
    }

    #[test]
    fn test_valid_listing() {
        let mut normalizer = ListingNormalizer::new();
        let tx = normalizer
            .normalize(&make_listing(json!(1_200_000), json!(1500), json!(1704067200000i64)))
            .unwrap();

        assert_relative_eq!(tx.price_per_sqft(), 800.0);
        assert_eq!(tx.date().to_string(), "2024-01-01");
        assert_eq!(tx.address, "123 Sunset Blvd, Los Angeles, CA");
        assert_eq!(normalizer.stats().accepted, 1);
    }

    #[test]
    fn test_skip_reasons() {
        let mut normalizer = ListingNormalizer::new();
        let ts = json!(1704067200000i64);

        assert!(normalizer.normalize(&make_listing(json!(900_000), json!(0), ts.clone())).is_none());
        assert!(normalizer.normalize(&make_listing(json!(900_000), Value::Null, ts.clone())).is_none());
        assert!(normalizer.normalize(&make_listing(json!(900_000), json!(-20), ts.clone())).is_none());
        assert!(normalizer.normalize(&make_listing(Value::Null, json!(1000), ts.clone())).is_none());
        assert!(normalizer.normalize(&make_listing(json!(0), json!(1000), ts.clone())).is_none());
        assert!(normalizer.normalize(&make_listing(json!(900_000), json!(1000), Value::Null)).is_none());
        assert!(normalizer.normalize(&json!({"unformattedPrice": 1})).is_none());
        assert!(normalizer.normalize(&make_listing(json!("n/a"), json!(1000), ts)).is_none());

        let stats = normalizer.stats();
        assert_eq!(stats.total_listings, 8);
        assert_eq!(stats.accepted, 0);
        assert_eq!(stats.missing_area, 2);
        assert_eq!(stats.invalid_area, 1);
        assert_eq!(stats.missing_price, 1);
        assert_eq!(stats.invalid_price, 1);
        assert_eq!(stats.missing_date, 1);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.skipped(), 8);
    }

    #[test]
    fn test_missing_address() {
        let mut normalizer = ListingNormalizer::new();
        let listing = json!({
            "unformattedPrice": 500_000,
            "hdpData": { "homeInfo": { "livingArea": 1000, "dateSold": 1704067200000i64 } }
        });
        assert!(normalizer.normalize(&listing).is_none());
        assert_eq!(normalizer.stats().missing_address, 1);
    }

    #[test]
    fn test_normalize_page() {
        let mut normalizer = ListingNormalizer::new();
        let body = make_page(vec![
            make_listing(json!(1_000_000), json!(2000), json!(1704067200000i64)),
            make_listing(json!(1_000_000), json!(0), json!(1704067200000i64)),
            make_listing(json!(750_000), json!(1000), json!(1704153600000i64)),
        ]);

        let transactions = normalizer.normalize_page(&body).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_relative_eq!(normalizer.stats().acceptance_rate(), 2.0 / 3.0);
    }

    #[test]
    fn test_empty_page() {
        let mut normalizer = ListingNormalizer::new();
        let body = json!({ "cat1": { "searchResults": {} } }).to_string();
        assert!(normalizer.normalize_page(&body).unwrap().is_empty());
        assert_eq!(normalizer.stats().acceptance_rate(), 0.0);
    }

    #[test]
    fn test_bad_page_is_error() {
        let mut normalizer = ListingNormalizer::new();
        assert!(matches!(normalizer.normalize_page("{\"error\": true}"), Err(Error::Data(_))));
        assert!(normalizer.normalize_page("<html>captcha</html>").is_err());
    }
}
