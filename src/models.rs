//! Data models shared by the source adapters, the aggregator and the outputs.
//!
//! - [`NormalizedRecord`]: one product listing, whatever source it came from
//! - [`Source`]: provenance tag, owned by the aggregator
//! - [`Popularity`]: the source-specific popularity signal
//! - [`CrawlReport`]: the envelope written by the outputs
//!
//! Records serialize with camelCase keys so the JSON matches what the
//! existing front ends consume (`votesOrReviews`, `launchDate`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The upstream a record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Source {
    #[serde(rename = "Product Hunt")]
    ProductHunt,
    #[serde(rename = "AppSumo")]
    AppSumo,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::ProductHunt => f.write_str("Product Hunt"),
            Source::AppSumo => f.write_str("AppSumo"),
        }
    }
}

/// Popularity signal as each source reports it.
///
/// Product Hunt gives a vote count, AppSumo a free-text review blurb such as
/// `"4.8 (213 reviews)"`. The two scales are deliberately left apart.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Popularity {
    Votes(u64),
    Reviews(String),
}

impl fmt::Display for Popularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Popularity::Votes(n) => write!(f, "{n} votes"),
            Popularity::Reviews(text) => f.write_str(text),
        }
    }
}

/// A product listing in the common shape produced by every adapter.
///
/// Adapters only ever emit records with a non-empty `name` and an absolute
/// `url`; anything else is dropped before it leaves the adapter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub name: String,
    /// Tagline or short blurb; empty when the source has none.
    #[serde(default)]
    pub summary: String,
    /// Absolute link to the product.
    pub url: String,
    /// Only AppSumo lists prices.
    pub price: Option<String>,
    pub votes_or_reviews: Option<Popularity>,
    /// Only Product Hunt reliably reports launch dates.
    pub launch_date: Option<DateTime<Utc>>,
    pub source: Source,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub makers: Vec<String>,
    /// Profile links for the makers that have a public username.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maker_profiles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u64>,
    /// The product's page on the source itself, when distinct from `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
}

impl NormalizedRecord {
    /// A record carrying only the required fields.
    pub fn new(name: impl Into<String>, url: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            url: url.into(),
            price: None,
            votes_or_reviews: None,
            launch_date: None,
            source,
            description: None,
            topics: Vec::new(),
            makers: Vec::new(),
            maker_profiles: Vec::new(),
            thumbnail: None,
            rating: None,
            reviews_count: None,
            listing_url: None,
        }
    }
}

/// The result of one aggregation run, as handed to the outputs.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub success: bool,
    pub count: usize,
    /// The topic as the caller typed it.
    pub topic: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub products: Vec<NormalizedRecord>,
}

impl CrawlReport {
    pub fn new(topic: Option<String>, products: Vec<NormalizedRecord>) -> Self {
        Self {
            success: true,
            count: products.len(),
            topic,
            generated_at: Utc::now(),
            products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_serializes_camel_case() {
        let mut record =
            NormalizedRecord::new("Raycast", "https://raycast.com", Source::ProductHunt);
        record.votes_or_reviews = Some(Popularity::Votes(812));
        record.launch_date = Some(Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Raycast");
        assert_eq!(json["votesOrReviews"], 812);
        assert_eq!(json["launchDate"], "2025-03-04T08:00:00Z");
        assert_eq!(json["source"], "Product Hunt");
        assert_eq!(json["price"], serde_json::Value::Null);
        assert!(json.get("topics").is_none());
        assert!(json.get("listingUrl").is_none());
        assert!(json.get("makerProfiles").is_none());
        assert!(json.get("reviewsCount").is_none());

        record.reviews_count = Some(7);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["reviewsCount"], 7);
    }

    #[test]
    fn test_popularity_is_heterogeneous() {
        let votes = serde_json::to_value(Popularity::Votes(3)).unwrap();
        let reviews =
            serde_json::to_value(Popularity::Reviews("4.9 (120 reviews)".into())).unwrap();
        assert!(votes.is_number());
        assert!(reviews.is_string());
    }

    #[test]
    fn test_source_display_matches_serde_name() {
        for source in [Source::ProductHunt, Source::AppSumo] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{source}\""));
        }
    }

    #[test]
    fn test_report_counts_products() {
        let products = vec![
            NormalizedRecord::new("A", "https://a.example", Source::AppSumo),
            NormalizedRecord::new("B", "https://b.example", Source::AppSumo),
        ];
        let report = CrawlReport::new(Some("ai".into()), products);
        assert!(report.success);
        assert_eq!(report.count, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("generatedAt").is_some());
        assert_eq!(json["products"].as_array().unwrap().len(), 2);
    }
}
