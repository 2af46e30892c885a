//! AppSumo listing scraper.
//!
//! AppSumo has no public API, so this adapter fetches the search page
//! (`/search/?q=<slug>`) or the browse page (`/browse/`) and walks the
//! product cards in document order.
//!
//! # Markup
//!
//! Product cards carry generated class names (`css-1o9mv8n`, `css-1cysf6l`)
//! that change whenever AppSumo redeploys. When they drift the page still
//! loads but nothing matches; that degrades to an empty list and a warning,
//! never an error, so the Product Hunt half of an aggregation survives.

use crate::config::Config;
use crate::error::{FetchError, SourceUnavailable};
use crate::models::{NormalizedRecord, Popularity, Source};
use crate::sources::SourceAdapter;
use crate::transport::{HttpRequest, Transport};
use crate::utils::clean_text;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Stored in `price` when a card shows no price.
pub const PRICE_UNAVAILABLE: &str = "Pricing unavailable";

static CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".css-1o9mv8n, .css-1cysf6l, [data-testid='product-card']")
        .expect("static selector")
});
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3, h2").expect("static selector"));
static SUMMARY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("static selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector"));
static PRICE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class*='price'], [data-testid='price']").expect("static selector")
});
static REVIEW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[class*='review']").expect("static selector"));

static NO_RESULTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(no (results|products|deals) (found|match)|0 results)\b")
        .expect("static regex")
});

/// What one page yielded, plus enough detail to tell an empty search from
/// markup drift.
#[derive(Debug, Default)]
struct Extraction {
    records: Vec<NormalizedRecord>,
    cards_seen: usize,
    skipped: usize,
    no_results_notice: bool,
}

fn first_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn first_href<'a>(card: &ElementRef<'a>) -> Option<&'a str> {
    if card.value().name() == "a" {
        if let Some(href) = card.value().attr("href") {
            return Some(href);
        }
    }
    card.select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
}

/// True when `card` sits inside another element the card selector matches.
fn nested_in_card(card: &ElementRef<'_>) -> bool {
    card.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|outer| CARD_SELECTOR.matches(&outer))
}

fn normalize_card(base: &Url, card: &ElementRef<'_>) -> Option<NormalizedRecord> {
    let name = first_text(card, &NAME_SELECTOR)?;
    let href = first_href(card)?.trim();
    let url = base
        .join(href)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))?;

    let mut record = NormalizedRecord::new(name, url.to_string(), Source::AppSumo);
    record.summary = first_text(card, &SUMMARY_SELECTOR).unwrap_or_default();
    record.price = Some(
        first_text(card, &PRICE_SELECTOR).unwrap_or_else(|| PRICE_UNAVAILABLE.to_string()),
    );
    record.votes_or_reviews = first_text(card, &REVIEW_SELECTOR).map(Popularity::Reviews);
    Some(record)
}

/// Walk product cards in document order, keeping at most `limit` usable ones.
fn extract_products(html: &str, base: &Url, limit: usize) -> Extraction {
    let document = Html::parse_document(html);
    let mut out = Extraction::default();

    for card in document
        .select(&CARD_SELECTOR)
        .filter(|card| !nested_in_card(card))
    {
        if out.records.len() >= limit {
            break;
        }
        out.cards_seen += 1;
        match normalize_card(base, &card) {
            Some(record) => out.records.push(record),
            None => out.skipped += 1,
        }
    }

    if out.cards_seen == 0 {
        let page_text = document.root_element().text().collect::<String>();
        out.no_results_notice = NO_RESULTS.is_match(&page_text);
    }
    out
}

/// Unstructured source: AppSumo search and browse pages.
pub struct AppSumoAdapter<T> {
    transport: T,
    base: Url,
}

impl<T: Transport> AppSumoAdapter<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            base: config.storefront_url.clone(),
        }
    }

    /// Search page for a hyphen-slug topic, browse page otherwise.
    fn page_url(&self, topic: Option<&str>) -> Result<Url, FetchError> {
        let relative = match topic {
            Some(slug) => format!("search/?q={}", urlencoding::encode(slug)),
            None => "browse/".to_string(),
        };
        Ok(self.base.join(&relative)?)
    }
}

fn unavailable(cause: impl Into<FetchError>) -> SourceUnavailable {
    SourceUnavailable::new(Source::AppSumo, cause)
}

impl<T: Transport> SourceAdapter for AppSumoAdapter<T> {
    #[instrument(level = "info", skip(self), fields(source = "appsumo"))]
    async fn fetch(
        &self,
        limit: usize,
        topic: Option<&str>,
    ) -> Result<Vec<NormalizedRecord>, SourceUnavailable> {
        let page_url = self.page_url(topic).map_err(unavailable)?;
        debug!(url = %page_url, "Fetching AppSumo listing");

        let response = self
            .transport
            .send(HttpRequest::get(page_url.clone()))
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let extraction = extract_products(&response.body, &self.base, limit);

        if extraction.records.is_empty() {
            if extraction.cards_seen > 0 {
                warn!(
                    cards = extraction.cards_seen,
                    "AppSumo cards matched but none had a name and link; markup may have changed"
                );
            } else if extraction.no_results_notice {
                info!(url = %page_url, "AppSumo reported no results");
            } else {
                warn!(
                    url = %page_url,
                    bytes = response.body.len(),
                    "No AppSumo product cards matched; markup may have changed"
                );
            }
        }

        info!(
            count = extraction.records.len(),
            skipped = extraction.skipped,
            source = %page_url,
            "Scraped AppSumo products"
        );
        Ok(extraction.records)
    }
}
