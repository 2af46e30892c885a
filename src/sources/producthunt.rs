//! Product Hunt GraphQL adapter.
//!
//! Queries the [Product Hunt API v2](https://api.producthunt.com/v2/docs)
//! with a single `posts` query and maps each post node to a
//! [`NormalizedRecord`].
//!
//! # Filtering
//!
//! The filter strategy is picked once per call:
//!
//! | Topic | Strategy | Query arguments |
//! |-------|----------|-----------------|
//! | none | trending feed | `order: RANKING` |
//! | a known category (`"developer tools"`) | category | `topic: "developer-tools"` |
//! | anything else | keyword | `order: NEWEST`, then a local match |
//!
//! `posts` takes no free-text argument, so the keyword strategy pulls a page
//! of the newest posts and keeps only those whose name, tagline, description
//! or topic names contain every keyword.

use crate::config::{ApiToken, Config};
use crate::error::{FetchError, SourceUnavailable};
use crate::models::{NormalizedRecord, Popularity, Source};
use crate::sources::SourceAdapter;
use crate::transport::{HttpRequest, Transport};
use crate::utils::{clean_text, truncate_for_log};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Product Hunt topic slugs answered by category lookup instead of keyword search.
const KNOWN_CATEGORIES: &[&str] = &[
    "analytics",
    "artificial-intelligence",
    "design-tools",
    "developer-tools",
    "education",
    "fintech",
    "health-and-fitness",
    "marketing",
    "no-code",
    "open-source",
    "productivity",
    "saas",
    "sales",
    "social-media",
    "writing",
];

const POST_FIELDS: &str = "\
name tagline description votesCount website url createdAt reviewsRating reviewsCount \
makers { name username } thumbnail { url } topics { edges { node { name } } }";

/// Posts requested per keyword query. `posts` has no full-text argument, so
/// keyword matching happens on a page of the newest posts.
const KEYWORD_SCAN_WINDOW: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryStrategy<'a> {
    Trending,
    Category(String),
    Keyword(&'a str),
}

impl<'a> QueryStrategy<'a> {
    /// `topic` is the space-joined structured form.
    fn choose(topic: Option<&'a str>) -> Self {
        match topic {
            None => QueryStrategy::Trending,
            Some(keywords) => {
                let slug = keywords.split(' ').collect::<Vec<_>>().join("-");
                if KNOWN_CATEGORIES.contains(&slug.as_str()) {
                    QueryStrategy::Category(slug)
                } else {
                    QueryStrategy::Keyword(keywords)
                }
            }
        }
    }

    fn request_body(&self, limit: usize) -> serde_json::Value {
        let (params, args, mut variables) = match self {
            QueryStrategy::Trending => ("$first: Int!", "first: $first, order: RANKING", json!({})),
            QueryStrategy::Category(slug) => (
                "$first: Int!, $topic: String!",
                "first: $first, order: NEWEST, topic: $topic",
                json!({ "topic": slug }),
            ),
            QueryStrategy::Keyword(_) => {
                ("$first: Int!", "first: $first, order: NEWEST", json!({}))
            }
        };
        variables["first"] = json!(self.page_size(limit));
        let query = format!(
            "query Posts({params}) {{ posts({args}) {{ edges {{ node {{ {POST_FIELDS} }} }} }} }}"
        );
        json!({ "query": query, "variables": variables })
    }

    fn page_size(&self, limit: usize) -> usize {
        match self {
            QueryStrategy::Keyword(_) => limit.max(KEYWORD_SCAN_WINDOW),
            _ => limit,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            QueryStrategy::Trending => "trending",
            QueryStrategy::Category(_) => "category",
            QueryStrategy::Keyword(_) => "keyword",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: Connection<PostNode>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Connection<T> {
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostNode {
    name: Option<String>,
    tagline: Option<String>,
    description: Option<String>,
    votes_count: Option<u64>,
    website: Option<String>,
    url: Option<String>,
    created_at: Option<String>,
    reviews_rating: Option<f64>,
    reviews_count: Option<u64>,
    #[serde(default)]
    makers: Vec<Maker>,
    thumbnail: Option<Thumbnail>,
    topics: Option<Connection<TopicNode>>,
}

#[derive(Debug, Deserialize)]
struct Maker {
    name: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopicNode {
    name: String,
}

impl PostNode {
    fn topic_names(&self) -> Vec<String> {
        self.topics
            .as_ref()
            .map(|c| c.edges.iter().map(|e| clean_text(&e.node.name)).collect())
            .unwrap_or_default()
    }

    fn matches_keywords(&self, keywords: &str) -> bool {
        let haystack = [
            self.name.as_deref().unwrap_or_default(),
            self.tagline.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
            self.topic_names().join(" ").as_str(),
        ]
        .join(" ")
        .to_lowercase();
        keywords.split_whitespace().all(|k| haystack.contains(k))
    }
}

/// Resolve `href` against `base`, keeping only http(s) results.
fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn parse_launch_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(d) => Some(d.with_timezone(&Utc)),
        Err(e) => {
            debug!(%raw, error = %e, "Unparseable Product Hunt createdAt");
            None
        }
    }
}

/// Map one post to a record, or `None` when it lacks a name or any usable link.
fn normalize_post(site: &Url, node: PostNode) -> Option<NormalizedRecord> {
    let name = clean_text(node.name.as_deref().unwrap_or_default());
    if name.is_empty() {
        debug!("Skipping Product Hunt post without a name");
        return None;
    }

    let listing_url = node.url.as_deref().and_then(|u| absolute_url(site, u));
    let derived = format!(
        "/posts/{}",
        name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
    );
    let url = node
        .website
        .as_deref()
        .and_then(|u| absolute_url(site, u))
        .or_else(|| listing_url.clone())
        .or_else(|| absolute_url(site, &derived))?;

    let topics = node.topic_names();
    let mut record = NormalizedRecord::new(name, url, Source::ProductHunt);
    record.summary = clean_text(node.tagline.as_deref().unwrap_or_default());
    record.votes_or_reviews = node.votes_count.map(Popularity::Votes);
    record.launch_date = parse_launch_date(node.created_at.as_deref());
    record.description = node
        .description
        .as_deref()
        .map(clean_text)
        .filter(|d| !d.is_empty());
    record.topics = topics;
    record.makers = node
        .makers
        .iter()
        .filter_map(|m| m.name.as_deref().map(clean_text))
        .filter(|n| !n.is_empty())
        .collect();
    record.maker_profiles = node
        .makers
        .iter()
        .filter_map(|m| m.username.as_deref().map(str::trim))
        .filter(|u| !u.is_empty())
        .filter_map(|u| absolute_url(site, &format!("/@{}", urlencoding::encode(u))))
        .collect();
    record.thumbnail = node.thumbnail.and_then(|t| t.url);
    record.rating = node.reviews_rating.filter(|r| *r > 0.0);
    record.reviews_count = node.reviews_count.filter(|n| *n > 0);
    record.listing_url = listing_url.filter(|l| *l != record.url);
    Some(record)
}

/// Structured source: the Product Hunt GraphQL API.
pub struct ProductHuntAdapter<T> {
    transport: T,
    endpoint: Url,
    site: Url,
    token: Option<ApiToken>,
}

impl<T: Transport> ProductHuntAdapter<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            endpoint: config.graphql_endpoint.clone(),
            site: config.producthunt_site.clone(),
            token: config.api_token.clone(),
        }
    }
}

fn unavailable(cause: impl Into<FetchError>) -> SourceUnavailable {
    SourceUnavailable::new(Source::ProductHunt, cause)
}

impl<T: Transport> SourceAdapter for ProductHuntAdapter<T> {
    #[instrument(level = "info", skip(self), fields(source = "producthunt"))]
    async fn fetch(
        &self,
        limit: usize,
        topic: Option<&str>,
    ) -> Result<Vec<NormalizedRecord>, SourceUnavailable> {
        let Some(token) = &self.token else {
            warn!("PRODUCTHUNT_API_KEY not configured; skipping Product Hunt");
            return Err(unavailable(FetchError::MissingCredential));
        };

        let strategy = QueryStrategy::choose(topic);
        let request = HttpRequest::post_json(self.endpoint.clone(), strategy.request_body(limit))
            .with_bearer(token.clone());
        debug!(strategy = strategy.label(), "Querying Product Hunt");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let payload: GraphQlResponse<PostsData> = response.json().map_err(|e| {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(&response.body, 300),
                "Product Hunt returned non-conforming JSON"
            );
            unavailable(e)
        })?;

        if !payload.errors.is_empty() {
            let messages = payload
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(unavailable(FetchError::GraphQl(messages)));
        }
        let Some(data) = payload.data else {
            return Err(unavailable(FetchError::GraphQl("response carried no data".into())));
        };

        let fetched = data.posts.edges.len();
        let records: Vec<NormalizedRecord> = data
            .posts
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .filter(|node| match &strategy {
                QueryStrategy::Keyword(keywords) => node.matches_keywords(keywords),
                _ => true,
            })
            .filter_map(|node| normalize_post(&self.site, node))
            .take(limit)
            .collect();

        info!(
            fetched,
            kept = records.len(),
            strategy = strategy.label(),
            topic = topic.unwrap_or("trending"),
            "Fetched Product Hunt posts"
        );
        Ok(records)
    }
}
