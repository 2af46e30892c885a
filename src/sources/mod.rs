//! Source adapters for fetching product listings from upstream sites.
//!
//! Each adapter turns one upstream's native response into
//! [`NormalizedRecord`]s and reports failure as [`SourceUnavailable`].
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Product Hunt | [`producthunt`] | GraphQL API | Requires a developer token |
//! | AppSumo | [`appsumo`] | HTML scraping | Markup is site-owned and brittle |
//!
//! # Contract
//!
//! - At most `limit` records, in the upstream's own order
//! - Every record has a non-empty name and an absolute url
//! - A valid response with nothing in it is `Ok(vec![])`, not an error
//! - No partial or fabricated list on failure

pub mod appsumo;
pub mod producthunt;

use crate::error::SourceUnavailable;
use crate::models::NormalizedRecord;

/// One upstream product listing provider.
#[allow(async_fn_in_trait)]
pub trait SourceAdapter {
    /// Fetch up to `limit` records, filtered by `topic` when given.
    ///
    /// `topic` is already normalized into the syntax this source expects.
    async fn fetch(
        &self,
        limit: usize,
        topic: Option<&str>,
    ) -> Result<Vec<NormalizedRecord>, SourceUnavailable>;
}
