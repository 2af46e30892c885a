//! Concurrent aggregation across sources.
//!
//! [`Aggregator::aggregate`] is the single entry point: it validates the
//! limit, derives each source's topic form, runs both adapters at the same
//! time, keeps whatever succeeded, orders the merged list and cuts it to the
//! limit.
//!
//! # Failure isolation
//!
//! Both adapter futures are driven to completion with a settle-all join.
//! A source that fails is logged and contributes nothing; it never takes the
//! other source's results down with it. If both fail the caller gets an
//! empty list. The only error a caller can see is an invalid limit, and that
//! is reported before any request is made.
//!
//! # Ordering
//!
//! Records are merged Product Hunt first, then AppSumo, each in the order its
//! source returned them. Dated records are then rearranged among their own
//! positions so that any two of them read newest first; undated records stay
//! exactly where the merge put them.

use crate::error::{AggregateError, SourceUnavailable};
use crate::models::{NormalizedRecord, Source};
use crate::sources::SourceAdapter;
use crate::topic::TopicQuery;
use futures::future::join;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Which sources an aggregation should query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceSelection {
    #[default]
    All,
    ProductHunt,
    AppSumo,
}

impl SourceSelection {
    fn includes(self, source: Source) -> bool {
        match self {
            SourceSelection::All => true,
            SourceSelection::ProductHunt => source == Source::ProductHunt,
            SourceSelection::AppSumo => source == Source::AppSumo,
        }
    }
}

/// Orchestrates one structured and one unstructured source.
pub struct Aggregator<P, A> {
    structured: P,
    unstructured: A,
}

impl<P, A> Aggregator<P, A>
where
    P: SourceAdapter,
    A: SourceAdapter,
{
    pub fn new(structured: P, unstructured: A) -> Self {
        Self {
            structured,
            unstructured,
        }
    }

    /// Fetch up to `limit` products from both sources, optionally filtered by `topic`.
    ///
    /// Each source is asked for the full `limit`, so one failing source does
    /// not leave the result under-filled when the other has enough.
    ///
    /// # Errors
    ///
    /// [`AggregateError::InvalidArgument`] when `limit <= 0`. Source failures
    /// are absorbed and only shrink the result.
    pub async fn aggregate(
        &self,
        limit: i64,
        topic: Option<&str>,
    ) -> Result<Vec<NormalizedRecord>, AggregateError> {
        self.aggregate_from(SourceSelection::All, limit, topic).await
    }

    /// Same as [`aggregate`](Self::aggregate), restricted to `selection`.
    /// Unselected sources are not contacted.
    #[instrument(level = "info", skip(self))]
    pub async fn aggregate_from(
        &self,
        selection: SourceSelection,
        limit: i64,
        topic: Option<&str>,
    ) -> Result<Vec<NormalizedRecord>, AggregateError> {
        let limit = validate_limit(limit)?;
        let query = TopicQuery::from_topic(topic);
        let t0 = Instant::now();

        let structured = async {
            if selection.includes(Source::ProductHunt) {
                Some(self.structured.fetch(limit, query.structured.as_deref()).await)
            } else {
                None
            }
        };
        let unstructured = async {
            if selection.includes(Source::AppSumo) {
                Some(self.unstructured.fetch(limit, query.unstructured.as_deref()).await)
            } else {
                None
            }
        };
        let (structured, unstructured) = join(structured, unstructured).await;

        let from_structured = settle(Source::ProductHunt, structured);
        let from_unstructured = settle(Source::AppSumo, unstructured);
        let (n_structured, n_unstructured) = (from_structured.len(), from_unstructured.len());

        let mut merged = rank_by_launch_date(
            from_structured
                .into_iter()
                .chain(from_unstructured)
                .collect(),
        );
        merged.truncate(limit);

        info!(
            producthunt = n_structured,
            appsumo = n_unstructured,
            returned = merged.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Aggregation complete"
        );
        Ok(merged)
    }
}

fn validate_limit(limit: i64) -> Result<usize, AggregateError> {
    if limit <= 0 {
        return Err(AggregateError::InvalidArgument(format!(
            "limit must be a positive integer, got {limit}"
        )));
    }
    usize::try_from(limit).map_err(|_| {
        AggregateError::InvalidArgument(format!("limit {limit} is too large"))
    })
}

/// Reduce one adapter outcome to the records it contributes, stamped with
/// `origin`. Failures are logged and contribute nothing.
fn settle(
    origin: Source,
    outcome: Option<Result<Vec<NormalizedRecord>, SourceUnavailable>>,
) -> Vec<NormalizedRecord> {
    match outcome {
        None => Vec::new(),
        Some(Ok(records)) => records
            .into_iter()
            .map(|mut record| {
                record.source = origin;
                record
            })
            .collect(),
        Some(Err(e)) => {
            warn!(source = %origin, error = %e, "Source failed; continuing without it");
            Vec::new()
        }
    }
}

/// Order dated records newest first among the positions dated records
/// occupy, leaving undated records in place.
///
/// Equal dates keep their merge order.
pub fn rank_by_launch_date(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let slots: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.launch_date.is_some())
        .map(|(i, _)| i)
        .collect();

    let mut by_date = slots.clone();
    by_date.sort_by(|&a, &b| records[b].launch_date.cmp(&records[a].launch_date));

    let mut take_from: Vec<usize> = (0..records.len()).collect();
    for (&slot, from) in slots.iter().zip(by_date) {
        take_from[slot] = from;
    }

    let mut cells: Vec<Option<NormalizedRecord>> = records.into_iter().map(Some).collect();
    take_from
        .into_iter()
        .filter_map(|i| cells[i].take())
        .collect()
}
