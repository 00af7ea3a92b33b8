//! Trait for looking up single statuses, and the sequential batch fetch built on it.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::records::TweetId;

/// Abstraction over a provider of raw status objects (e.g., the Twitter API).
#[async_trait]
pub trait StatusApi {
    /// Returns the raw JSON status object for `tweet_id`.
    async fn get_status(&self, tweet_id: TweetId) -> Result<Value, FetchError>;
}

/// Result of a batch lookup, successes and failures kept apart.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub statuses: Vec<Value>,
    pub failures: Vec<FetchError>,
}

impl FetchOutcome {
    pub fn failed_ids(&self) -> Vec<TweetId> {
        self.failures.iter().map(FetchError::tweet_id).collect()
    }
}

/// Looks up every identifier in order, one request at a time.
///
/// A failed lookup is logged and recorded, never fatal for the batch.
#[tracing::instrument(skip_all, fields(requested = ids.len()))]
pub async fn fetch_statuses<A>(api: &A, ids: &[TweetId]) -> FetchOutcome
where
    A: StatusApi + ?Sized + Sync,
{
    let mut outcome = FetchOutcome::default();
    for &tweet_id in ids {
        match api.get_status(tweet_id).await {
            Ok(status) => {
                debug!(tweet_id, "Status lookup succeeded");
                outcome.statuses.push(status);
            }
            Err(e) => {
                warn!(tweet_id, error = %e, "Status lookup failed, skipping");
                outcome.failures.push(e);
            }
        }
    }

    info!(
        fetched = outcome.statuses.len(),
        failed = outcome.failures.len(),
        "Status lookups finished"
    );
    outcome
}
