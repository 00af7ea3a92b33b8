use crate::records::{EngagementRecord, StatusCounts};

/// Renames the API's `id` to `tweet_id` so all three tables share one key name.
pub fn unify_engagement_ids(records: Vec<StatusCounts>) -> Vec<EngagementRecord> {
    records
        .into_iter()
        .map(|r| EngagementRecord {
            tweet_id: r.id,
            retweets: r.retweet_count,
            likes: r.favorite_count,
        })
        .collect()
}
