//! Inner join of the cleaned tables on `tweet_id`.

use std::collections::HashMap;

use tracing::info;

use crate::cleaner::CleanTables;
use crate::error::MergeError;
use crate::records::{ArchiveRecord, MergedRecord, TweetId};

/// Indexes `rows` by identifier, failing on the first repeated identifier.
fn index_unique<'a, T>(
    collection: &'static str,
    rows: &'a [T],
    id: impl Fn(&T) -> TweetId,
) -> Result<HashMap<TweetId, &'a T>, MergeError> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        let tweet_id = id(row);
        if index.insert(tweet_id, row).is_some() {
            return Err(MergeError::DuplicateId {
                collection,
                tweet_id,
            });
        }
    }
    Ok(index)
}

/// Joins archive with images, then the result with engagement.
///
/// Only identifiers present in all three tables survive, in archive order.
/// Repeated identifiers in any table are an error rather than a fan-out.
#[tracing::instrument(skip_all)]
pub fn merge(tables: &CleanTables) -> Result<Vec<MergedRecord>, MergeError> {
    index_unique("archive", &tables.archive, |r| r.tweet_id)?;
    let images = index_unique("image", &tables.images, |r| r.tweet_id)?;
    let engagement = index_unique("engagement", &tables.engagement, |r| r.tweet_id)?;

    let with_images: Vec<(&ArchiveRecord, _)> = tables
        .archive
        .iter()
        .filter_map(|a| images.get(&a.tweet_id).map(|i| (a, *i)))
        .collect();

    let merged: Vec<MergedRecord> = with_images
        .iter()
        .filter_map(|(a, i)| {
            engagement
                .get(&a.tweet_id)
                .map(|e| MergedRecord::new(a, i, e))
        })
        .collect();

    info!(
        archive_images = with_images.len(),
        merged = merged.len(),
        "Tables merged"
    );
    Ok(merged)
}
