//! Descriptive statistics over the merged table.

use std::collections::HashMap;

use serde::Serialize;

use crate::records::{DogType, MergedRecord, TweetId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

/// Rows per source label, most frequent first, ties by label.
pub fn count_by_source(rows: &[MergedRecord]) -> Vec<SourceCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.source.as_str()).or_default() += 1;
    }

    let mut counts: Vec<SourceCount> = counts
        .into_iter()
        .map(|(source, count)| SourceCount {
            source: source.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    counts
}

/// The row with the largest `key`; the earliest row wins ties.
pub fn largest_by<K: Ord>(
    rows: &[MergedRecord],
    key: impl Fn(&MergedRecord) -> K,
) -> Option<&MergedRecord> {
    rows.iter().fold(None, |best, row| match best {
        Some(b) if key(b) >= key(row) => Some(b),
        _ => Some(row),
    })
}

/// The fields worth printing for a standout row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub tweet_id: TweetId,
    pub name: Option<String>,
    pub dog_type: DogType,
    pub breed: String,
    pub rating_numerator: i64,
    pub retweets: u64,
    pub likes: u64,
}

impl From<&MergedRecord> for Highlight {
    fn from(row: &MergedRecord) -> Self {
        Highlight {
            tweet_id: row.tweet_id,
            name: row.name.clone(),
            dog_type: row.dog_type,
            breed: row.p1.clone(),
            rating_numerator: row.rating_numerator,
            retweets: row.retweets,
            likes: row.likes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram between the smallest and largest value.
///
/// Every bin is half-open except the last, which also takes the maximum.
/// A constant series is spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = ((v - lo) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}
