//! Cleaning rules for the twitter archive.
//!
//! Each rule is a standalone function; [`clean_archive`] applies them in order.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::CleanError;
use crate::records::{ArchiveRecord, DogType, RawArchiveRecord, TweetId};

/// Layout of the archive's `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S +0000";

/// Drops retweets. The retweet columns have no counterpart on [`ArchiveRecord`].
pub fn drop_retweets(records: Vec<RawArchiveRecord>) -> Vec<RawArchiveRecord> {
    records
        .into_iter()
        .filter(|r| r.retweeted_status_id.is_none())
        .collect()
}

/// Drops replies. The reply columns have no counterpart on [`ArchiveRecord`].
pub fn drop_replies(records: Vec<RawArchiveRecord>) -> Vec<RawArchiveRecord> {
    records
        .into_iter()
        .filter(|r| r.in_reply_to_status_id.is_none())
        .collect()
}

pub fn parse_timestamp(tweet_id: TweetId, value: &str) -> Result<DateTime<Utc>, CleanError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|source| CleanError::Timestamp {
            tweet_id,
            value: value.to_string(),
            source,
        })
}

/// Folds the four dog-stage columns into one value.
///
/// A column counts as set when it holds its own name (`doggo` in the
/// `doggo` column, and so on); anything else, usually `None`, is unset.
pub fn collapse_dog_type(doggo: &str, floofer: &str, pupper: &str, puppo: &str) -> DogType {
    let set: Vec<DogType> = [
        (doggo, "doggo", DogType::Doggo),
        (floofer, "floofer", DogType::Floofer),
        (pupper, "pupper", DogType::Pupper),
        (puppo, "puppo", DogType::Puppo),
    ]
    .into_iter()
    .filter(|(value, name, _)| value == name)
    .map(|(_, _, dog_type)| dog_type)
    .collect();

    match set.as_slice() {
        [] => DogType::NotSpecified,
        [one] => *one,
        _ => DogType::Multiple,
    }
}

/// Parses timestamps and collapses dog stages, dropping the columns they replace.
///
/// The first timestamp that fails to parse aborts the whole table.
pub fn tidy_records(records: Vec<RawArchiveRecord>) -> Result<Vec<ArchiveRecord>, CleanError> {
    records
        .into_iter()
        .map(|r| {
            Ok(ArchiveRecord {
                tweet_id: r.tweet_id,
                timestamp: parse_timestamp(r.tweet_id, &r.timestamp)?,
                dog_type: collapse_dog_type(&r.doggo, &r.floofer, &r.pupper, &r.puppo),
                source: r.source,
                text: r.text,
                expanded_urls: r.expanded_urls,
                rating_numerator: r.rating_numerator,
                rating_denominator: r.rating_denominator,
                name: r.name,
            })
        })
        .collect()
}

/// Keeps only ratings out of 10.
///
/// Lossy: ratings over other denominators (group photos rated 50/50, typos)
/// are discarded instead of normalized.
pub fn keep_denominator_ten(records: Vec<ArchiveRecord>) -> Vec<ArchiveRecord> {
    records
        .into_iter()
        .filter(|r| r.rating_denominator == 10)
        .collect()
}

/// Keeps rows whose name, when present, starts with an uppercase letter.
///
/// Heuristic: the extractor picked up words like "a" or "his" as names, and
/// those are lowercase. Real lowercase names are lost, capitalized non-names
/// survive.
pub fn keep_proper_names(records: Vec<ArchiveRecord>) -> Vec<ArchiveRecord> {
    records
        .into_iter()
        .filter(|r| match &r.name {
            None => true,
            Some(name) => name.chars().next().is_some_and(char::is_uppercase),
        })
        .collect()
}

/// Returns the anchor text of an HTML link: whatever sits between the first
/// `>` and the next `<`.
pub fn extract_source_label(tweet_id: TweetId, markup: &str) -> Result<String, CleanError> {
    markup
        .split_once('>')
        .and_then(|(_, rest)| rest.split_once('<'))
        .map(|(label, _)| label.to_string())
        .ok_or_else(|| CleanError::SourceMarkup {
            tweet_id,
            value: markup.to_string(),
        })
}

pub fn rewrite_sources(records: Vec<ArchiveRecord>) -> Result<Vec<ArchiveRecord>, CleanError> {
    records
        .into_iter()
        .map(|mut r| {
            r.source = extract_source_label(r.tweet_id, &r.source)?;
            Ok(r)
        })
        .collect()
}

/// Applies every archive rule in order.
#[tracing::instrument(skip_all, fields(rows = raw.len()))]
pub fn clean_archive(raw: Vec<RawArchiveRecord>) -> Result<Vec<ArchiveRecord>, CleanError> {
    let rows = drop_retweets(raw);
    debug!(rows = rows.len(), "Retweets dropped");

    let rows = drop_replies(rows);
    debug!(rows = rows.len(), "Replies dropped");

    let rows = tidy_records(rows)?;
    debug!(rows = rows.len(), "Timestamps parsed and dog stages collapsed");

    let rows = keep_denominator_ten(rows);
    debug!(rows = rows.len(), "Non-10 denominators dropped");

    let rows = keep_proper_names(rows);
    debug!(rows = rows.len(), "Lowercase names dropped");

    let rows = rewrite_sources(rows)?;
    debug!(rows = rows.len(), "Sources rewritten");

    Ok(rows)
}
