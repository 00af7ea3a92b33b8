use std::collections::{BTreeSet, HashSet};
use std::fs;

use async_trait::async_trait;
use serde_json::{Value, json};
use weratedogs_wrangle::cleaner::{RawTables, clean};
use weratedogs_wrangle::error::FetchError;
use weratedogs_wrangle::loader::{
    parse_image_predictions, parse_status_lines, read_archive, tweet_ids_to_query,
    write_status_lines,
};
use weratedogs_wrangle::merger::merge;
use weratedogs_wrangle::output::{read_master_csv, write_master_csv};
use weratedogs_wrangle::records::{DogType, TweetId};
use weratedogs_wrangle::report::build_report;
use weratedogs_wrangle::services::status_api::{StatusApi, fetch_statuses};

const ARCHIVE: &str = include_str!("fixtures/twitter-archive-enhanced.csv");
const IMAGES: &[u8] = include_bytes!("fixtures/image-predictions.tsv");
const STATUSES: &str = include_str!("fixtures/tweet_json.txt");

fn raw_tables() -> RawTables {
    RawTables {
        archive: read_archive(ARCHIVE.as_bytes()).expect("Failed to read archive"),
        images: parse_image_predictions(IMAGES).expect("Failed to parse images"),
        engagement: parse_status_lines(STATUSES.as_bytes()).expect("Failed to parse statuses"),
    }
}

#[test]
fn test_cleaned_archive_invariants() {
    let raw = raw_tables();
    assert_eq!(raw.archive.len(), 10);

    let cleaned = clean(&raw).unwrap();
    let ids: Vec<TweetId> = cleaned.archive.iter().map(|r| r.tweet_id).collect();

    // reply, retweet, 24/7 rating and the lowercase "such" are gone
    assert_eq!(
        ids,
        vec![
            892420643555336193,
            892177421306343426,
            891815181378084864,
            890240255349198849,
            891327558926688256,
            891689557279858688,
        ]
    );

    let raw_by_id: std::collections::HashMap<_, _> =
        raw.archive.iter().map(|r| (r.tweet_id, r)).collect();
    for row in &cleaned.archive {
        let original = raw_by_id[&row.tweet_id];
        assert!(original.retweeted_status_id.is_none());
        assert!(original.in_reply_to_status_id.is_none());
        assert_eq!(row.rating_denominator, 10);
        if let Some(name) = &row.name {
            assert!(name.chars().next().unwrap().is_uppercase());
        }
        assert!(!row.source.contains('<'));

        let flags = [
            &original.doggo,
            &original.floofer,
            &original.pupper,
            &original.puppo,
        ]
        .iter()
        .filter(|v| v.as_str() != "None")
        .count();
        assert_eq!(row.dog_type == DogType::Multiple, flags >= 2);
    }

    let cassie = &cleaned.archive[3];
    assert_eq!(cassie.name, None);
    assert_eq!(cassie.dog_type, DogType::Pupper);
    assert_eq!(cassie.source, "Vine - Make a Scene");
    assert_eq!(cleaned.archive[2].dog_type, DogType::Multiple);
    assert_eq!(cleaned.archive[0].dog_type, DogType::NotSpecified);

    assert!(cleaned.images.iter().all(|i| i.has_dog_prediction()));
    assert_eq!(cleaned.images.len(), raw.images.len() - 1);
}

#[test]
fn test_merge_keeps_ids_present_everywhere() {
    let cleaned = clean(&raw_tables()).unwrap();
    let merged = merge(&cleaned).unwrap();

    let ids: Vec<TweetId> = merged.iter().map(|r| r.tweet_id).collect();
    assert_eq!(
        ids,
        vec![
            892177421306343426,
            891815181378084864,
            890240255349198849,
            891327558926688256,
        ]
    );

    let archive: HashSet<_> = cleaned.archive.iter().map(|r| r.tweet_id).collect();
    let images: HashSet<_> = cleaned.images.iter().map(|r| r.tweet_id).collect();
    let engagement: HashSet<_> = cleaned.engagement.iter().map(|r| r.tweet_id).collect();
    let everywhere: HashSet<_> = archive
        .iter()
        .filter(|id| images.contains(id) && engagement.contains(id))
        .copied()
        .collect();
    assert_eq!(ids.iter().copied().collect::<HashSet<_>>(), everywhere);
}

#[test]
fn test_master_csv_round_trip_and_report() {
    let merged = merge(&clean(&raw_tables()).unwrap()).unwrap();

    let path = format!(
        "{}/weratedogs_integration_master.csv",
        std::env::temp_dir().display()
    );
    write_master_csv(&path, &merged).unwrap();
    let back = read_master_csv(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(back.len(), merged.len());
    let written: BTreeSet<_> = merged.iter().map(|r| r.tweet_id).collect();
    let read: BTreeSet<_> = back.iter().map(|r| r.tweet_id).collect();
    assert_eq!(written, read);

    let report = build_report(&back);
    assert_eq!(report.source_counts[0].source, "Twitter for iPhone");
    assert_eq!(report.source_counts[0].count, 2);
    assert_eq!(report.mean_rating_numerator, 12.75);
    assert_eq!(report.most_retweeted.unwrap().tweet_id, 891327558926688256);
    assert_eq!(report.most_liked.unwrap().likes, 41048);
    assert_eq!(report.likes_model.unwrap().observations, 4);
}

struct FlakyApi;

#[async_trait]
impl StatusApi for FlakyApi {
    async fn get_status(&self, tweet_id: TweetId) -> Result<Value, FetchError> {
        if tweet_id == 999 {
            return Err(FetchError::Payload {
                tweet_id,
                message: "No status found with that ID".to_string(),
            });
        }
        Ok(json!({"id": tweet_id, "retweet_count": 1, "favorite_count": 2}))
    }
}

#[tokio::test]
async fn test_gather_skips_failed_lookup() {
    let outcome = fetch_statuses(&FlakyApi, &[111, 999, 222]).await;

    let mut lines = Vec::new();
    write_status_lines(&mut lines, &outcome.statuses).unwrap();
    let engagement = parse_status_lines(lines.as_slice()).unwrap();

    let ids: Vec<_> = engagement.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![111, 222]);
    assert_eq!(outcome.failed_ids(), vec![999]);
}

#[test]
fn test_ids_to_query_cover_both_tables() {
    let raw = raw_tables();
    let ids = tweet_ids_to_query(&raw.archive, &raw.images);
    assert_eq!(ids.len(), 11);
    assert_eq!(ids.last(), Some(&666020888022790149));
}
