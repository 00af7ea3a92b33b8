//! Row types for the three input tables and the merged output table.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

pub type TweetId = u64;

/// A raw row of the enhanced twitter archive, exactly as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArchiveRecord {
    pub tweet_id: TweetId,
    pub in_reply_to_status_id: Option<f64>,
    pub in_reply_to_user_id: Option<f64>,
    pub timestamp: String,
    pub source: String,
    pub text: String,
    pub retweeted_status_id: Option<f64>,
    pub retweeted_status_user_id: Option<f64>,
    pub retweeted_status_timestamp: Option<String>,
    pub expanded_urls: Option<String>,
    pub rating_numerator: i64,
    pub rating_denominator: i64,
    /// The archive writes a literal `None` for unnamed dogs.
    #[serde(deserialize_with = "sentinel_none")]
    pub name: Option<String>,
    pub doggo: String,
    pub floofer: String,
    pub pupper: String,
    pub puppo: String,
}

/// The single dog stage recorded for an archive row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DogType {
    Doggo,
    Floofer,
    Pupper,
    Puppo,
    Multiple,
    #[serde(rename = "not specified")]
    NotSpecified,
}

impl DogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DogType::Doggo => "doggo",
            DogType::Floofer => "floofer",
            DogType::Pupper => "pupper",
            DogType::Puppo => "puppo",
            DogType::Multiple => "multiple",
            DogType::NotSpecified => "not specified",
        }
    }
}

impl fmt::Display for DogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An original, top-level post after the archive cleaning rules ran.
///
/// Reply and retweet linkage columns and the four dog-stage columns have no
/// counterpart here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveRecord {
    pub tweet_id: TweetId,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub text: String,
    pub expanded_urls: Option<String>,
    pub rating_numerator: i64,
    pub rating_denominator: i64,
    pub name: Option<String>,
    pub dog_type: DogType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    pub is_dog: bool,
}

/// Image classification result for one tweet, predictions ranked by confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub tweet_id: TweetId,
    pub jpg_url: String,
    pub img_num: u32,
    pub predictions: [Prediction; 3],
}

impl ImageRecord {
    pub fn has_dog_prediction(&self) -> bool {
        self.predictions.iter().any(|p| p.is_dog)
    }
}

/// One row of the image predictions TSV.
#[derive(Debug, Deserialize)]
pub(crate) struct RawImageRow {
    tweet_id: TweetId,
    jpg_url: String,
    img_num: u32,
    p1: String,
    p1_conf: f64,
    #[serde(deserialize_with = "python_bool")]
    p1_dog: bool,
    p2: String,
    p2_conf: f64,
    #[serde(deserialize_with = "python_bool")]
    p2_dog: bool,
    p3: String,
    p3_conf: f64,
    #[serde(deserialize_with = "python_bool")]
    p3_dog: bool,
}

impl From<RawImageRow> for ImageRecord {
    fn from(row: RawImageRow) -> Self {
        ImageRecord {
            tweet_id: row.tweet_id,
            jpg_url: row.jpg_url,
            img_num: row.img_num,
            predictions: [
                Prediction {
                    label: row.p1,
                    confidence: row.p1_conf,
                    is_dog: row.p1_dog,
                },
                Prediction {
                    label: row.p2,
                    confidence: row.p2_conf,
                    is_dog: row.p2_dog,
                },
                Prediction {
                    label: row.p3,
                    confidence: row.p3_conf,
                    is_dog: row.p3_dog,
                },
            ],
        }
    }
}

/// Counters pulled out of a raw status object, still keyed by the API's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusCounts {
    pub id: TweetId,
    pub retweet_count: u64,
    pub favorite_count: u64,
}

/// Engagement counters keyed by the same identifier name as the other tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngagementRecord {
    pub tweet_id: TweetId,
    pub retweets: u64,
    pub likes: u64,
}

/// One row of `twitter_archive_master.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub tweet_id: TweetId,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub text: String,
    pub expanded_urls: Option<String>,
    pub rating_numerator: i64,
    pub rating_denominator: i64,
    pub name: Option<String>,
    pub dog_type: DogType,
    pub jpg_url: String,
    pub img_num: u32,
    pub p1: String,
    pub p1_conf: f64,
    pub p1_dog: bool,
    pub p2: String,
    pub p2_conf: f64,
    pub p2_dog: bool,
    pub p3: String,
    pub p3_conf: f64,
    pub p3_dog: bool,
    pub retweets: u64,
    pub likes: u64,
}

impl MergedRecord {
    pub fn new(
        archive: &ArchiveRecord,
        image: &ImageRecord,
        engagement: &EngagementRecord,
    ) -> Self {
        let [p1, p2, p3] = &image.predictions;
        MergedRecord {
            tweet_id: archive.tweet_id,
            timestamp: archive.timestamp,
            source: archive.source.clone(),
            text: archive.text.clone(),
            expanded_urls: archive.expanded_urls.clone(),
            rating_numerator: archive.rating_numerator,
            rating_denominator: archive.rating_denominator,
            name: archive.name.clone(),
            dog_type: archive.dog_type,
            jpg_url: image.jpg_url.clone(),
            img_num: image.img_num,
            p1: p1.label.clone(),
            p1_conf: p1.confidence,
            p1_dog: p1.is_dog,
            p2: p2.label.clone(),
            p2_conf: p2.confidence,
            p2_dog: p2.is_dog,
            p3: p3.label.clone(),
            p3_conf: p3.confidence,
            p3_dog: p3.is_dog,
            retweets: engagement.retweets,
            likes: engagement.likes,
        }
    }
}

fn sentinel_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| v != "None"))
}

/// Accepts the `True`/`False` spelling written by pandas as well as `true`/`false`.
fn python_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.as_str() {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(de::Error::invalid_value(
            Unexpected::Str(other),
            &"True or False",
        )),
    }
}
