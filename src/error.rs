//! Error types for the wrangling pipeline.
//!
//! Fetch errors are recoverable: the identifier is skipped and the batch
//! continues. Cleaning and merge errors abort the run.

use thiserror::Error;

use crate::records::TweetId;

/// A cleaning rule met a value it cannot transform.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("tweet {tweet_id}: timestamp {value:?} does not match \"YYYY-MM-DD HH:MM:SS +0000\"")]
    Timestamp {
        tweet_id: TweetId,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("tweet {tweet_id}: source {value:?} has no anchor text")]
    SourceMarkup { tweet_id: TweetId, value: String },
}

/// A single status lookup failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for tweet {tweet_id} failed: {source}")]
    Http {
        tweet_id: TweetId,
        #[source]
        source: reqwest::Error,
    },

    #[error("lookup of tweet {tweet_id} returned HTTP {status}")]
    Status { tweet_id: TweetId, status: u16 },

    #[error("lookup of tweet {tweet_id} returned an unusable payload: {message}")]
    Payload { tweet_id: TweetId, message: String },
}

impl FetchError {
    pub fn tweet_id(&self) -> TweetId {
        match self {
            FetchError::Http { tweet_id, .. }
            | FetchError::Status { tweet_id, .. }
            | FetchError::Payload { tweet_id, .. } => *tweet_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{collection} collection contains tweet {tweet_id} more than once")]
    DuplicateId {
        collection: &'static str,
        tweet_id: TweetId,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("need at least {needed} observations, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    #[error("regressor {name:?} has {got} values, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("design matrix is singular")]
    SingularMatrix,
}
