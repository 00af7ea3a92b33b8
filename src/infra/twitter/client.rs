use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::error::FetchError;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient};
use crate::records::TweetId;
use crate::services::status_api::StatusApi;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Status lookups against the v1.1 `statuses/show` endpoint.
pub struct TwitterClient<C> {
    http: C,
    endpoint: Url,
}

impl TwitterClient<ApiKey<BasicClient>> {
    /// Builds a client that authenticates every request with `bearer_token`.
    pub fn new(bearer_token: &str, api_base: &str) -> anyhow::Result<Self> {
        let http = ApiKey::bearer(BasicClient::new()?, bearer_token)?;
        Self::with_http(http, api_base)
    }
}

impl<C> TwitterClient<C> {
    pub fn with_http(http: C, api_base: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(api_base)?.join("1.1/statuses/show.json")?;
        Ok(Self { http, endpoint })
    }

    fn status_url(&self, tweet_id: TweetId) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("id", &tweet_id.to_string())
            .append_pair("tweet_mode", "extended");
        url
    }
}

#[async_trait]
impl<C: HttpClient> StatusApi for TwitterClient<C> {
    async fn get_status(&self, tweet_id: TweetId) -> Result<Value, FetchError> {
        let req = reqwest::Request::new(reqwest::Method::GET, self.status_url(tweet_id));

        let response = self
            .http
            .execute(req)
            .await
            .map_err(|source| FetchError::Http { tweet_id, source })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                tweet_id,
                status: response.status().as_u16(),
            });
        }

        let status: Value = response
            .json()
            .await
            .map_err(|source| FetchError::Http { tweet_id, source })?;

        // Keep only objects the JSON-lines reader can use later
        for field in ["id", "retweet_count", "favorite_count"] {
            if !status[field].is_u64() {
                return Err(FetchError::Payload {
                    tweet_id,
                    message: format!("missing or non-integer {field:?}"),
                });
            }
        }

        Ok(status)
    }
}
