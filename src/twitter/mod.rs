mod client;
mod error;
pub mod models;
mod resource;
pub mod session;

pub use client::Client;
pub use error::{FetchError, Target};
pub use resource::*;

use crate::config::{Config, Credentials};
use crate::error::AppError;
use log::*;
use models::{v2, Shape};
use serde_json::{json, Value};
use session::{AppOnlyBearer, LoginSession, Session, SessionProvider, SessionStore, StaticBearer};
use std::sync::Arc;

/// Which upstream API contract the gateway speaks.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Api {
    /// REST v1.1 with an application-only bearer token
    Legacy,
    /// API v2 with a bearer token
    V2,
    /// Session-based GraphQL with a username/password login
    Session,
}

impl Api {
    fn shape(self) -> Shape {
        match self {
            Api::Legacy => Shape::Legacy,
            Api::V2 => Shape::V2,
            Api::Session => Shape::Scraped,
        }
    }

    fn post_request(self, id: &str) -> (String, Vec<(&'static str, String)>) {
        match self {
            Api::Legacy => (
                "1.1/statuses/show.json".to_string(),
                vec![("id", id.to_owned()), ("tweet_mode", "extended".to_string())],
            ),
            Api::V2 => (
                format!("2/tweets/{}", id),
                vec![
                    ("expansions", v2::TWEET_EXPANSIONS.to_string()),
                    ("tweet.fields", v2::TWEET_FIELDS.to_string()),
                    ("user.fields", v2::AUTHOR_FIELDS.to_string()),
                    ("media.fields", v2::MEDIA_FIELDS.to_string()),
                ],
            ),
            Api::Session => (
                "graphql/TweetResultByRestId".to_string(),
                vec![(
                    "variables",
                    json!({ "tweetId": id, "withCommunity": false }).to_string(),
                )],
            ),
        }
    }

    fn user_request(self, handle: &str) -> (String, Vec<(&'static str, String)>) {
        match self {
            Api::Legacy => (
                "1.1/users/show.json".to_string(),
                vec![("screen_name", handle.to_owned())],
            ),
            Api::V2 => (
                format!("2/users/by/username/{}", handle),
                vec![("user.fields", v2::USER_FIELDS.to_string())],
            ),
            Api::Session => (
                "graphql/UserByScreenName".to_string(),
                vec![("variables", json!({ "screen_name": handle }).to_string())],
            ),
        }
    }
}

/// Responsible for fetching posts and profiles from Twitter and normalizing
/// the response into [`Post`] and [`User`] values. Each call issues exactly
/// one data request; nothing is retried.
///
pub struct Twitter {
    client: Client,
    api: Api,
    session: Arc<dyn SessionProvider>,
}

impl Twitter {
    /// Returns a gateway over an existing client and session provider.
    ///
    pub fn new(client: Client, api: Api, session: Arc<dyn SessionProvider>) -> Twitter {
        Twitter {
            client,
            api,
            session,
        }
    }

    /// Returns a gateway configured from the loaded configuration.
    ///
    pub fn from_config(config: &Config) -> Result<Twitter, AppError> {
        let client = Client::new(&config.api_base_url, config.timeout())?;
        let (api, session): (Api, Arc<dyn SessionProvider>) = match config.credentials()? {
            Credentials::Legacy {
                consumer_key,
                consumer_secret,
            } => (
                Api::Legacy,
                Arc::new(AppOnlyBearer::new(consumer_key, consumer_secret)) as Arc<dyn SessionProvider>,
            ),
            Credentials::V2 { bearer_token } => (
                Api::V2,
                Arc::new(StaticBearer::new(bearer_token)) as Arc<dyn SessionProvider>,
            ),
            Credentials::Session { username, password } => {
                let store = SessionStore::new(config.session_base());
                (
                    Api::Session,
                    Arc::new(LoginSession::new(username, password, store)) as Arc<dyn SessionProvider>,
                )
            }
        };
        debug!("Initializing Twitter gateway for {:?} API...", api);
        Ok(Twitter::new(client, api, session))
    }

    /// Returns the post with the given numeric ID.
    ///
    pub async fn fetch_post(&self, id: &str) -> Result<Post, FetchError> {
        debug!("Requesting status ID {}...", id);
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(FetchError::NotFound);
        }
        let (path, params) = self.api.post_request(id);
        let value = self.get(&path, &params).await?;
        self.api.shape().post(value)
    }

    /// Returns the profile with the given handle (a leading `@` is ignored).
    ///
    pub async fn fetch_user(&self, handle: &str) -> Result<User, FetchError> {
        let handle = handle.trim().trim_start_matches('@');
        debug!("Requesting screen name {}...", handle);
        if handle.is_empty() || !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FetchError::NotFound);
        }
        let (path, params) = self.api.user_request(handle);
        let value = self.get(&path, &params).await?;
        self.api.shape().user(value)
    }

    async fn get(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value, FetchError> {
        let session: Session = self.session.session(&self.client).await?;
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        match self.client.get(path, &params, &session).await {
            Err(FetchError::AuthFailed) => {
                // Next trigger starts over with a fresh session
                self.session.invalidate().await;
                Err(FetchError::AuthFailed)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::uuid::UUIDv4;
    use fake::Fake;
    use httpmock::MockServer;
    use std::time::Duration;
    use uuid::Uuid;

    fn twitter(server: &MockServer, api: Api, token: &str) -> Twitter {
        Twitter::new(
            Client::new(&server.base_url(), Duration::from_secs(2)).unwrap(),
            api,
            Arc::new(StaticBearer::new(token)),
        )
    }

    #[tokio::test]
    async fn legacy_post_success() -> Result<(), FetchError> {
        let token: Uuid = UUIDv4.fake();
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/1.1/statuses/show.json")
                    .query_param("id", "123")
                    .query_param("tweet_mode", "extended")
                    .header("Authorization", &format!("Bearer {}", &token));
                then.status(200).json_body(serde_json::json!({
                    "id_str": "123",
                    "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                    "full_text": "Hello 🌍 https://t.co/xyz",
                    "user": { "name": "Ann", "screen_name": "ann99" },
                    "entities": { "urls": [{ "url": "https://t.co/xyz", "expanded_url": "https://example.com/page" }] },
                    "retweet_count": 1,
                    "favorite_count": 2
                }));
            })
            .await;

        let post = twitter(&server, Api::Legacy, &token.to_string())
            .fetch_post("123")
            .await?;
        mock.assert_async().await;
        assert_eq!(post.author.handle, "ann99");
        assert_eq!(post.entities.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn legacy_error_payload_without_message() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("GET").path("/1.1/statuses/show.json");
                then.status(200)
                    .json_body(serde_json::json!({ "errors": [{ "code": 131 }] }));
            })
            .await;

        let result = twitter(&server, Api::Legacy, "t").fetch_post("123").await;
        assert_eq!(result, Err(FetchError::UpstreamError(None)));
    }

    #[tokio::test]
    async fn v2_user_success() -> Result<(), FetchError> {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/2/users/by/username/ann99")
                    .query_param("user.fields", v2::USER_FIELDS);
                then.status(200).json_body(serde_json::json!({ "data": {
                    "id": "1",
                    "name": "Ann",
                    "username": "ann99",
                    "created_at": "2010-05-06T07:08:09.000Z",
                    "public_metrics": { "followers_count": 12345 }
                } }));
            })
            .await;

        let user = twitter(&server, Api::V2, "t").fetch_user("@ann99").await?;
        mock.assert_async().await;
        assert_eq!(user.counts.followers, 12345);
        Ok(())
    }

    #[tokio::test]
    async fn session_post_passes_variables() -> Result<(), FetchError> {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/graphql/TweetResultByRestId")
                    .query_param("variables", r#"{"tweetId":"5","withCommunity":false}"#);
                then.status(200).json_body(serde_json::json!({ "data": { "tweetResult": { "result": {
                    "__typename": "Tweet",
                    "rest_id": "5",
                    "core": { "user_results": { "result": {
                        "__typename": "User",
                        "legacy": { "name": "Ann", "screen_name": "ann99", "created_at": "Sat Jan 05 00:00:00 +0000 2019" }
                    } } },
                    "legacy": {
                        "id_str": "5",
                        "full_text": "hi",
                        "created_at": "Wed Oct 10 20:19:24 +0000 2018"
                    }
                } } } }));
            })
            .await;

        let post = twitter(&server, Api::Session, "t").fetch_post("5").await?;
        mock.assert_async().await;
        assert_eq!(post.body, "hi");
        Ok(())
    }

    #[tokio::test]
    async fn http_statuses_map_to_errors() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("GET").path("/2/tweets/1");
                then.status(429);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/2/tweets/2");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/2/tweets/3");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let twitter = twitter(&server, Api::V2, "t");
        assert_eq!(twitter.fetch_post("1").await, Err(FetchError::RateLimited));
        assert_eq!(twitter.fetch_post("2").await, Err(FetchError::AuthFailed));
        assert!(matches!(
            twitter.fetch_post("3").await,
            Err(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn timeout_is_unreachable() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("GET").path("/2/tweets/1");
                then.status(200).delay(Duration::from_secs(5));
            })
            .await;

        let twitter = Twitter::new(
            Client::new(&server.base_url(), Duration::from_millis(200)).unwrap(),
            Api::V2,
            Arc::new(StaticBearer::new("t")),
        );
        assert!(matches!(
            twitter.fetch_post("1").await,
            Err(FetchError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn invalid_identifiers_skip_network() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.path_contains("/");
                then.status(500);
            })
            .await;

        let twitter = twitter(&server, Api::V2, "t");
        assert_eq!(twitter.fetch_post("abc").await, Err(FetchError::NotFound));
        assert_eq!(twitter.fetch_user("no spaces").await, Err(FetchError::NotFound));
        mock.assert_hits_async(0).await;
    }
}
