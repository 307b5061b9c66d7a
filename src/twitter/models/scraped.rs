//! Session-based GraphQL layout. Objects arrive wrapped in `result` nodes
//! tagged by `__typename`, with the familiar v1.1 fields under `legacy`.

use super::legacy::{EntitiesModel, StatusModel, UrlModel, UserModel};
use crate::twitter::error::FetchError;
use crate::twitter::resource::{Post, User};
use log::*;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ResultNode<T> {
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum TweetResult {
    Tweet(TweetNode),
    TweetWithVisibilityResults { tweet: TweetNode },
    TweetTombstone {},
    TweetUnavailable { reason: Option<String> },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TweetNode {
    rest_id: String,
    core: CoreNode,
    legacy: StatusModel,
    note_tweet: Option<NoteTweetNode>,
    quoted_status_result: Option<ResultNode<Box<TweetResult>>>,
}

#[derive(Debug, Deserialize)]
struct CoreNode {
    user_results: ResultNode<UserResult>,
}

#[derive(Debug, Deserialize)]
struct NoteTweetNode {
    note_tweet_results: ResultNode<NoteTweetResult>,
}

#[derive(Debug, Deserialize)]
struct NoteTweetResult {
    text: String,
    #[serde(default)]
    entity_set: EntitiesModel,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum UserResult {
    User(UserNode),
    UserUnavailable { reason: Option<String> },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    #[serde(default)]
    is_blue_verified: bool,
    legacy: UserModel,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    #[serde(rename = "tweetResult")]
    tweet_result: Option<ResultNode<TweetResult>>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<ResultNode<UserResult>>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

fn unavailable(reason: Option<&str>) -> FetchError {
    match reason {
        Some("Protected") => FetchError::Protected,
        Some("NsfwLoggedOut") | Some("NsfwViewerHasNoStatedAge") => FetchError::AuthRequired,
        _ => FetchError::NotFound,
    }
}

impl TweetResult {
    fn into_post(self, follow_quote: bool) -> Result<Post, FetchError> {
        let node = match self {
            TweetResult::Tweet(node) | TweetResult::TweetWithVisibilityResults { tweet: node } => {
                node
            }
            TweetResult::TweetTombstone {} => return Err(FetchError::NotFound),
            TweetResult::TweetUnavailable { reason } => return Err(unavailable(reason.as_deref())),
            TweetResult::Unknown => {
                return Err(FetchError::Malformed("unknown tweet result type".to_string()))
            }
        };

        let author = match node.core.user_results.result {
            Some(UserResult::User(user)) => user.legacy.author()?,
            _ => {
                return Err(FetchError::Malformed(format!(
                    "tweet {} has no author",
                    node.rest_id
                )))
            }
        };

        let quoted = match (follow_quote, node.quoted_status_result) {
            (true, Some(ResultNode { result: Some(quoted) })) => match (*quoted).into_post(false) {
                Ok(post) => Some(Box::new(post)),
                Err(e) => {
                    debug!("Skipping quoted tweet of {}: {}", node.rest_id, e);
                    None
                }
            },
            _ => None,
        };

        let mut post = node.legacy.into_post_with(author)?;
        if let Some(note) = node.note_tweet.and_then(|n| n.note_tweet_results.result) {
            for url in note.entity_set.urls.into_iter().map(UrlModel::into_entity) {
                if !post.entities.iter().any(|e| e.short_url == url.short_url) {
                    post.entities.push(url);
                }
            }
            post.extended_body = Some(note.text);
        }
        post.quoted = quoted;
        Ok(post)
    }
}

/// Normalize a `TweetResultByRestId` body.
///
pub fn post(value: Value) -> Result<Post, FetchError> {
    let payload_error = FetchError::from_payload(&value);
    let envelope: Envelope<TweetData> = serde_json::from_value(value)?;
    match envelope
        .data
        .and_then(|d| d.tweet_result)
        .and_then(|r| r.result)
    {
        Some(result) => result.into_post(true),
        None => Err(payload_error.unwrap_or(FetchError::NotFound)),
    }
}

/// Normalize a `UserByScreenName` body.
///
pub fn user(value: Value) -> Result<User, FetchError> {
    let payload_error = FetchError::from_payload(&value);
    let envelope: Envelope<UserData> = serde_json::from_value(value)?;
    match envelope.data.and_then(|d| d.user).and_then(|r| r.result) {
        Some(UserResult::User(node)) => {
            let mut user = node.legacy.into_user()?;
            user.verified = user.verified || node.is_blue_verified;
            Ok(user)
        }
        Some(UserResult::UserUnavailable { reason }) => Err(unavailable(reason.as_deref())),
        Some(UserResult::Unknown) => {
            Err(FetchError::Malformed("unknown user result type".to_string()))
        }
        None => Err(payload_error.unwrap_or(FetchError::NotFound)),
    }
}
