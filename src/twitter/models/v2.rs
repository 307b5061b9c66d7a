//! API v2 layout: a primary `data` object whose authors, media, and quoted
//! posts are referenced by key and side-loaded in `includes`.

use super::{handle, non_empty, parse_iso_time};
use crate::twitter::error::FetchError;
use crate::twitter::resource::{
    Author, Entity, MediaItem, Post, PostMetrics, User, UserCounts, Variant,
};
use log::*;
use serde::Deserialize;
use serde_json::Value;

/// Query parameters asking v2 to side-load everything a post line needs.
pub const TWEET_EXPANSIONS: &str = "author_id,attachments.media_keys,referenced_tweets.id,\
referenced_tweets.id.author_id,referenced_tweets.id.attachments.media_keys";
pub const TWEET_FIELDS: &str =
    "attachments,author_id,created_at,entities,note_tweet,public_metrics,referenced_tweets";
pub const MEDIA_FIELDS: &str = "media_key,preview_image_url,type,url,variants";
pub const AUTHOR_FIELDS: &str = "name,username";
pub const USER_FIELDS: &str =
    "created_at,description,entities,location,protected,public_metrics,url,verified";

#[derive(Debug, Deserialize)]
struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<UserModel>,
    #[serde(default)]
    media: Vec<MediaModel>,
    #[serde(default)]
    tweets: Vec<TweetModel>,
}

#[derive(Debug, Clone, Deserialize)]
struct UrlModel {
    url: String,
    expanded_url: Option<String>,
    media_key: Option<String>,
}

impl UrlModel {
    fn to_entity(&self) -> Entity {
        Entity {
            short_url: self.url.clone(),
            expanded_url: self.expanded_url.clone().unwrap_or_else(|| self.url.clone()),
            media_key: self.media_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EntitiesModel {
    #[serde(default)]
    urls: Vec<UrlModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AttachmentsModel {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReferenceModel {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PublicMetricsModel {
    retweet_count: Option<u64>,
    like_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct NoteTweetModel {
    text: String,
    #[serde(default)]
    entities: EntitiesModel,
}

#[derive(Debug, Clone, Deserialize)]
struct TweetModel {
    id: String,
    text: Option<String>,
    author_id: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    entities: EntitiesModel,
    #[serde(default)]
    attachments: AttachmentsModel,
    #[serde(default)]
    referenced_tweets: Vec<ReferenceModel>,
    #[serde(default)]
    public_metrics: PublicMetricsModel,
    note_tweet: Option<NoteTweetModel>,
}

#[derive(Debug, Clone, Deserialize)]
struct VariantModel {
    bit_rate: Option<u64>,
    url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MediaModel {
    media_key: String,
    url: Option<String>,
    preview_image_url: Option<String>,
    #[serde(default)]
    variants: Vec<VariantModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UrlListModel {
    #[serde(default)]
    urls: Vec<UrlModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UserEntitiesModel {
    url: Option<UrlListModel>,
    description: Option<UrlListModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UserMetricsModel {
    followers_count: Option<u64>,
    following_count: Option<u64>,
    tweet_count: Option<u64>,
    like_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct UserModel {
    id: String,
    name: String,
    username: String,
    verified: Option<bool>,
    protected: Option<bool>,
    location: Option<String>,
    description: Option<String>,
    #[serde(default)]
    entities: UserEntitiesModel,
    created_at: Option<String>,
    #[serde(default)]
    public_metrics: UserMetricsModel,
    url: Option<String>,
}

impl Includes {
    fn author(&self, tweet: &TweetModel) -> Result<Author, FetchError> {
        let author_id = tweet.author_id.as_deref().unwrap_or_default();
        self.users
            .iter()
            .find(|u| u.id == author_id)
            .ok_or_else(|| {
                FetchError::Malformed(format!(
                    "author '{}' of tweet {} missing from includes",
                    author_id, tweet.id
                ))
            })
            .and_then(|u| {
                Ok(Author {
                    name: u.name.clone(),
                    handle: handle(u.username.clone(), &format!("author of tweet {}", tweet.id))?,
                })
            })
    }

    fn media(&self, media_key: &str) -> Option<&MediaModel> {
        self.media.iter().find(|m| m.media_key == media_key)
    }

    fn tweet(&self, id: &str) -> Option<&TweetModel> {
        self.tweets.iter().find(|t| t.id == id)
    }
}

/// Join a tweet with its side-loaded objects. `depth` limits how many levels
/// of quoting are followed.
///
fn join(tweet: &TweetModel, includes: &Includes, depth: usize) -> Result<Post, FetchError> {
    let author = includes.author(tweet)?;
    let created_at = parse_iso_time(tweet.created_at.as_deref())?;
    let body = tweet
        .text
        .clone()
        .ok_or_else(|| FetchError::Malformed(format!("tweet {} has no text", tweet.id)))?;

    let mut entities: Vec<Entity> = tweet.entities.urls.iter().map(UrlModel::to_entity).collect();
    if let Some(note) = &tweet.note_tweet {
        for url in &note.entities.urls {
            if !entities.iter().any(|e| e.short_url == url.url) {
                entities.push(url.to_entity());
            }
        }
    }

    // Posts with several attachments carry one inline link for all of them
    let shared_placeholder = entities
        .iter()
        .find(|e| e.media_key.is_some())
        .map(|e| e.short_url.clone())
        .unwrap_or_default();

    let mut media = Vec::with_capacity(tweet.attachments.media_keys.len());
    for key in &tweet.attachments.media_keys {
        let item = match includes.media(key) {
            Some(item) => item,
            None => {
                debug!("Media {} of tweet {} missing from includes", key, tweet.id);
                continue;
            }
        };
        let placeholder_key = entities
            .iter()
            .find(|e| e.media_key.as_deref() == Some(key.as_str()))
            .map(|e| e.short_url.clone())
            .unwrap_or_else(|| shared_placeholder.clone());
        if !entities.iter().any(|e| e.media_key.as_deref() == Some(key.as_str())) {
            entities.push(Entity {
                short_url: placeholder_key.clone(),
                expanded_url: placeholder_key.clone(),
                media_key: Some(key.clone()),
            });
        }
        media.push(MediaItem {
            media_key: key.clone(),
            placeholder_key,
            static_url: item
                .url
                .clone()
                .or_else(|| item.preview_image_url.clone())
                .unwrap_or_default(),
            variants: item
                .variants
                .iter()
                .map(|v| Variant {
                    url: v.url.clone(),
                    bitrate: v.bit_rate.unwrap_or(0),
                })
                .collect(),
        });
    }

    let quoted = if depth > 0 {
        tweet
            .referenced_tweets
            .iter()
            .find(|r| r.kind == "quoted")
            .and_then(|r| match includes.tweet(&r.id) {
                Some(quoted) => match join(quoted, includes, depth - 1) {
                    Ok(post) => Some(Box::new(post)),
                    Err(e) => {
                        warn!("Dropping unreadable quoted tweet {}: {}", r.id, e);
                        None
                    }
                },
                None => {
                    debug!("Quoted tweet {} missing from includes", r.id);
                    None
                }
            })
    } else {
        None
    };

    Ok(Post {
        id: tweet.id.clone(),
        author,
        body,
        extended_body: tweet.note_tweet.as_ref().map(|n| n.text.clone()),
        created_at,
        entities,
        media,
        quoted,
        metrics: PostMetrics {
            reposts: tweet.public_metrics.retweet_count.unwrap_or(0),
            likes: tweet.public_metrics.like_count.unwrap_or(0),
        },
    })
}

fn missing_data(value: &Value) -> FetchError {
    FetchError::from_payload(value)
        .unwrap_or_else(|| FetchError::Malformed("response has no data".to_string()))
}

/// Normalize a `GET /2/tweets/:id` body.
///
pub fn post(value: Value) -> Result<Post, FetchError> {
    let error = missing_data(&value);
    let response: Response<TweetModel> = serde_json::from_value(value)?;
    // Partial errors (e.g. a deleted quoted tweet) still come with data
    match response.data {
        Some(tweet) => join(&tweet, &response.includes, 1),
        None => Err(error),
    }
}

/// Normalize a `GET /2/users/by/username/:username` body.
///
pub fn user(value: Value) -> Result<User, FetchError> {
    let error = missing_data(&value);
    let response: Response<UserModel> = serde_json::from_value(value)?;
    let user = response.data.ok_or(error)?;

    let joined = parse_iso_time(user.created_at.as_deref())?;
    let url = user
        .entities
        .url
        .as_ref()
        .and_then(|list| list.urls.first())
        .map(|u| u.expanded_url.clone().unwrap_or_else(|| u.url.clone()))
        .or(user.url);
    let bio_entities = user
        .entities
        .description
        .map(|list| list.urls.iter().map(UrlModel::to_entity).collect())
        .unwrap_or_default();

    Ok(User {
        name: user.name,
        handle: handle(user.username, &format!("user {}", user.id))?,
        verified: user.verified.unwrap_or(false),
        protected: user.protected.unwrap_or(false),
        location: non_empty(user.location),
        bio: non_empty(user.description),
        bio_entities,
        url: non_empty(url),
        joined,
        counts: UserCounts {
            following: user.public_metrics.following_count.unwrap_or(0),
            followers: user.public_metrics.followers_count.unwrap_or(0),
            posts: user.public_metrics.tweet_count.unwrap_or(0),
            likes: user.public_metrics.like_count.unwrap_or(0),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tweet_response() -> Value {
        json!({
            "data": {
                "id": "20",
                "text": "look https://t.co/q https://t.co/m",
                "author_id": "1",
                "created_at": "2023-01-02T03:04:05.000Z",
                "entities": { "urls": [
                    { "start": 5, "end": 23, "url": "https://t.co/q", "expanded_url": "https://twitter.com/bob/status/10" },
                    { "start": 24, "end": 42, "url": "https://t.co/m", "expanded_url": "https://twitter.com/ann/status/20/video/1", "media_key": "7_1" }
                ] },
                "attachments": { "media_keys": ["7_1", "3_2"] },
                "referenced_tweets": [{ "type": "quoted", "id": "10" }],
                "public_metrics": { "retweet_count": 3, "like_count": 4, "reply_count": 0 }
            },
            "includes": {
                "users": [
                    { "id": "1", "name": "Ann", "username": "ann99" },
                    { "id": "2", "name": "Bob", "username": "bob" }
                ],
                "media": [
                    { "media_key": "7_1", "type": "video", "preview_image_url": "https://pbs.twimg.com/thumb.jpg",
                      "variants": [ { "bit_rate": 256000, "url": "https://video.twimg.com/256.mp4" },
                                    { "content_type": "application/x-mpegURL", "url": "https://video.twimg.com/pl.m3u8" } ] },
                    { "media_key": "3_2", "type": "photo", "url": "https://pbs.twimg.com/photo.jpg" }
                ],
                "tweets": [
                    { "id": "10", "text": "original", "author_id": "2", "created_at": "2023-01-01T00:00:00.000Z" }
                ]
            }
        })
    }

    #[test]
    fn tweet_joins_includes() {
        let post = post(tweet_response()).unwrap();
        assert_eq!(post.author.handle, "ann99");
        assert_eq!(post.metrics, PostMetrics { reposts: 3, likes: 4 });

        assert_eq!(post.media.len(), 2);
        assert_eq!(post.media[0].static_url, "https://pbs.twimg.com/thumb.jpg");
        assert_eq!(post.media[0].variants.len(), 2);
        // second attachment has no link of its own and shares the first one's
        assert_eq!(post.media[1].placeholder_key, "https://t.co/m");
        assert_eq!(post.entities.len(), 3);

        let quoted = post.quoted.as_ref().unwrap();
        assert_eq!(quoted.author.name, "Bob");
        assert_eq!(quoted.body, "original");
    }

    #[test]
    fn tweet_missing_author_is_malformed() {
        let mut value = tweet_response();
        value["includes"]["users"] = json!([]);
        assert!(matches!(post(value), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn tweet_with_blank_username_is_malformed() {
        let mut value = tweet_response();
        value["includes"]["users"][0]["username"] = json!("");
        assert!(matches!(post(value), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn tweet_missing_quoted_is_tolerated() {
        let mut value = tweet_response();
        value["includes"]["tweets"] = json!([]);
        value["errors"] = json!([{ "type": "https://api.twitter.com/2/problems/resource-not-found" }]);
        assert!(post(value).unwrap().quoted.is_none());
    }

    #[test]
    fn note_tweet_is_extended_body() {
        let mut value = tweet_response();
        value["data"]["note_tweet"] = json!({
            "text": "a much longer body https://t.co/long",
            "entities": { "urls": [{ "url": "https://t.co/long", "expanded_url": "https://example.com/long" }] }
        });
        let post = post(value).unwrap();
        assert_eq!(post.display_body(), "a much longer body https://t.co/long");
        assert!(post.entities.iter().any(|e| e.short_url == "https://t.co/long"));
    }

    #[test]
    fn tweet_not_found() {
        let value = json!({ "errors": [{
            "value": "20",
            "detail": "Could not find tweet with id: [20].",
            "title": "Not Found Error",
            "type": "https://api.twitter.com/2/problems/resource-not-found"
        }] });
        assert_eq!(post(value), Err(FetchError::NotFound));
    }

    #[test]
    fn user_normalizes() {
        let value = json!({ "data": {
            "id": "1",
            "name": "Ann",
            "username": "ann99",
            "verified": true,
            "location": "Lyon",
            "description": "hi https://t.co/b",
            "created_at": "2010-05-06T07:08:09.000Z",
            "entities": {
                "url": { "urls": [{ "url": "https://t.co/u", "expanded_url": "https://ann.example" }] },
                "description": { "urls": [{ "url": "https://t.co/b", "expanded_url": "https://blog.example" }] }
            },
            "public_metrics": { "followers_count": 12345, "following_count": 10, "tweet_count": 1000, "like_count": 5 }
        } });
        let user = user(value).unwrap();
        assert!(user.verified);
        assert!(!user.protected);
        assert_eq!(user.url.as_deref(), Some("https://ann.example"));
        assert_eq!(user.location.as_deref(), Some("Lyon"));
        assert_eq!(user.counts.followers, 12345);
        assert_eq!(user.counts.posts, 1000);
    }
}
