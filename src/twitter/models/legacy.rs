//! REST v1.1 layout (`statuses/show`, `users/show`).
//!
//! The session-based GraphQL layout embeds these same objects under its
//! `legacy` keys, so [`scraped`](super::scraped) reuses them.

use super::{handle, non_empty, parse_legacy_time};
use crate::twitter::error::FetchError;
use crate::twitter::resource::{
    Author, Entity, MediaItem, Post, PostMetrics, User, UserCounts, Variant,
};
use log::*;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct UrlModel {
    pub url: String,
    pub expanded_url: Option<String>,
}

impl UrlModel {
    pub(crate) fn into_entity(self) -> Entity {
        Entity {
            expanded_url: self.expanded_url.unwrap_or_else(|| self.url.clone()),
            short_url: self.url,
            media_key: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VariantModel {
    pub bitrate: Option<u64>,
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoInfoModel {
    #[serde(default)]
    pub variants: Vec<VariantModel>,
}

#[derive(Debug, Deserialize)]
pub struct MediaModel {
    #[serde(default)]
    pub id_str: String,
    pub url: String,
    #[serde(default)]
    pub expanded_url: String,
    pub media_url_https: String,
    pub video_info: Option<VideoInfoModel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntitiesModel {
    #[serde(default)]
    pub urls: Vec<UrlModel>,
    #[serde(default)]
    pub media: Vec<MediaModel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtendedEntitiesModel {
    #[serde(default)]
    pub media: Vec<MediaModel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlListModel {
    #[serde(default)]
    pub urls: Vec<UrlModel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserEntitiesModel {
    pub url: Option<UrlListModel>,
    pub description: Option<UrlListModel>,
}

#[derive(Debug, Deserialize)]
pub struct UserModel {
    pub name: String,
    pub screen_name: String,
    pub verified: Option<bool>,
    pub protected: Option<bool>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub entities: UserEntitiesModel,
    pub created_at: Option<String>,
    // Nullable in the session API; missing counts read as zero
    pub friends_count: Option<u64>,
    pub followers_count: Option<u64>,
    pub statuses_count: Option<u64>,
    pub favourites_count: Option<u64>,
}

impl UserModel {
    pub(crate) fn author(&self) -> Result<Author, FetchError> {
        Ok(Author {
            name: self.name.clone(),
            handle: handle(self.screen_name.clone(), &format!("user {:?}", self.name))?,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, FetchError> {
        let screen_name = handle(self.screen_name, &format!("user {:?}", self.name))?;
        let joined = parse_legacy_time(self.created_at.as_deref())?;
        let url = self
            .entities
            .url
            .and_then(|list| list.urls.into_iter().next())
            .map(|u| u.expanded_url.unwrap_or(u.url));
        let bio_entities = self
            .entities
            .description
            .map(|list| list.urls.into_iter().map(UrlModel::into_entity).collect())
            .unwrap_or_default();

        Ok(User {
            name: self.name,
            handle: screen_name,
            verified: self.verified.unwrap_or(false),
            protected: self.protected.unwrap_or(false),
            location: non_empty(self.location),
            bio: non_empty(self.description),
            bio_entities,
            url: non_empty(url),
            joined,
            counts: UserCounts {
                following: self.friends_count.unwrap_or(0),
                followers: self.followers_count.unwrap_or(0),
                posts: self.statuses_count.unwrap_or(0),
                likes: self.favourites_count.unwrap_or(0),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusModel {
    pub id_str: String,
    pub text: Option<String>,
    pub full_text: Option<String>,
    pub created_at: Option<String>,
    pub user: Option<UserModel>,
    #[serde(default)]
    pub entities: EntitiesModel,
    pub extended_entities: Option<ExtendedEntitiesModel>,
    #[serde(default)]
    pub is_quote_status: bool,
    pub quoted_status_id_str: Option<String>,
    pub quoted_status: Option<Box<StatusModel>>,
    pub retweet_count: Option<u64>,
    pub favorite_count: Option<u64>,
}

impl StatusModel {
    /// Normalize a self-contained v1.1 status, including its quoted status.
    ///
    pub fn into_post(mut self) -> Result<Post, FetchError> {
        let author = self
            .user
            .take()
            .ok_or_else(|| FetchError::Malformed(format!("status {} has no user", self.id_str)))?
            .author()?;

        let quoted = match (self.is_quote_status, self.quoted_status.take()) {
            (true, Some(quoted)) => match quoted.into_post() {
                Ok(post) => Some(Box::new(post)),
                Err(e) => {
                    warn!("Dropping unreadable quoted status of {}: {}", self.id_str, e);
                    None
                }
            },
            _ => None,
        };

        let mut post = self.into_post_with(author)?;
        post.quoted = quoted;
        Ok(post)
    }

    /// Normalize the status body with an author resolved elsewhere. The
    /// quoted post is left unset.
    ///
    pub(crate) fn into_post_with(self, author: Author) -> Result<Post, FetchError> {
        let created_at = parse_legacy_time(self.created_at.as_deref())?;
        let body = match (self.text, self.full_text.as_ref()) {
            (Some(text), _) => text,
            (None, Some(full_text)) => full_text.clone(),
            (None, None) => {
                return Err(FetchError::Malformed(format!(
                    "status {} has no text",
                    self.id_str
                )))
            }
        };

        // Only extended_entities lists every attachment
        let media_models = match self.extended_entities {
            Some(extended) if !extended.media.is_empty() => extended.media,
            _ => self.entities.media,
        };

        let mut entities: Vec<Entity> = self
            .entities
            .urls
            .into_iter()
            .map(UrlModel::into_entity)
            .collect();
        let mut media = Vec::with_capacity(media_models.len());
        for (index, item) in media_models.into_iter().enumerate() {
            let media_key = if item.id_str.is_empty() {
                index.to_string()
            } else {
                item.id_str
            };
            entities.push(Entity {
                short_url: item.url.clone(),
                expanded_url: item.expanded_url,
                media_key: Some(media_key.clone()),
            });
            media.push(MediaItem {
                media_key,
                placeholder_key: item.url,
                static_url: item.media_url_https,
                variants: item
                    .video_info
                    .map(|info| {
                        info.variants
                            .into_iter()
                            .map(|v| Variant {
                                url: v.url,
                                bitrate: v.bitrate.unwrap_or(0),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            });
        }

        Ok(Post {
            id: self.id_str,
            author,
            body,
            extended_body: non_empty(self.full_text),
            created_at,
            entities,
            media,
            quoted: None,
            metrics: PostMetrics {
                reposts: self.retweet_count.unwrap_or(0),
                likes: self.favorite_count.unwrap_or(0),
            },
        })
    }
}

/// Normalize a `statuses/show` body.
///
pub fn post(value: Value) -> Result<Post, FetchError> {
    if let Some(error) = FetchError::from_payload(&value) {
        return Err(error);
    }
    serde_json::from_value::<StatusModel>(value)?.into_post()
}

/// Normalize a `users/show` body.
///
pub fn user(value: Value) -> Result<User, FetchError> {
    if let Some(error) = FetchError::from_payload(&value) {
        return Err(error);
    }
    serde_json::from_value::<UserModel>(value)?.into_user()
}
