use chrono::{DateTime, Utc};
use fake::Dummy;

/// Defines the author summary attached to a post.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub handle: String,
}

/// Defines a link span inside a post body or bio, keyed by the literal short
/// link it stands in for.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq)]
pub struct Entity {
    pub short_url: String,
    pub expanded_url: String,
    pub media_key: Option<String>, // Set when the span points at an attached media item
}

/// Defines one encoding of a video or animated media item.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq)]
pub struct Variant {
    pub url: String,
    pub bitrate: u64,
}

/// Defines an attached media item.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq)]
pub struct MediaItem {
    pub media_key: String,
    pub placeholder_key: String, // Short link the platform inlines in the body
    pub static_url: String,
    pub variants: Vec<Variant>,
}

/// Defines post engagement counters.
///
#[derive(Clone, Copy, Debug, Default, Dummy, PartialEq, Eq)]
pub struct PostMetrics {
    pub reposts: u64,
    pub likes: u64,
}

/// Defines post data structure.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub id: String,
    pub author: Author,
    pub body: String,
    pub extended_body: Option<String>, // Full text of long posts, when the API sent it
    pub created_at: DateTime<Utc>,
    pub entities: Vec<Entity>,
    pub media: Vec<MediaItem>,
    pub quoted: Option<Box<Post>>,
    pub metrics: PostMetrics,
}

impl Post {
    /// Returns the most complete body text available.
    ///
    pub fn display_body(&self) -> &str {
        match self.extended_body.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => &self.body,
        }
    }

    /// Returns the attached media item with the given key.
    ///
    pub fn media_item(&self, media_key: &str) -> Option<&MediaItem> {
        self.media.iter().find(|m| m.media_key == media_key)
    }
}

/// Defines profile counters.
///
#[derive(Clone, Copy, Debug, Default, Dummy, PartialEq, Eq)]
pub struct UserCounts {
    pub following: u64,
    pub followers: u64,
    pub posts: u64,
    pub likes: u64,
}

/// Defines user profile data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq)]
pub struct User {
    pub name: String,
    pub handle: String,
    pub verified: bool,
    pub protected: bool,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub bio_entities: Vec<Entity>,
    pub url: Option<String>,
    pub joined: DateTime<Utc>,
    pub counts: UserCounts,
}
