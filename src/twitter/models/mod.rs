//! Raw response models, one module per upstream response shape.
//!
//! Each shape deserializes its own JSON layout and normalizes it into the
//! shared [`Post`]/[`User`] resources. Adding a shape means adding a module
//! and a [`Shape`] variant; rendering never sees the raw layouts.

pub mod legacy;
pub mod scraped;
pub mod v2;

use super::error::FetchError;
use super::resource::{Post, User};
use chrono::{DateTime, Utc};
use serde_json::Value;

const LEGACY_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Known response layouts.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// REST v1.1: flat objects, quoted post nested in place
    Legacy,
    /// API v2: primary object plus side-loaded `includes`
    V2,
    /// Session-based GraphQL: `result`/`legacy` wrapped objects
    Scraped,
}

impl Shape {
    /// Normalize a post response body.
    ///
    pub fn post(self, value: Value) -> Result<Post, FetchError> {
        match self {
            Shape::Legacy => legacy::post(value),
            Shape::V2 => v2::post(value),
            Shape::Scraped => scraped::post(value),
        }
    }

    /// Normalize a user response body.
    ///
    pub fn user(self, value: Value) -> Result<User, FetchError> {
        match self {
            Shape::Legacy => legacy::user(value),
            Shape::V2 => v2::user(value),
            Shape::Scraped => scraped::user(value),
        }
    }
}

/// Parse a v1.1-style timestamp such as `Wed Oct 10 20:19:24 +0000 2018`.
///
pub(crate) fn parse_legacy_time(stamp: Option<&str>) -> Result<DateTime<Utc>, FetchError> {
    let stamp = stamp.ok_or_else(|| FetchError::Malformed("missing timestamp".to_string()))?;
    DateTime::parse_from_str(stamp, LEGACY_TIME_FORMAT)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FetchError::Malformed(format!("bad timestamp '{}': {}", stamp, e)))
}

/// Parse an RFC 3339 timestamp such as `2018-10-10T20:19:24.000Z`.
///
pub(crate) fn parse_iso_time(stamp: Option<&str>) -> Result<DateTime<Utc>, FetchError> {
    let stamp = stamp.ok_or_else(|| FetchError::Malformed("missing timestamp".to_string()))?;
    DateTime::parse_from_rfc3339(stamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FetchError::Malformed(format!("bad timestamp '{}': {}", stamp, e)))
}

/// Returns the handle unless upstream sent it blank.
///
pub(crate) fn handle(handle: String, owner: &str) -> Result<String, FetchError> {
    if handle.trim().is_empty() {
        return Err(FetchError::Malformed(format!("{} has an empty handle", owner)));
    }
    Ok(handle)
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
