//! Twitter API-specific error types.

use log::*;
use reqwest::StatusCode;
use serde_json::Value;

/// What a failed lookup was for; selects the wording of the chat reply.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Post,
    User,
}

/// Errors that can occur while fetching a post or profile.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FetchError {
    /// Post or user does not exist or was deleted
    #[error("Not found")]
    NotFound,

    /// Content exists but the bot may not see it
    #[error("Content is protected")]
    Protected,

    /// Endpoint needs a login that has not been established
    #[error("Authentication required")]
    AuthRequired,

    /// Stored credentials were rejected
    #[error("Authentication failed")]
    AuthFailed,

    /// Upstream asked us to back off
    #[error("Rate limit reached")]
    RateLimited,

    /// Response did not have the expected structure
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Transport-level failure or timeout
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// Structured error payload not covered above
    #[error("Upstream error: {}", .0.as_deref().unwrap_or("(unknown description)"))]
    UpstreamError(Option<String>),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Unreachable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

impl FetchError {
    /// Classify an `errors` array from a v1.1, v2, or GraphQL payload.
    /// Returns `None` when the payload carries no errors.
    ///
    pub fn from_payload(payload: &Value) -> Option<FetchError> {
        let first = payload.get("errors")?.as_array()?.first()?;

        if let Some(code) = first.get("code").and_then(Value::as_i64) {
            match code {
                8 | 34 | 50 | 63 | 144 => return Some(FetchError::NotFound),
                179 => return Some(FetchError::Protected),
                32 | 89 | 99 => return Some(FetchError::AuthFailed),
                215 | 220 => return Some(FetchError::AuthRequired),
                88 => return Some(FetchError::RateLimited),
                _ => {}
            }
        }

        // v2 problem documents are identified by a type URI
        if let Some(kind) = first.get("type").and_then(Value::as_str) {
            if kind.ends_with("resource-not-found") {
                return Some(FetchError::NotFound);
            }
            if kind.ends_with("not-authorized-for-resource") {
                return Some(FetchError::Protected);
            }
        }

        let message = ["message", "detail"]
            .iter()
            .find_map(|field| first.get(*field).and_then(Value::as_str))
            .map(str::to_owned);
        Some(FetchError::UpstreamError(message))
    }

    /// Map a non-success HTTP status (and its body, if it parsed) to an error.
    ///
    pub fn from_status(status: StatusCode, payload: Option<&Value>) -> FetchError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchError::RateLimited;
        }
        if let Some(error) = payload.and_then(FetchError::from_payload) {
            if !matches!(error, FetchError::UpstreamError(_)) {
                return error;
            }
        }
        match status {
            StatusCode::UNAUTHORIZED => FetchError::AuthFailed,
            StatusCode::FORBIDDEN => FetchError::Protected,
            StatusCode::NOT_FOUND => FetchError::NotFound,
            _ => payload
                .and_then(FetchError::from_payload)
                .unwrap_or(FetchError::UpstreamError(None)),
        }
    }

    /// Returns the single chat line shown to users for this error.
    ///
    pub fn user_message(&self, target: Target) -> String {
        match (self, target) {
            (FetchError::NotFound, Target::Post) => {
                "Couldn't fetch that tweet. It's probably private, 18+ flagged, or deleted.".into()
            }
            (FetchError::NotFound, Target::User) => "User not found.".into(),
            (FetchError::Protected, Target::Post) => "Tweet is protected.".into(),
            (FetchError::Protected, Target::User) => "User profile is protected.".into(),
            (FetchError::AuthRequired, _) => "That content requires authentication; sorry!".into(),
            (FetchError::AuthFailed, _) => {
                "Can't authenticate with Twitter. Please ask my owner to check my credentials."
                    .into()
            }
            (FetchError::RateLimited, _) => "Rate limit reached. Please try again later.".into(),
            (FetchError::Malformed(_), _) | (FetchError::Unreachable(_), _) => {
                "Can't access Twitter data. Please try again later.".into()
            }
            (FetchError::UpstreamError(Some(message)), _) => {
                let mut msg = format!("Twitter returned an error: {}", message);
                // some texts end with a period, but not all
                if !msg.ends_with('.') {
                    msg.push('.');
                }
                msg
            }
            (FetchError::UpstreamError(None), Target::Post) => {
                "Twitter returned an error. :( Maybe the tweet was deleted?".into()
            }
            (FetchError::UpstreamError(None), Target::User) => {
                "Twitter returned an error. :( Maybe that user doesn't exist?".into()
            }
        }
    }

    /// Emit the operator diagnostic record for a failed lookup.
    ///
    pub fn log(&self, target: Target, identifier: &str) {
        let kind = match target {
            Target::Post => "status ID",
            Target::User => "screen name",
        };
        match self {
            FetchError::NotFound | FetchError::Protected | FetchError::RateLimited => {
                warn!("Lookup for {} {} failed: {}", kind, identifier, self)
            }
            FetchError::AuthRequired => {
                warn!("Lookup for {} {} needs a login: {}", kind, identifier, self)
            }
            _ => error!("Lookup for {} {} failed: {}", kind, identifier, self),
        }
    }
}
