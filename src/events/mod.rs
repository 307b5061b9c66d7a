//! Event handling module.
//!
//! This module contains the inbound side of the bot:
//! - Message parsing: links and commands that trigger a lookup
//! - Handler: fetch, render, and post the result

pub mod handler;
pub mod message;

pub use handler::Handler;
pub use message::TriggerMatcher;

/// Specify the lookups a chat message can trigger.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PostReference { id: String },
    ProfileReference { handle: String },
    MissingLookupTarget, // Lookup command given without a handle
}
