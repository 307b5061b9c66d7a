//! Link previews for Twitter posts and profiles in chat.
//!
//! Messages are matched for post and profile links, the referenced content
//! is fetched from one of the supported upstream APIs, and a one-line
//! summary is handed to the chat transport.

pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod render;
pub mod transport;
pub mod twitter;
pub mod utils;

pub use error::{AppError, AppResult};
