//! Outbound chat surface.
//!
//! A message is primary text plus an optional truncation marker and an
//! optional trailing segment. When the line is too long only the primary
//! text is shortened; the trailing segment always survives intact.

use crate::utils::text_processing::truncate_to_boundary;
use log::*;
use std::io::{self, Write};
use std::sync::Mutex;

/// One line to send to the channel.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub truncation: Option<String>,
    pub trailing: Option<String>,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        OutboundMessage {
            text: text.into(),
            truncation: None,
            trailing: None,
        }
    }

    pub fn with_truncation(mut self, marker: &str) -> Self {
        self.truncation = Some(marker.to_owned());
        self
    }

    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = Some(trailing.into());
        self
    }

    /// Compose the final line within `max_bytes`, shortening only the
    /// primary text and marking the cut with the truncation marker.
    ///
    pub fn fit(&self, max_bytes: usize) -> String {
        let trailing = self.trailing.as_deref().unwrap_or("");
        if self.text.len() + trailing.len() <= max_bytes {
            return format!("{}{}", self.text, trailing);
        }

        let marker = self.truncation.as_deref().unwrap_or("");
        let budget = max_bytes
            .saturating_sub(trailing.len())
            .saturating_sub(marker.len());
        let text = truncate_to_boundary(&self.text, budget).trim_end();
        trace!(
            "Truncated outbound text from {} to {} bytes",
            self.text.len(),
            text.len()
        );
        format!("{}{}{}", text, marker, trailing)
    }
}

/// Delivers lines to the chat.
///
pub trait Transport: Send + Sync {
    fn post(&self, message: &OutboundMessage) -> io::Result<()>;
}

/// Writes each fitted line to stdout.
///
pub struct StdoutTransport {
    max_line_length: usize,
}

impl StdoutTransport {
    pub fn new(max_line_length: usize) -> Self {
        StdoutTransport { max_line_length }
    }
}

impl Transport for StdoutTransport {
    fn post(&self, message: &OutboundMessage) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", message.fit(self.max_line_length))?;
        out.flush()
    }
}

/// Keeps every fitted line in memory.
///
pub struct RecordingTransport {
    max_line_length: usize,
    lines: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new(max_line_length: usize) -> Self {
        RecordingTransport {
            max_line_length,
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Transport for RecordingTransport {
    fn post(&self, message: &OutboundMessage) -> io::Result<()> {
        let line = message.fit(self.max_line_length);
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_untouched() {
        let message = OutboundMessage::plain("[Twitter] Ann (@ann99): hi")
            .with_truncation(" […]")
            .with_trailing(" | 1 RTs");
        assert_eq!(message.fit(400), "[Twitter] Ann (@ann99): hi | 1 RTs");
    }

    #[test]
    fn test_trailing_survives_truncation() {
        let message = OutboundMessage::plain("aaaa bbbb cccc dddd")
            .with_truncation(" […]")
            .with_trailing(" | end");
        let line = message.fit(20);
        assert!(line.len() <= 20);
        assert!(line.ends_with(" […] | end"));
        assert!(line.starts_with("aaaa"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let message = OutboundMessage::plain("🌍🌍🌍🌍").with_truncation("…");
        // 16 bytes of globes, 3 for the marker, leaves 7: one globe fits
        assert_eq!(message.fit(10), "🌍…");
    }

    #[test]
    fn test_trailing_longer_than_limit() {
        let message = OutboundMessage::plain("text").with_trailing(" | a long trailer");
        assert_eq!(message.fit(5), " | a long trailer");
    }

    #[test]
    fn test_recording_transport_fits_lines() {
        let transport = RecordingTransport::new(12);
        transport
            .post(&OutboundMessage::plain("hello world, again").with_truncation("..."))
            .unwrap();
        assert_eq!(transport.lines(), vec!["hello wor...".to_string()]);
    }
}
