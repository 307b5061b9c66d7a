use super::Event;
use crate::config::ConfigError;
use log::*;
use regex::Regex;

const DOMAIN_PATTERN: &str = r"https?://(?:m(?:obile)?\.)?(?:twitter|x)\.com/";
const STATUS_PATH: &str = r"(?:\w+|i/web)/status/(?P<status>\d+)";
const USER_PATH: &str = r"(?P<user>\w+)/?(?:\?.*)?$";
const URL_PATTERN: &str = r"https?://[^\s<>\]\)]+";
const LOOKUP_COMMAND: &str = ".twitinfo";

/// Turns chat messages into lookup events: post and profile links on the
/// platform's domains (and any configured mirrors), plus the lookup
/// command.
///
pub struct TriggerMatcher {
    url: Regex,
    status: Vec<Regex>,
    user: Vec<Regex>,
}

fn compile(domain: &str, prefix: &str, path: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^{}{}", prefix, path)).map_err(|e| ConfigError::InvalidPattern {
        domain: domain.to_owned(),
        message: e.to_string(),
    })
}

impl TriggerMatcher {
    pub fn new(alternate_domains: &[String]) -> Result<Self, ConfigError> {
        let mut prefixes = vec![("twitter.com".to_string(), DOMAIN_PATTERN.to_string())];
        for domain in alternate_domains.iter().map(|d| d.trim()).filter(|d| !d.is_empty()) {
            prefixes.push((
                domain.to_owned(),
                format!(r"https?://{}/", regex::escape(domain)),
            ));
        }

        let mut status = Vec::with_capacity(prefixes.len());
        let mut user = Vec::with_capacity(prefixes.len());
        for (domain, prefix) in &prefixes {
            status.push(compile(domain, prefix, STATUS_PATH)?);
            user.push(compile(domain, prefix, USER_PATH)?);
        }
        let url = Regex::new(URL_PATTERN).map_err(|e| ConfigError::InvalidPattern {
            domain: "any".to_owned(),
            message: e.to_string(),
        })?;

        debug!("Watching links for {} domains", prefixes.len());
        Ok(TriggerMatcher { url, status, user })
    }

    /// Returns the event for a single URL, trying post links before
    /// profile links.
    ///
    pub fn match_url(&self, url: &str) -> Option<Event> {
        for re in &self.status {
            if let Some(id) = re.captures(url).and_then(|c| c.name("status")) {
                return Some(Event::PostReference {
                    id: id.as_str().to_owned(),
                });
            }
        }
        for re in &self.user {
            if let Some(handle) = re.captures(url).and_then(|c| c.name("user")) {
                return Some(Event::ProfileReference {
                    handle: handle.as_str().to_owned(),
                });
            }
        }
        None
    }

    /// Returns every event triggered by a chat message, in message order.
    ///
    pub fn parse(&self, message: &str) -> Vec<Event> {
        let mut words = message.split_whitespace();
        if words.next() == Some(LOOKUP_COMMAND) {
            return match words.next() {
                Some(handle) => vec![Event::ProfileReference {
                    handle: handle.to_owned(),
                }],
                None => vec![Event::MissingLookupTarget],
            };
        }

        self.url
            .find_iter(message)
            .filter_map(|m| self.match_url(m.as_str()))
            .collect()
    }
}
