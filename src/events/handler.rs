use super::Event;
use crate::error::AppResult;
use crate::render::{self, RenderError, TimeFormatter};
use crate::transport::{OutboundMessage, Transport};
use crate::twitter::{Post, Target, Twitter};
use log::*;

const PREFIX: &str = "[Twitter] ";
const TRUNCATION: &str = " […]";
const MISSING_TARGET_REPLY: &str = "What user do you want me to look up?";
const RENDER_APOLOGY: &str = "Sorry, I couldn't format that.";

/// Specify struct for answering lookup events.
///
pub struct Handler<'a> {
    twitter: &'a Twitter,
    transport: &'a dyn Transport,
    formatter: &'a dyn TimeFormatter,
    show_quoted_posts: bool,
}

impl<'a> Handler<'a> {
    /// Return new instance over the gateway and output transport.
    ///
    pub fn new(
        twitter: &'a Twitter,
        transport: &'a dyn Transport,
        formatter: &'a dyn TimeFormatter,
        show_quoted_posts: bool,
    ) -> Self {
        Handler {
            twitter,
            transport,
            formatter,
            show_quoted_posts,
        }
    }

    /// Handle lookup events by type.
    ///
    pub async fn handle(&self, event: Event) -> AppResult<()> {
        debug!("Processing event '{:?}'...", event);
        match event {
            Event::PostReference { id } => self.handle_post_reference(&id).await?,
            Event::ProfileReference { handle } => self.handle_profile_reference(&handle).await?,
            Event::MissingLookupTarget => self.say(OutboundMessage::plain(MISSING_TARGET_REPLY))?,
        }
        Ok(())
    }

    /// Post the summary of a post, and of the post it quotes when enabled.
    ///
    pub async fn handle_post_reference(&self, id: &str) -> AppResult<()> {
        let post = match self.twitter.fetch_post(id).await {
            Ok(post) => post,
            Err(e) => {
                e.log(Target::Post, id);
                return self.say(OutboundMessage::plain(e.user_message(Target::Post)));
            }
        };
        info!("Fetched status {} by @{}", post.id, post.author.handle);

        self.output_post("", &post)?;
        if self.show_quoted_posts {
            if let Some(quoted) = &post.quoted {
                self.output_post("Quoting ", quoted)?;
            }
        }
        Ok(())
    }

    /// Post the summary of a user profile.
    ///
    pub async fn handle_profile_reference(&self, handle: &str) -> AppResult<()> {
        let user = match self.twitter.fetch_user(handle).await {
            Ok(user) => user,
            Err(e) => {
                e.log(Target::User, handle);
                return self.say(OutboundMessage::plain(e.user_message(Target::User)));
            }
        };
        info!("Fetched profile @{}", user.handle);

        match render::render_profile(&user, self.formatter) {
            Ok(text) => self.say(
                OutboundMessage::plain(format!("{}{}", PREFIX, text)).with_truncation(TRUNCATION),
            ),
            Err(e) => self.render_failed(e),
        }
    }

    fn output_post(&self, quoting: &str, post: &Post) -> AppResult<()> {
        match render::render_post(post) {
            Ok(text) => self.say(
                OutboundMessage::plain(format!("{}{}{}", PREFIX, quoting, text))
                    .with_truncation(TRUNCATION)
                    .with_trailing(render::summary_trailer(post, self.formatter)),
            ),
            Err(e) => self.render_failed(e),
        }
    }

    fn render_failed(&self, e: RenderError) -> AppResult<()> {
        error!("{}", e);
        if cfg!(debug_assertions) {
            panic!("gateway produced unrenderable data: {}", e);
        }
        self.say(OutboundMessage::plain(RENDER_APOLOGY))
    }

    fn say(&self, message: OutboundMessage) -> AppResult<()> {
        self.transport.post(&message)?;
        Ok(())
    }
}
