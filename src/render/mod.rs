//! Turns normalized posts and profiles into single chat lines.
//!
//! Nothing here performs I/O. Body text is rewritten through a [`Splice`]
//! so every short link is replaced at most once, against the original text.

mod media;
mod splice;
mod time;

pub use media::preferred_media_link;
pub use splice::Splice;
pub use time::{StrftimeFormatter, TimeFormatter, DEFAULT_TIME_FORMAT};

use crate::twitter::{Entity, Post, User};
use crate::utils::text_processing::{flatten_lines, format_count, last_path_segment};
use log::*;
use thiserror::Error;

const VERIFIED_GLYPH: &str = " \u{2714}\u{FE0F}";
const PROTECTED_GLYPH: &str = " \u{1F512}";

/// Defines errors raised while rendering. These only occur when the gateway
/// hands over data missing a required field.
///
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid post data: {0}")]
    InvalidPostData(String),
}

/// Replace every entity's short link with its expanded destination.
///
pub fn expand_links(text: &str, entities: &[Entity]) -> String {
    let mut splice = Splice::new(text);
    for entity in entities {
        splice.replace_all(&entity.short_url, &entity.expanded_url);
    }
    splice.apply()
}

/// Returns the index of the entity linking to the quoted post, if any.
///
fn quoted_link(post: &Post) -> Option<usize> {
    let quoted = post.quoted.as_ref()?;
    post.entities
        .iter()
        .position(|e| last_path_segment(&e.expanded_url) == quoted.id)
}

/// Render a post as `"{name} (@{handle}): {text}"` with short links
/// expanded, media links inlined, and the link to a quoted post removed.
///
pub fn render_post(post: &Post) -> Result<String, RenderError> {
    if post.author.handle.is_empty() {
        return Err(RenderError::InvalidPostData(format!(
            "post {} has no author handle",
            post.id
        )));
    }

    let text = flatten_lines(post.display_body());
    let mut splice = Splice::new(&text);

    let quoted = quoted_link(post);
    if let Some(index) = quoted {
        let short_url = &post.entities[index].short_url;
        if splice.remove_links(short_url) == 0 {
            debug!("Quoted link {} not present in post {}", short_url, post.id);
        }
    }

    // Media first: the placeholder may also be listed as a plain link
    let mut handled = vec![false; post.entities.len()];
    for (index, entity) in post.entities.iter().enumerate() {
        if Some(index) == quoted {
            handled[index] = true;
            continue;
        }
        let item = match entity.media_key.as_deref().and_then(|k| post.media_item(k)) {
            Some(item) => item,
            None => continue,
        };
        let placeholder = if item.placeholder_key.is_empty() {
            entity.short_url.as_str()
        } else {
            item.placeholder_key.as_str()
        };
        let link = preferred_media_link(item);
        if !splice.replace_first(placeholder, link) {
            splice.append(link);
        }
        handled[index] = true;
    }

    for (index, entity) in post.entities.iter().enumerate() {
        if !handled[index] {
            splice.replace_all(&entity.short_url, &entity.expanded_url);
        }
    }

    let text = splice.apply();
    Ok(format!(
        "{} (@{}): {}",
        post.author.name,
        post.author.handle,
        html_escape::decode_html_entities(&text)
    ))
}

/// Returns the protected trailing segment carrying a post's counters and
/// timestamp.
///
pub fn summary_trailer(post: &Post, formatter: &dyn TimeFormatter) -> String {
    format!(
        " | {} RTs | {} \u{2665}s | Posted: {}",
        post.metrics.reposts,
        post.metrics.likes,
        formatter.format_time(&post.created_at)
    )
}

/// Render a post followed by its counters and posting time.
///
pub fn render_summary_line(post: &Post, formatter: &dyn TimeFormatter) -> Result<String, RenderError> {
    Ok(format!("{}{}", render_post(post)?, summary_trailer(post, formatter)))
}

/// Render a profile as its name, handle and badges followed by location,
/// site, counts, join date and bio. Empty optional segments are skipped.
///
pub fn render_profile(user: &User, formatter: &dyn TimeFormatter) -> Result<String, RenderError> {
    if user.handle.is_empty() {
        return Err(RenderError::InvalidPostData(format!(
            "user {:?} has no handle",
            user.name
        )));
    }

    let mut line = format!("{} (@{})", user.name, user.handle);
    if user.verified {
        line.push_str(VERIFIED_GLYPH);
    }
    if user.protected {
        line.push_str(PROTECTED_GLYPH);
    }
    for segment in [&user.location, &user.url].into_iter().flatten() {
        if !segment.is_empty() {
            line.push_str(" | ");
            line.push_str(segment);
        }
    }

    line.push_str(&format!(
        " | {} friends, {} followers | {} tweets, {} \u{2665}s | Joined: {}",
        format_count(user.counts.following),
        format_count(user.counts.followers),
        format_count(user.counts.posts),
        format_count(user.counts.likes),
        formatter.format_time(&user.joined)
    ));

    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        let bio = expand_links(&flatten_lines(bio.trim()), &user.bio_entities);
        line.push_str(" | ");
        line.push_str(&html_escape::decode_html_entities(&bio));
    }
    Ok(line)
}
