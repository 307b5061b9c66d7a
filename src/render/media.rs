use crate::twitter::MediaItem;

/// Returns the link to show for a media item: the highest-bitrate variant,
/// the last one listed when several share that bitrate, or the static image
/// URL when the item has no variants.
///
pub fn preferred_media_link(item: &MediaItem) -> &str {
    item.variants
        .iter()
        .max_by_key(|v| v.bitrate)
        .map(|v| v.url.as_str())
        .unwrap_or(item.static_url.as_str())
}
