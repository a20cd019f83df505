//! YouTube videos, embedded as a fixed-size frame.

use std::sync::LazyLock;

use regex::Regex;
use veil_common::dom::Element;
use veil_common::error::{EmbedError, Result};
use veil_common::provider::ProviderTag;
use veil_common::source::SourceReference;
use veil_oembed::{AspectRatioSource, Dimensions};

use super::{EmbedSession, LoadContext};

// Covers watch, embed, v/, vi/, e/, legacy user uploads, and youtu.be short links.
static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:(?:(?:m|www)\.)?(?:youtube(?:-nocookie)?|youtube\.googleapis)\.com.*(?:v/|v=|vi=|vi/|e/|embed/|user/.*/u/\d+/)|youtu\.be/)(?<id>[_0-9a-z-]+)",
    )
    .unwrap()
});

/// Embed endpoint; the video id is appended
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";
/// Permissions granted to the frame
pub const ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

/// Video id in a YouTube URL
pub fn video_id(url: &str) -> Option<&str> {
    VIDEO_ID_REGEX
        .captures(url)
        .and_then(|caps| caps.name("id"))
        .map(|m| m.as_str())
}

/// Player frame for a video
pub fn frame(video_id: &str, dimensions: &Dimensions) -> Element {
    Element::new("iframe")
        .with_attr("width", dimensions.width.as_str())
        .with_attr("height", dimensions.height.as_str())
        .with_attr("src", format!("{EMBED_BASE}{video_id}"))
        .with_attr("title", "YouTube video player")
        .with_attr("style", "border:0px")
        .with_attr("allow", ALLOW)
        .with_attr("allowfullscreen", "")
}

pub(crate) async fn load<R>(
    ctx: &LoadContext<'_, R>,
    slot: &mut Element,
    reference: &SourceReference,
) -> Result<EmbedSession>
where
    R: AspectRatioSource + Sync,
{
    let id = video_id(&reference.url)
        .ok_or_else(|| EmbedError::invalid_reference(ProviderTag::YouTube, &reference.url))?;
    let dimensions = ctx
        .options
        .dimensions
        .resolve(
            reference.width_override.as_deref(),
            reference.height_override.as_deref(),
            || ctx.metadata.aspect_ratio(id),
        )
        .await;

    slot.append(frame(id, &dimensions));
    Ok(EmbedSession::new(ProviderTag::YouTube)
        .with_content_id(Some(id))
        .with_dimensions(dimensions))
}
