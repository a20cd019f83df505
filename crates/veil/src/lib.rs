//! # veil
//!
//! Privacy-first embeds for third-party content. A [`ConsentWidget`] shows a
//! notice in place of a tweet, video, or Mastodon post and only materializes
//! the embed (frames, provider scripts, metadata lookups) after the reader
//! flips its toggle. Flipping it back discards everything the embed created.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use veil::{ConsentState, ConsentWidget, Page};
//! use veil::common::{ResolvedConfig, SourceReference};
//! use veil::oembed::OEmbedClient;
//!
//! # async fn example() -> miette::Result<()> {
//! let page = Arc::new(Page::default());
//! let reference = SourceReference::from_attributes([
//!     ("src", "https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
//!     ("yt-width", "520px"),
//! ])?;
//! let mut widget = ConsentWidget::new(
//!     page.clone(),
//!     ResolvedConfig::default(),
//!     reference,
//!     OEmbedClient::new(reqwest::Client::new()),
//! )
//! .await?;
//!
//! // Nothing has been requested from YouTube yet.
//! println!("{}", widget.to_html());
//!
//! assert_eq!(widget.set_consent(true).await, ConsentState::Expanded);
//! println!("{}", widget.to_html());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`widget`]: the consent state machine and notice rendering
//! - [`providers`]: per-provider embed construction
//! - [`page`]: page-global resources (head nodes, provider scripts)
//! - [`styles`]: the one-time stylesheet injection capability

#![warn(missing_docs)]

pub mod page;
pub mod providers;
pub mod styles;
pub mod widget;

pub use veil_common as common;
pub use veil_oembed as oembed;

pub use page::{Page, ScriptStatus};
pub use providers::{EmbedSession, ProviderOptions};
pub use styles::GlobalStyles;
pub use widget::{ConsentState, ConsentWidget};
