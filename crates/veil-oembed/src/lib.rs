//! oEmbed lookups and frame sizing for veil
//!
//! Fixed-size video frames need a width and a height. Authors may give both,
//! one, or neither; when exactly one is given the other is derived from the
//! video's aspect ratio, which is looked up from the provider's public oEmbed
//! endpoint.
//!
//! ## Quick start
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use veil_oembed::{AspectRatioSource, DimensionResolver, OEmbedClient};
//!
//! let client = OEmbedClient::new(reqwest::Client::new());
//! let resolver = DimensionResolver::default();
//!
//! let dims = resolver
//!     .resolve(Some("520px"), None, || client.aspect_ratio("dQw4w9WgXcQ"))
//!     .await;
//! println!("{} x {}", dims.width, dims.height);
//! # Ok(())
//! # }
//! ```
//!
//! Lookup failures never surface from [`DimensionResolver::resolve`]: the
//! missing dimension falls back to its default and the failure is logged.

#![warn(missing_docs)]

pub mod dimensions;
pub mod oembed;

pub use dimensions::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DimensionResolver, Dimensions};
pub use oembed::{AspectRatioSource, OEmbedClient, OEmbedError, OEmbedOptions, OEmbedResponse};
