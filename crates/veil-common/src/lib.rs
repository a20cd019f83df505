//! # Common types for veil
//!
//! Shared building blocks for consent-gated embeds: the provider tags and
//! the rules that map a reference URL onto one, the resolved notice
//! configuration, a minimal HTML element tree, and the HTTP client
//! abstraction used for metadata lookups.
//!
//! ## Resolving a reference
//!
//! ```
//! use veil_common::provider::ProviderTag;
//! use veil_common::source::{SourceReference, resolve_source_type};
//!
//! let tag = resolve_source_type("https://youtu.be/abc123XYZ_-", None)?;
//! assert_eq!(tag, ProviderTag::YouTube);
//!
//! let reference = SourceReference::new()
//!     .url("https://example.social/@user/42/")
//!     .explicit_type("Mastodon")
//!     .build();
//! assert_eq!(reference.provider()?, ProviderTag::Mastodon);
//! # Ok::<(), veil_common::error::EmbedError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dom;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod source;

pub use smol_str;
pub use url;

pub use config::{ResolvedConfig, ShowMode};
pub use dom::{Element, Node};
pub use error::{EmbedError, Result};
pub use provider::ProviderTag;
pub use source::{SourceReference, resolve_source_type};
