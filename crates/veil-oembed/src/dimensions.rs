//! Frame dimension resolution.

use std::future::Future;

use bon::Builder;

use crate::oembed::OEmbedError;

/// Frame width used when none can be determined
pub const DEFAULT_WIDTH: &str = "640px";
/// Frame height used when none can be determined
pub const DEFAULT_HEIGHT: &str = "390px";

/// Final frame size, as CSS lengths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions {
    /// Frame width
    pub width: String,
    /// Frame height
    pub height: String,
}

impl Dimensions {
    /// Dimensions from any two string-like values
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// Turns optional author overrides into a complete frame size.
///
/// - both overrides: used verbatim, nothing is fetched
/// - neither: the defaults, nothing is fetched
/// - one: the other is derived from the fetched aspect ratio. If the fetch
///   fails or the given value has no leading number, the missing side takes
///   its default instead.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(start_fn = new)]
pub struct DimensionResolver {
    /// Width used when none is given or derivable
    #[builder(into, default = DEFAULT_WIDTH.to_string())]
    pub default_width: String,
    /// Height used when none is given or derivable
    #[builder(into, default = DEFAULT_HEIGHT.to_string())]
    pub default_height: String,
}

impl Default for DimensionResolver {
    fn default() -> Self {
        Self::new().build()
    }
}

impl DimensionResolver {
    /// The default frame size
    pub fn defaults(&self) -> Dimensions {
        Dimensions::new(&self.default_width, &self.default_height)
    }

    /// Resolve the frame size. `fetch_aspect_ratio` is only awaited when
    /// exactly one override is present.
    pub async fn resolve<F, Fut>(
        &self,
        width: Option<&str>,
        height: Option<&str>,
        fetch_aspect_ratio: F,
    ) -> Dimensions
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<f64, OEmbedError>>,
    {
        match (width, height) {
            (Some(w), Some(h)) => Dimensions::new(w, h),
            (None, None) => self.defaults(),
            (Some(w), None) => {
                let ratio = fetch_aspect_ratio().await;
                let height = derive(w, ratio, |w, r| w / r)
                    .unwrap_or_else(|| self.default_height.clone());
                Dimensions::new(w, height)
            }
            (None, Some(h)) => {
                let ratio = fetch_aspect_ratio().await;
                let width = derive(h, ratio, |h, r| h * r)
                    .unwrap_or_else(|| self.default_width.clone());
                Dimensions::new(width, h)
            }
        }
    }
}

fn derive(
    given: &str,
    ratio: Result<f64, OEmbedError>,
    op: impl FnOnce(f64, f64) -> f64,
) -> Option<String> {
    let ratio = match ratio {
        Ok(r) if r.is_finite() && r > 0.0 => r,
        Ok(_r) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(ratio = _r, "unusable aspect ratio, using default dimensions");
            return None;
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "aspect ratio lookup failed, using default dimensions");
            return None;
        }
    };
    let given = leading_number(given)?;
    Some(format_px(op(given, ratio)))
}

/// Leading integer of a CSS length (`"520px"` → `520`), like `parseInt`.
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<f64>().ok().map(|n| sign * n)
}

/// Pixel length with at most four decimals and no trailing zeros.
pub fn format_px(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{rounded}px")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    async fn ok_ratio(r: f64) -> Result<f64, OEmbedError> {
        Ok(r)
    }

    async fn failed() -> Result<f64, OEmbedError> {
        Err(OEmbedError::HttpStatus(http::StatusCode::INTERNAL_SERVER_ERROR))
    }

    #[tokio::test]
    async fn derives_height_from_width() {
        let dims = DimensionResolver::default()
            .resolve(Some("520px"), None, || ok_ratio(16.0 / 9.0))
            .await;
        assert_eq!(dims, Dimensions::new("520px", "292.5px"));
    }

    #[tokio::test]
    async fn derives_width_from_height() {
        let dims = DimensionResolver::default()
            .resolve(None, Some("360px"), || ok_ratio(16.0 / 9.0))
            .await;
        assert_eq!(dims, Dimensions::new("640px", "360px"));
    }

    #[tokio::test]
    async fn both_overrides_skip_fetch() {
        let called = Cell::new(false);
        let dims = DimensionResolver::default()
            .resolve(Some("100%"), Some("20em"), || {
                called.set(true);
                ok_ratio(1.0)
            })
            .await;
        assert_eq!(dims, Dimensions::new("100%", "20em"));
        assert!(!called.get());
    }

    #[tokio::test]
    async fn no_overrides_skip_fetch_even_if_it_would_fail() {
        let called = Cell::new(false);
        let dims = DimensionResolver::default()
            .resolve(None, None, || {
                called.set(true);
                failed()
            })
            .await;
        assert_eq!(dims, Dimensions::new("640px", "390px"));
        assert!(!called.get());
    }

    #[tokio::test]
    async fn failed_fetch_defaults_missing_side() {
        let resolver = DimensionResolver::default();
        let dims = resolver.resolve(Some("520px"), None, failed).await;
        assert_eq!(dims, Dimensions::new("520px", "390px"));
        let dims = resolver.resolve(None, Some("200px"), failed).await;
        assert_eq!(dims, Dimensions::new("640px", "200px"));
    }

    #[tokio::test]
    async fn non_numeric_override_defaults_missing_side() {
        let dims = DimensionResolver::default()
            .resolve(Some("auto"), None, || ok_ratio(2.0))
            .await;
        assert_eq!(dims, Dimensions::new("auto", "390px"));
    }

    #[tokio::test]
    async fn custom_defaults() {
        let resolver = DimensionResolver::new()
            .default_width("560px")
            .default_height("315px")
            .build();
        let dims = resolver.resolve(None, None, failed).await;
        assert_eq!(dims, Dimensions::new("560px", "315px"));
    }

    #[test]
    fn parse_int_semantics() {
        assert_eq!(leading_number("520px"), Some(520.0));
        assert_eq!(leading_number("  42"), Some(42.0));
        assert_eq!(leading_number("12.9em"), Some(12.0));
        assert_eq!(leading_number("-3px"), Some(-3.0));
        assert_eq!(leading_number("px"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn px_formatting() {
        assert_eq!(format_px(292.50000000000006), "292.5px");
        assert_eq!(format_px(360.0), "360px");
        assert_eq!(format_px(1.0 / 3.0), "0.3333px");
    }
}
