//! Minimal HTTP client abstraction for metadata lookups.
//!
//! Embeds only ever issue plain unauthenticated GETs, so the trait is kept to
//! a single raw request/response call that is easy to mock in tests.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use url::Url;

use crate::error::TransportError;

/// `User-Agent` sent with metadata requests
pub const USER_AGENT: &str = concat!("veil/", env!("CARGO_PKG_VERSION"));

/// HTTP client trait for sending raw HTTP requests.
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait HttpClient {
    /// Error type returned by the HTTP client
    type Error: std::error::Error + Display + Send + Sync + 'static;

    /// Send an HTTP request and return the response.
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>>;
}

/// Build a bodiless GET request asking for JSON.
pub fn json_get(url: &Url) -> Result<http::Request<Vec<u8>>, TransportError> {
    let request = http::Request::get(url.as_str())
        .header(http::header::ACCEPT, "application/json")
        .header(http::header::USER_AGENT, USER_AGENT)
        .body(Vec::new())?;
    Ok(request)
}

#[cfg(feature = "reqwest-client")]
impl HttpClient for reqwest::Client {
    type Error = reqwest::Error;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> core::result::Result<http::Response<Vec<u8>>, Self::Error> {
        let (parts, body) = request.into_parts();

        let mut req = self.request(parts.method, parts.uri.to_string()).body(body);
        for (name, value) in parts.headers.iter() {
            req = req.header(name.as_str(), value.as_bytes());
        }

        let resp = req.send().await?;

        let mut builder = http::Response::builder().status(resp.status());
        for (name, value) in resp.headers().iter() {
            builder = builder.header(name.as_str(), value.as_bytes());
        }

        let body = resp.bytes().await?.to_vec();

        // status and headers were copied from a valid response
        Ok(builder.body(body).expect("Failed to build response"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<T: HttpClient + Sync> HttpClient for Arc<T> {
    type Error = T::Error;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>> + Send
    {
        self.as_ref().send_http(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_get_sets_headers() {
        let url = Url::parse("https://www.youtube.com/oembed?format=json").unwrap();
        let req = json_get(&url).unwrap();
        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(req.uri(), "https://www.youtube.com/oembed?format=json");
        assert_eq!(
            req.headers().get(http::header::ACCEPT).unwrap(),
            "application/json"
        );
        assert!(
            req.headers()
                .get(http::header::USER_AGENT)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("veil/")
        );
        assert!(req.body().is_empty());
    }
}
