//! CORS headers for the edge handler

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::Response;

const ALLOW_METHODS: &str = "GET,POST,OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type,Authorization";
const MAX_AGE: &str = "86400";

/// CORS headers computed once per request
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
}

impl CorsHeaders {
    /// `*` (or an empty setting) reflects the caller's `Origin`, falling back to
    /// `*` when the request has none; any other setting is sent as-is.
    pub fn for_request(allowed_origin: &str, request_headers: &HeaderMap) -> Self {
        let allowed = allowed_origin.trim();
        let allow_origin = if allowed.is_empty() || allowed == "*" {
            request_headers
                .get("origin")
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static("*"))
        } else {
            HeaderValue::from_str(allowed).unwrap_or_else(|_| HeaderValue::from_static("*"))
        };
        Self { allow_origin }
    }

    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }

    /// Add the CORS headers to `response`
    pub fn apply(&self, mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
        let headers = response.headers_mut();
        headers.insert("access-control-allow-origin", self.allow_origin.clone());
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            "access-control-allow-headers",
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert("access-control-max-age", HeaderValue::from_static(MAX_AGE));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_origin(origin: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(origin) = origin {
            headers.insert("origin", HeaderValue::from_static(origin));
        }
        headers
    }

    #[test]
    fn test_wildcard_reflects_origin() {
        let cors = CorsHeaders::for_request("*", &headers_with_origin(Some("https://guest.example")));
        assert_eq!(cors.allow_origin(), "https://guest.example");

        let cors = CorsHeaders::for_request("  ", &headers_with_origin(Some("https://guest.example")));
        assert_eq!(cors.allow_origin(), "https://guest.example");
    }

    #[test]
    fn test_wildcard_without_origin() {
        let cors = CorsHeaders::for_request("*", &headers_with_origin(None));
        assert_eq!(cors.allow_origin(), "*");
    }

    #[test]
    fn test_fixed_origin_wins() {
        let cors = CorsHeaders::for_request(
            " https://ana-and-minh.example ",
            &headers_with_origin(Some("https://evil.example")),
        );
        assert_eq!(cors.allow_origin(), "https://ana-and-minh.example");
    }

    #[test]
    fn test_apply_sets_all_headers() {
        let cors = CorsHeaders::for_request("*", &headers_with_origin(None));
        let response = cors.apply(Response::new(Full::new(Bytes::new())));
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET,POST,OPTIONS");
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type,Authorization"
        );
        assert_eq!(headers["access-control-max-age"], "86400");
    }
}
