//! Edge function
//!
//! Stateless handler for deployments without a local disk. Collections live
//! in a remote repository; each request builds its own [`RemoteStore`] so no
//! collection data outlives the request. Every response carries CORS headers.

pub mod cors;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::config::EdgeConfig;
use crate::handler::collections::{self, ApiOptions, MissingFieldsMessage};
use crate::http;
use crate::logger;
use crate::store::RemoteStore;
use cors::CorsHeaders;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_ERROR: &str = "Unexpected error";

pub struct EdgeFunction {
    config: Arc<EdgeConfig>,
    client: reqwest::Client,
    max_body_size: usize,
}

impl EdgeFunction {
    /// Fails when the repository settings are incomplete or the HTTP client
    /// cannot be built.
    pub fn new(config: EdgeConfig, max_body_size: usize) -> Result<Self, String> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            config: Arc::new(config),
            client,
            max_body_size,
        })
    }

    /// Handle one request end to end
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let cors = CorsHeaders::for_request(&self.config.allowed_origin, req.headers());

        if req.method() == Method::OPTIONS {
            return cors.apply(http::build_no_content_response());
        }

        let Some(route) = collections::match_route(req.method(), req.uri().path(), true) else {
            return cors.apply(http::build_error_response(
                StatusCode::NOT_FOUND,
                "Not found",
            ));
        };

        let store = RemoteStore::new(self.client.clone(), Arc::clone(&self.config));
        let options = ApiOptions {
            max_body_size: self.max_body_size,
            missing_fields: MissingFieldsMessage::Detailed,
        };

        let response = match collections::dispatch(route, req, &store, options).await {
            Ok(response) => response,
            Err(e) => {
                logger::log_error(&format!("Edge request failed: {e}"));
                let message = e.to_string();
                let message = if message.is_empty() {
                    FALLBACK_ERROR
                } else {
                    message.as_str()
                };
                http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        cors.apply(response)
    }
}
