//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Local requests go to the
//! collection endpoints or fall through to static files; edge requests are
//! handed to the edge function.

use crate::config::{AppState, Config, Site};
use crate::handler::collections::{self, ApiOptions, MissingFieldsMessage};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::store::LocalStore;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Static site root plus its file-backed collections
pub struct LocalSite {
    root_dir: PathBuf,
    store: LocalStore,
    max_body_size: usize,
}

impl LocalSite {
    pub const fn new(root_dir: PathBuf, store: LocalStore, max_body_size: usize) -> Self {
        Self {
            root_dir,
            store,
            max_body_size,
        }
    }

    /// Collection files live in the site root
    pub fn from_config(config: &Config) -> Self {
        let root_dir = config.root_dir();
        let store = LocalStore::in_dir(&root_dir, &config.storage);
        Self::new(root_dir, store, config.storage.max_body_size)
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let access_log = state.cached_access_log.load(Ordering::Relaxed);
    let mut entry = access_log.then(|| AccessLogEntry::start(&req, peer_addr));

    let response = match &state.site {
        Site::Local(site) => handle_local(req, site).await,
        Site::Edge(edge) => edge.handle(req).await,
    };

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Serve one request against the local site
pub async fn handle_local<B>(req: Request<B>, site: &LocalSite) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();

    if let Some(route) = collections::match_route(req.method(), &path, false) {
        let options = ApiOptions {
            max_body_size: site.max_body_size,
            missing_fields: MissingFieldsMessage::Terse,
        };
        return match collections::dispatch(route, req, &site.store, options).await {
            Ok(response) => response,
            Err(e) => {
                logger::log_error(&format!("{} {path} failed: {e}", route_method(&route)));
                http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        };
    }

    static_files::serve(&site.root_dir, &path).await
}

const fn route_method(route: &collections::CollectionRoute) -> &'static str {
    match route {
        collections::CollectionRoute::List(_) => "GET",
        collections::CollectionRoute::Create(_) => "POST",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    fn site(dir: &std::path::Path) -> LocalSite {
        LocalSite::new(
            dir.to_path_buf(),
            LocalStore::new(dir.join("wishes.json"), dir.join("rsvp.json")),
            64,
        )
    }

    async fn json_body(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_api_takes_precedence_over_static() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("api")).unwrap();
        std::fs::write(dir.path().join("api").join("wishes"), "shadowed").unwrap();
        let site = site(dir.path());

        let req = Request::get("/api/wishes").body(Full::new(Bytes::new())).unwrap();
        let response = handle_local(req, &site).await;
        assert_eq!(response.status(), 200);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_oversized_post_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());

        let body = json!({"name": "Ana", "attendance": "yes", "note": "x".repeat(100)});
        let req = Request::post("/api/rsvp")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let response = handle_local(req, &site).await;
        assert_eq!(response.status(), 400);
        assert_eq!(json_body(response).await, json!({"error": "Payload too large"}));
    }

    #[tokio::test]
    async fn test_storage_failure_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let site = LocalSite::new(
            dir.path().to_path_buf(),
            LocalStore::new(
                dir.path().join("missing-dir").join("wishes.json"),
                dir.path().join("rsvp.json"),
            ),
            1024,
        );

        let req = Request::get("/api/wishes").body(Full::new(Bytes::new())).unwrap();
        let response = handle_local(req, &site).await;
        assert_eq!(response.status(), 500);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_api_method_falls_through_to_static() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());

        let req = Request::delete("/api/wishes").body(Full::new(Bytes::new())).unwrap();
        let response = handle_local(req, &site).await;
        assert_eq!(response.status(), 404);
    }
}
