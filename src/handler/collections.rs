//! Collection endpoints
//!
//! Routing and request handling for the guestbook API, shared by the local
//! site and the edge handler. Storage failures are returned to the caller,
//! which decides how to report them.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};

use super::body::{self, BodyError};
use crate::collection::Collection;
use crate::http;
use crate::logger;
use crate::store::{CollectionStore, StoreResult};

/// A request addressed to one of the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionRoute {
    List(Collection),
    Create(Collection),
}

/// How much a 400 for missing fields says
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFieldsMessage {
    /// `Missing required fields`
    Terse,
    /// `Missing required fields: name, content`
    Detailed,
}

impl MissingFieldsMessage {
    fn render(self, collection: Collection) -> String {
        match self {
            Self::Terse => "Missing required fields".to_string(),
            Self::Detailed => format!(
                "Missing required fields: {}",
                collection.required_fields().join(", ")
            ),
        }
    }
}

/// Per-deployment knobs for the collection endpoints
#[derive(Debug, Clone, Copy)]
pub struct ApiOptions {
    pub max_body_size: usize,
    pub missing_fields: MissingFieldsMessage,
}

/// Match method and path against the collection routes
///
/// `json_aliases` also serves `GET /wishes.json` and `GET /rsvp.json` as lists.
pub fn match_route(method: &Method, path: &str, json_aliases: bool) -> Option<CollectionRoute> {
    let collection = match path {
        "/api/wishes" => Collection::Wishes,
        "/api/rsvp" => Collection::Rsvp,
        "/wishes.json" if json_aliases && method == Method::GET => {
            return Some(CollectionRoute::List(Collection::Wishes))
        }
        "/rsvp.json" if json_aliases && method == Method::GET => {
            return Some(CollectionRoute::List(Collection::Rsvp))
        }
        _ => return None,
    };

    match *method {
        Method::GET => Some(CollectionRoute::List(collection)),
        Method::POST => Some(CollectionRoute::Create(collection)),
        _ => None,
    }
}

/// Run a matched collection route against `store`
pub async fn dispatch<B>(
    route: CollectionRoute,
    req: Request<B>,
    store: &dyn CollectionStore,
    options: ApiOptions,
) -> StoreResult<Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match route {
        CollectionRoute::List(collection) => list_records(store, collection).await,
        CollectionRoute::Create(collection) => {
            create_record(req, store, collection, options).await
        }
    }
}

/// `GET` a collection: the full array
pub async fn list_records(
    store: &dyn CollectionStore,
    collection: Collection,
) -> StoreResult<Response<Full<Bytes>>> {
    let snapshot = store.read_collection(collection).await?;
    Ok(http::build_json_response(StatusCode::OK, &snapshot.records))
}

/// `POST` a record: validate, append, echo it back with 201
pub async fn create_record<B>(
    req: Request<B>,
    store: &dyn CollectionStore,
    collection: Collection,
    options: ApiOptions,
) -> StoreResult<Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let payload = match body::read_json_body(req, options.max_body_size).await {
        Ok(payload) => payload,
        Err(e) => {
            if matches!(e, BodyError::TooLarge) {
                logger::log_warning(&format!("Rejected oversized {collection} submission"));
            }
            return Ok(http::build_error_response(
                StatusCode::BAD_REQUEST,
                &e.to_string(),
            ));
        }
    };

    let missing = collection.missing_fields(&payload);
    if !missing.is_empty() {
        logger::log_debug(&format!(
            "Rejected {collection} submission missing {}",
            missing.join(", ")
        ));
        return Ok(http::build_error_response(
            StatusCode::BAD_REQUEST,
            &options.missing_fields.render(collection),
        ));
    }

    store.append_record(collection, payload.clone()).await?;
    logger::log_info(&format!(
        "Appended {collection} record via {} store",
        store.backend_name()
    ));
    Ok(http::build_json_response(StatusCode::CREATED, &payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_routes() {
        assert_eq!(
            match_route(&Method::GET, "/api/wishes", false),
            Some(CollectionRoute::List(Collection::Wishes))
        );
        assert_eq!(
            match_route(&Method::POST, "/api/rsvp", false),
            Some(CollectionRoute::Create(Collection::Rsvp))
        );
        assert_eq!(match_route(&Method::PUT, "/api/rsvp", true), None);
        assert_eq!(match_route(&Method::GET, "/api/wishes/", false), None);
    }

    #[test]
    fn test_json_aliases_are_read_only() {
        assert_eq!(match_route(&Method::GET, "/wishes.json", false), None);
        assert_eq!(
            match_route(&Method::GET, "/wishes.json", true),
            Some(CollectionRoute::List(Collection::Wishes))
        );
        assert_eq!(
            match_route(&Method::GET, "/rsvp.json", true),
            Some(CollectionRoute::List(Collection::Rsvp))
        );
        assert_eq!(match_route(&Method::POST, "/rsvp.json", true), None);
    }

    #[test]
    fn test_missing_fields_messages() {
        assert_eq!(
            MissingFieldsMessage::Terse.render(Collection::Rsvp),
            "Missing required fields"
        );
        assert_eq!(
            MissingFieldsMessage::Detailed.render(Collection::Wishes),
            "Missing required fields: name, content"
        );
        assert_eq!(
            MissingFieldsMessage::Detailed.render(Collection::Rsvp),
            "Missing required fields: name, attendance"
        );
    }
}
