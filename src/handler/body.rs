//! Request body reading
//!
//! Collects a request body under a size cap and parses it as JSON.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::Request;
use serde_json::Value;
use thiserror::Error;

/// Why a request body could not be turned into a JSON payload
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("Payload too large")]
    TooLarge,

    #[error("Failed to read request body: {0}")]
    Read(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Read the whole body as JSON, rejecting anything over `max_body_size` bytes
///
/// An empty body reads as `{}`.
pub async fn read_json_body<B>(req: Request<B>, max_body_size: usize) -> Result<Value, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if declared_length(&req).is_some_and(|len| len > max_body_size as u64) {
        return Err(BodyError::TooLarge);
    }

    let collected = Limited::new(req.into_body(), max_body_size)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                BodyError::TooLarge
            } else {
                BodyError::Read(e.to_string())
            }
        })?;

    let bytes = collected.to_bytes();
    if bytes.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Content-Length header value, when present and numeric
fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    req.headers()
        .get("content-length")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
