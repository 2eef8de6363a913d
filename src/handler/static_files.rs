//! Static file serving module
//!
//! Maps request paths onto files under the site root. Paths that would climb
//! out of the root are refused with 403; anything that is not a readable
//! regular file is a 404.

use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

const INDEX_FILE: &str = "index.html";

/// Outcome of mapping a request path onto the site root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    /// Candidate file, relative to the root
    Inside(PathBuf),
    /// The path escapes the root
    Outside,
}

/// Normalize a request path lexically against the site root
///
/// The path is percent-decoded and split on both `/` and `\`. `.` segments
/// vanish and `..` removes the previous segment; a `..` with nothing left to
/// remove escapes the root. `/` resolves to `index.html`.
pub fn resolve_path(request_path: &str) -> ResolvedPath {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    if decoded.contains('\0') {
        return ResolvedPath::Outside;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(&['/', '\\'][..]) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return ResolvedPath::Outside;
                }
            }
            s if !is_plain_segment(s) => return ResolvedPath::Outside,
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return ResolvedPath::Inside(PathBuf::from(INDEX_FILE));
    }
    ResolvedPath::Inside(segments.into_iter().collect())
}

/// A segment that joins as a single relative name
///
/// Drive prefixes such as `C:` parse as a prefix component on Windows and
/// would make the join absolute; elsewhere they are ordinary names.
fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Serve the file addressed by `request_path` from `root`
pub async fn serve(root: &Path, request_path: &str) -> Response<Full<Bytes>> {
    let relative = match resolve_path(request_path) {
        ResolvedPath::Inside(p) => p,
        ResolvedPath::Outside => {
            logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
            return http::build_403_response();
        }
    };

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Site root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return http::build_404_response();
        }
    };

    // File not found is common (404), no need to log at warning level
    let Ok(file_path) = fs::canonicalize(root_canonical.join(&relative)).await else {
        return http::build_404_response();
    };

    // Symlinks may still point outside the root
    if !file_path.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            file_path.display()
        ));
        return http::build_403_response();
    }

    match fs::metadata(&file_path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return http::build_404_response(),
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return http::build_404_response();
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    http::build_file_response(content, content_type)
}
