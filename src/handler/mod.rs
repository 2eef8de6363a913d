//! Request handler module
//!
//! Request routing and the site's business logic: the guestbook collection
//! endpoints and static file serving.

pub mod body;
pub mod collections;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_local, handle_request, LocalSite};
