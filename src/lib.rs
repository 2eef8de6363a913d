//! Wedding site backend
//!
//! Static site server with two append-only guestbook collections (wishes and
//! RSVPs). Collections are stored either in local JSON files or, in edge
//! mode, as files in a remote repository.

pub mod collection;
pub mod config;
pub mod edge;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
