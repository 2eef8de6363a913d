//! HTTP protocol layer module
//!
//! Response builders and content-type detection shared by the local site and
//! the edge handler.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_403_response, build_404_response, build_error_response, build_file_response,
    build_json_response, build_no_content_response,
};
