//! HTTP client plumbing

mod error;
mod http;

pub use error::{error_from_status, ErrorBody};
pub use http::ApiClient;
