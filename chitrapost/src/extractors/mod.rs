//! Request extractors
//!
//! Both reject with [`crate::error::ApiError`], so malformed bodies get the
//! same `{"error": ...}` shape as every other failure.

mod file_upload;
mod json;

pub use file_upload::FILE_FIELD;
pub use json::JsonBody;
