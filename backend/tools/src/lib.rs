pub mod format;
pub mod web;

pub use format::{format_size, get_url, runtime, to_lower, to_upper};
pub use web::{fetch_buffer, fetch_json, get_mime, get_size, FetchOptions, FetchedBuffer, WebError};
