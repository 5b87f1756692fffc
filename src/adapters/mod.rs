// Adapters layer: concrete sources for responses (http, files)

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::{api_get_request, ApiClient, HttpSource};
