//! HTTP acquisition: fetching mirror pages and reading their listings.

pub mod http_client;
pub mod listing;

pub use http_client::HttpClient;
pub use listing::{anchor_hrefs, directory_names, list_directories, list_hrefs};
