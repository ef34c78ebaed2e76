pub mod error;
pub mod config;
pub mod links;
pub mod models {
    pub mod tokens;
    pub mod document;
    pub mod listing;
    pub mod report;
}
pub mod api {
    pub mod client;
    pub mod envelope;
    pub mod requests;
    pub mod http;
    pub mod memory;
}
pub mod access;
pub mod lifecycle;
pub mod listing;
pub mod bookmarks {
    pub mod backend;
    pub mod store;
}

pub use access::{AccessController, Opened};
pub use api::client::TextbinApi;
pub use api::http::HttpTextbinApi;
pub use api::memory::MemoryTextbinApi;
pub use bookmarks::store::{Bookmark, BookmarkStore};
pub use config::ClientConfig;
pub use error::TextbinError;
pub use lifecycle::DocumentLifecycle;
pub use listing::ListingEngine;
