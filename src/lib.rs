pub mod config;
pub mod content;
pub mod content_cache;
pub mod error;
pub mod logger;
pub mod paginator;
pub mod post;
pub mod post_processor;
pub mod post_store;
pub mod query_string;
pub mod server;
pub mod text_utils;
pub mod util;
pub mod view;
mod test_data;
