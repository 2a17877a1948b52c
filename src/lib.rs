//! Fakebook crawler
//!
//! Logs into a single site over a hand-rolled HTTP/1.1 client and crawls its
//! internal links breadth-first, collecting secret flags.

pub mod config;
pub mod cookie;
pub mod crawl;
pub mod error;
pub mod http;

pub use error::{CrawlError, Result};
