//! Crawl state and scheduling.
//!
//! - **`session`**: the explicit per-crawl context (frontier, visited set,
//!   flags, cookies)
//! - **`flags`**: deduplicating flag store with a completion target
//! - **`extract`**: pattern extraction behind the `Extractor` trait
//! - **`scheduler`**: login handshake and the breadth-first loop
//!
//! # Path lifecycle
//!
//! ```text
//!   enqueued ──► fetching ──┬─ no status / 500 ──► retry (front of frontier)
//!                           ├─ 301 ──────────────► redirected (Location enqueued)
//!                           ├─ 403 / 404 ────────► abandoned
//!                           └─ other ────────────► processed (cookies, flags, links)
//! ```

pub mod extract;
pub mod flags;
pub mod scheduler;
pub mod session;

pub use extract::{Extractor, RegexExtractor};
pub use flags::FlagStore;
pub use scheduler::{CrawlSummary, Crawler, Disposition, classify};
pub use session::CrawlSession;
