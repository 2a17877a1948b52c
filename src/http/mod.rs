//! HTTP/1.1 client plumbing over a raw TCP stream.
//!
//! # Architecture
//!
//! - **`request`**: request representation and the fixed header block
//! - **`writer`**: serializes and writes requests to the socket
//! - **`parser`**: frames responses by chunked encoding, `Content-Length`
//!   or connection close
//! - **`response`**: framed response with header lookup
//! - **`connection`**: the single keep-alive connection and its reconnect
//! - **`client`**: `HttpClient` and the `Transport` trait the crawl uses
//!
//! # Exchange
//!
//! ```text
//!   Request ──► RequestWriter ──► socket ──► BytesMut ──► parse_http_response
//!                                                │ Incomplete → read more
//!                                                └ Ok → Response (+ leftover kept)
//! ```

pub mod client;
pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
