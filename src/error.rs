//! Error types for the crawler.

use std::io;

/// Result type alias using [`CrawlError`].
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Errors raised while talking to the site or driving the crawl.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Initial TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Re-establishing the connection failed or produced a dead socket.
    #[error("failed to reconnect to {addr}: {reason}")]
    Reconnect { addr: String, reason: String },

    /// Socket read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The server closed the connection before a full response arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The response could not be framed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The login form could not be fetched.
    #[error("login page returned {status}")]
    LoginPage { status: String },

    /// The credential POST did not redirect.
    #[error("login rejected: expected 302, got {status}")]
    LoginRejected { status: String },

    /// Invalid settings or extraction patterns.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CrawlError {
    /// Whether the failure only concerns the current exchange.
    ///
    /// Transient errors are recovered by reconnecting and retrying the path;
    /// everything else aborts the crawl.
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::ConnectionClosed | CrawlError::MalformedResponse(_) => true,
            CrawlError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::WriteZero
            ),
            _ => false,
        }
    }
}

impl From<regex::Error> for CrawlError {
    fn from(e: regex::Error) -> Self {
        CrawlError::Config(e.to_string())
    }
}

impl From<url::ParseError> for CrawlError {
    fn from(e: url::ParseError) -> Self {
        CrawlError::Config(e.to_string())
    }
}
