use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{CrawlError, Result};
use crate::http::parser::{ParseError, parse_http_response};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::RequestWriter;

/// Default buffer size for reads
const BUFFER_SIZE: usize = 8192;

/// Largest header section accepted before giving up on a response
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Largest whole response buffered unless overridden
const DEFAULT_MAX_RESPONSE: usize = 8 * 1024 * 1024;

/// The single keep-alive connection to the site.
pub struct Connection {
    addr: String,
    stream: TcpStream,
    buffer: BytesMut,
    closed: bool,
    max_response: usize,
}

impl Connection {
    /// Opens a TCP connection to `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| CrawlError::Connect {
                addr: addr.clone(),
                source,
            })?;

        tracing::debug!(addr = %addr, "Connected");

        Ok(Self {
            addr,
            stream,
            buffer: BytesMut::with_capacity(BUFFER_SIZE),
            closed: false,
            max_response: DEFAULT_MAX_RESPONSE,
        })
    }

    /// Caps the bytes one response may occupy, head and body together.
    pub fn with_response_limit(mut self, limit: usize) -> Self {
        self.max_response = limit;
        self
    }

    /// Drops the current socket and connects again to the same address.
    ///
    /// Any bytes buffered from the old socket are discarded.
    pub async fn reconnect(&mut self) -> Result<()> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| CrawlError::Reconnect {
                addr: self.addr.clone(),
                reason: e.to_string(),
            })?;

        // A socket without a peer is already closed
        stream.peer_addr().map_err(|e| CrawlError::Reconnect {
            addr: self.addr.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(addr = %self.addr, "Reconnected");

        self.stream = stream;
        self.buffer.clear();
        self.closed = false;
        Ok(())
    }

    /// Writes a request and reads exactly one response.
    ///
    /// If the previous response ended the connection, a new one is opened
    /// first.
    pub async fn send(&mut self, request: &Request) -> Result<Response> {
        if self.closed {
            self.reconnect().await?;
        }

        let mut writer = RequestWriter::new(request);
        writer.write_to_stream(&mut self.stream).await?;

        tracing::trace!(method = request.method.as_str(), path = %request.path, "Request sent");

        self.read_response().await
    }

    /// Reads until one full response is framed.
    ///
    /// Bytes past the end of the response stay buffered for the next call.
    pub async fn read_response(&mut self) -> Result<Response> {
        let mut eof = false;

        loop {
            // Try parsing whatever we already have
            match parse_http_response(&self.buffer, eof) {
                Ok((response, consumed)) => {
                    self.buffer.advance(consumed);
                    self.closed = eof || response.closes_connection();
                    return Ok(response);
                }

                Err(ParseError::Incomplete) => {
                    if eof {
                        self.closed = true;
                        return Err(CrawlError::ConnectionClosed);
                    }
                }

                Err(e) => {
                    self.buffer.clear();
                    return Err(CrawlError::MalformedResponse(format!("{:?}", e)));
                }
            }

            if self.buffer.len() > MAX_HEAD_SIZE && !has_head(&self.buffer) {
                self.buffer.clear();
                self.closed = true;
                return Err(CrawlError::MalformedResponse(
                    "response headers too large".to_string(),
                ));
            }

            // The rest of an oversized body is still in flight, so the
            // stream can't be reused
            if self.buffer.len() > self.max_response {
                self.buffer.clear();
                self.closed = true;
                return Err(CrawlError::MalformedResponse(format!(
                    "response exceeds {} bytes",
                    self.max_response
                )));
            }

            // Read more data
            self.buffer.reserve(BUFFER_SIZE);
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    self.closed = true;
                    return Err(CrawlError::ConnectionClosed);
                }
                // Let a close-delimited body complete
                eof = true;
            }
        }
    }

    /// Closes the write half, signalling the end of the session.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

fn has_head(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n")
}
