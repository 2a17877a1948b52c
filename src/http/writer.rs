use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::request::{Method, Request};

/// Serializes a request into wire bytes.
///
/// Form bodies are followed by a trailing CRLF; servers skip empty lines
/// ahead of the next request line on a persistent connection.
pub fn serialize_request(req: &Request) -> Vec<u8> {
    let mut buf = Vec::new();

    // Request line
    let request_line = format!("{} {} {}\r\n", req.method.as_str(), req.path, req.version);
    buf.extend_from_slice(request_line.as_bytes());

    // Headers
    for (k, v) in &req.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    if req.method == Method::Post {
        buf.extend_from_slice(&req.body);
        buf.extend_from_slice(b"\r\n");
    }

    buf
}

pub struct RequestWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl RequestWriter {
    pub fn new(request: &Request) -> Self {
        Self {
            buffer: serialize_request(request),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        stream.flush().await
    }
}
