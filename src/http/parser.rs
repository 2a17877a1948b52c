use crate::http::response::Response;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidStatusLine,
    InvalidHeader,
    InvalidContentLength,
    InvalidChunk,
    Incomplete,
}

enum BodyFraming {
    Chunked,
    Length(usize),
    UntilClose,
}

/// Frames one HTTP response from the front of `buf`.
///
/// Returns the response and the number of bytes it occupied. Body length is
/// taken from chunked encoding, then `Content-Length`; responses that carry
/// neither are delimited by connection close, so they only complete once
/// `eof` is set.
pub fn parse_http_response(buf: &[u8], eof: bool) -> Result<(Response, usize), ParseError> {
    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_start = headers_end + 4;

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidStatusLine)?;

    let mut lines = headers_str.split("\r\n");

    // Status line
    let status_line = lines.next().ok_or(ParseError::InvalidStatusLine)?;
    let mut parts = status_line.splitn(3, ' ');

    let version = parts.next().ok_or(ParseError::InvalidStatusLine)?;
    if !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidStatusLine);
    }
    let status = parts
        .next()
        .filter(|code| code.len() == 3)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(ParseError::InvalidStatusLine)?;
    let reason = parts.next().unwrap_or("");

    // Headers
    let mut headers = Vec::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

        headers.push((key.trim().to_string(), value.trim().to_string()));
    }

    let mut response = Response {
        status,
        reason: reason.to_string(),
        version: version.to_string(),
        headers,
        body: Vec::new(),
    };

    // Body
    let (body, consumed) = match body_framing(&response)? {
        BodyFraming::Chunked => decode_chunked(&buf[body_start..])?,
        BodyFraming::Length(len) => {
            if buf.len() - body_start < len {
                return Err(ParseError::Incomplete);
            }
            (buf[body_start..body_start + len].to_vec(), len)
        }
        BodyFraming::UntilClose => {
            if !eof {
                return Err(ParseError::Incomplete);
            }
            let rest = buf[body_start..].to_vec();
            let len = rest.len();
            (rest, len)
        }
    };

    response.body = body;
    Ok((response, body_start + consumed))
}

fn body_framing(resp: &Response) -> Result<BodyFraming, ParseError> {
    if resp
        .header("Transfer-Encoding")
        .is_some_and(|te| te.to_ascii_lowercase().contains("chunked"))
    {
        return Ok(BodyFraming::Chunked);
    }

    if let Some(cl) = resp.header("Content-Length") {
        let len = cl
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;
        return Ok(BodyFraming::Length(len));
    }

    // 1xx, 204 and 304 never carry a body
    if (100..200).contains(&resp.status) || resp.status == 204 || resp.status == 304 {
        return Ok(BodyFraming::Length(0));
    }

    Ok(BodyFraming::UntilClose)
}

/// Decodes a chunked body, returning the payload and bytes consumed
/// (including the terminating chunk and any trailers).
fn decode_chunked(buf: &[u8]) -> Result<(Vec<u8>, usize), ParseError> {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let line_end = find_crlf(&buf[pos..]).ok_or(ParseError::Incomplete)?;
        let size_line =
            std::str::from_utf8(&buf[pos..pos + line_end]).map_err(|_| ParseError::InvalidChunk)?;
        // Chunk extensions follow ';'
        let size_str = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_str, 16).map_err(|_| ParseError::InvalidChunk)?;
        pos += line_end + 2;

        if size == 0 {
            break;
        }

        let data_end = pos.checked_add(size).ok_or(ParseError::InvalidChunk)?;
        let chunk_end = data_end.checked_add(2).ok_or(ParseError::InvalidChunk)?;

        if buf.len() < chunk_end {
            return Err(ParseError::Incomplete);
        }
        body.extend_from_slice(&buf[pos..data_end]);

        if &buf[data_end..chunk_end] != b"\r\n" {
            return Err(ParseError::InvalidChunk);
        }
        pos = chunk_end;
    }

    // Trailer section ends with an empty line
    loop {
        let line_end = find_crlf(&buf[pos..]).ok_or(ParseError::Incomplete)?;
        pos += line_end + 2;
        if line_end == 0 {
            break;
        }
    }

    Ok((body, pos))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
