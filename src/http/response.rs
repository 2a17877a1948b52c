/// A framed HTTP response received from the site.
///
/// Contains the status line, headers in arrival order, and the decoded body.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Numeric status code from the status line
    pub status: u16,
    /// Reason phrase, possibly empty
    pub reason: String,
    /// HTTP version from the status line (e.g. "HTTP/1.1")
    pub version: String,
    /// Headers as (name, value) pairs; repeated names such as
    /// `Set-Cookie` appear once per line
    pub headers: Vec<(String, String)>,
    /// Response body with any chunked encoding removed
    pub body: Vec<u8>,
}

impl Response {
    /// Retrieves the first value of a header (case-insensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use fakebook_crawler::http::response::Response;
    /// let resp = Response {
    ///     headers: vec![("Location".into(), "/fakebook/".into())],
    ///     ..Default::default()
    /// };
    /// assert_eq!(resp.header("location"), Some("/fakebook/"));
    /// ```
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Retrieves every value of a repeated header.
    pub fn header_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the server asked to close the connection after this response.
    pub fn closes_connection(&self) -> bool {
        match self.header("Connection") {
            Some(v) => v.eq_ignore_ascii_case("close"),
            None => self.version == "HTTP/1.0",
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Renders the whole message as text for pattern extraction.
    ///
    /// The status line and headers are CRLF-terminated as on the wire,
    /// followed by a blank line and the body.
    pub fn text(&self) -> String {
        let mut out = String::new();

        out.push_str(&self.version);
        out.push(' ');
        out.push_str(&self.status.to_string());
        out.push(' ');
        out.push_str(&self.reason);
        out.push_str("\r\n");

        for (k, v) in &self.headers {
            out.push_str(k);
            out.push_str(": ");
            out.push_str(v);
            out.push_str("\r\n");
        }

        out.push_str("\r\n");
        out.push_str(&self.body_text());
        out
    }
}
