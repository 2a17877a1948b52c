use url::form_urlencoded;

/// HTTP request methods issued by the crawler.
///
/// Pages are fetched with GET; POST is only used to submit the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a page
    Get,
    /// POST - Submit a form
    Post,
}

impl Method {
    /// Returns the method token as it appears on the request line.
    ///
    /// # Example
    ///
    /// ```
    /// # use fakebook_crawler::http::request::Method;
    /// assert_eq!(Method::Get.as_str(), "GET");
    /// assert_eq!(Method::Post.as_str(), "POST");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An outgoing HTTP/1.1 request.
///
/// Headers are kept in insertion order because the site expects the
/// fixed header block in a stable layout.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// Request target in origin form (e.g. "/fakebook/")
    pub path: String,
    /// HTTP version, always "HTTP/1.1" for this client
    pub version: String,
    /// Ordered header list
    pub headers: Vec<(String, String)>,
    /// Request body, empty for GET
    pub body: Vec<u8>,
}

/// Values shared by every request sent to the site.
#[derive(Debug, Clone)]
pub struct HeaderBlock<'a> {
    pub host: &'a str,
    pub identity: &'a str,
    pub user_agent: &'a str,
    /// Full `Cookie: ...` line, or empty when no session token is known
    pub cookie: &'a str,
}

/// Builder for constructing Request objects.
///
/// Method and target are fixed up front; headers are appended in order.
pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header; repeated names are kept.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Appends a pre-rendered `Name: value` line, skipping it when empty.
    pub fn raw_header(self, line: &str) -> Self {
        match line.split_once(':') {
            Some((key, value)) => self.header(key.trim(), value.trim()),
            None => self,
        }
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            version: "HTTP/1.1".to_string(),
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Request {
    /// Builds a GET with the fixed header block.
    pub fn get(path: &str, block: &HeaderBlock<'_>) -> Request {
        RequestBuilder::new(Method::Get, path)
            .header("Host", block.host)
            .header("Connection", "keep-alive")
            .header("User", block.identity)
            .raw_header(block.cookie)
            .header("User-Agent", block.user_agent)
            .build()
    }

    /// Builds a form POST with the fixed header block.
    ///
    /// `Content-Length` is the byte length of the encoded form.
    pub fn post_form(path: &str, fields: &[(&str, &str)], block: &HeaderBlock<'_>) -> Request {
        let body = encode_form(fields).into_bytes();

        RequestBuilder::new(Method::Post, path)
            .header("Host", block.host)
            .header("Connection", "keep-alive")
            .header("User", block.identity)
            .header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
            .header("Content-Length", body.len().to_string())
            .raw_header(block.cookie)
            .header("User-Agent", block.user_agent)
            .body(body)
            .build()
    }

    /// Retrieves the first header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Encodes fields as `application/x-www-form-urlencoded`, preserving order.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter())
        .finish()
}
