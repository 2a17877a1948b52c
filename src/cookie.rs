//! Session cookie tracking.
//!
//! The site issues two tokens: a CSRF token needed to submit the login form
//! and a session id that keeps later requests authenticated. The jar keeps
//! the latest value of each and a pre-rendered `Cookie:` header line that is
//! only rebuilt after a token changes.

/// A token assignment found in a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCookie {
    CsrfToken(String),
    SessionId(String),
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    csrf_token: Option<String>,
    session_id: Option<String>,
    dirty: bool,
    header: String,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// True when a token changed since the header was last built.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.csrf_token = Some(token.into());
        self.dirty = true;
    }

    pub fn set_session_id(&mut self, id: impl Into<String>) {
        self.session_id = Some(id.into());
        self.dirty = true;
    }

    pub fn apply(&mut self, cookie: SessionCookie) {
        match cookie {
            SessionCookie::CsrfToken(token) => self.set_csrf_token(token),
            SessionCookie::SessionId(id) => self.set_session_id(id),
        }
    }

    /// Returns the `Cookie:` header line for the next request.
    ///
    /// The line is rebuilt only when the jar is dirty; otherwise the previous
    /// line is returned unchanged. Empty when no token is known.
    pub fn build_header(&mut self) -> &str {
        if !self.dirty {
            return &self.header;
        }

        self.header = match (&self.csrf_token, &self.session_id) {
            (Some(csrf), Some(session)) => {
                format!("Cookie: csrftoken={}; sessionid={}", csrf, session)
            }
            (Some(csrf), None) => format!("Cookie: csrftoken={}", csrf),
            (None, Some(session)) => format!("Cookie: sessionid={}", session),
            (None, None) => String::new(),
        };
        self.dirty = false;

        &self.header
    }

    /// The most recently built header line, without rebuilding.
    pub fn header(&self) -> &str {
        &self.header
    }
}
