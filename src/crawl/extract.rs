//! Pattern extraction over response text.
//!
//! The scheduler only sees the [`Extractor`] trait, so the regex-based
//! implementation here can be swapped for a structured HTML parser.

use regex::Regex;
use url::Url;

use crate::cookie::SessionCookie;
use crate::error::Result;

/// Pulls crawl-relevant values out of a rendered response.
pub trait Extractor {
    /// Status code from the first status line, if any.
    fn status_code(&self, text: &str) -> Option<u16>;

    /// Token assignments from every `Set-Cookie` line.
    fn cookies(&self, text: &str) -> Vec<SessionCookie>;

    /// Every flag marker in the body.
    fn flags(&self, text: &str) -> Vec<String>;

    /// Link targets under the internal prefix, in document order.
    fn links(&self, text: &str) -> Vec<String>;

    /// Internal paths named by `Location` headers.
    fn redirect_targets(&self, text: &str) -> Vec<String>;
}

pub struct RegexExtractor {
    base: Url,
    status: Regex,
    set_cookie: Regex,
    csrf_token: Regex,
    session_id: Regex,
    flag: Regex,
    link: Regex,
    location: Regex,
}

impl RegexExtractor {
    /// Compiles the patterns for a site host and internal link prefix.
    pub fn new(host: &str, link_prefix: &str) -> Result<Self> {
        let base = Url::parse(&format!("http://{}/", host))?;

        Ok(Self {
            base,
            status: Regex::new(r"HTTP/\d(?:\.\d)? (\d{3})")?,
            set_cookie: Regex::new(r"(?im)^set-cookie:\s*([^\r\n]*)")?,
            csrf_token: Regex::new(r"csrftoken\s*=([^\r\n;()]*)")?,
            session_id: Regex::new(r"sessionid\s*=([^\r\n;()]*)")?,
            flag: Regex::new(
                r#"<h2 class='secret_flag' style="color:red">FLAG: ([[:alnum:]]{64})</h2>"#,
            )?,
            link: Regex::new(&format!(
                r#"<a\s+href="({}[^"]*)"[^>]*>"#,
                regex::escape(link_prefix)
            ))?,
            location: Regex::new(r"(?im)^location:\s*([^\r\n]+)")?,
        })
    }

    /// Reduces a `Location` value to an on-site path (with query).
    fn internal_path(&self, location: &str) -> Option<String> {
        let target = self.base.join(location.trim()).ok()?;

        if target.scheme() != self.base.scheme() || target.host_str() != self.base.host_str() {
            return None;
        }

        let mut path = target.path().to_string();
        if let Some(query) = target.query() {
            path.push('?');
            path.push_str(query);
        }
        Some(path)
    }
}

impl Extractor for RegexExtractor {
    fn status_code(&self, text: &str) -> Option<u16> {
        self.status
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
    }

    fn cookies(&self, text: &str) -> Vec<SessionCookie> {
        let mut found = Vec::new();

        for caps in self.set_cookie.captures_iter(text) {
            let line = &caps[1];

            if let Some(token) = self.csrf_token.captures(line) {
                found.push(SessionCookie::CsrfToken(token[1].to_string()));
            }
            if let Some(id) = self.session_id.captures(line) {
                found.push(SessionCookie::SessionId(id[1].to_string()));
            }
        }

        found
    }

    fn flags(&self, text: &str) -> Vec<String> {
        self.flag
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    fn links(&self, text: &str) -> Vec<String> {
        self.link
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    fn redirect_targets(&self, text: &str) -> Vec<String> {
        self.location
            .captures_iter(text)
            .filter_map(|caps| self.internal_path(&caps[1]))
            .collect()
    }
}
