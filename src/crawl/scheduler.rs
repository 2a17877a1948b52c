//! Login handshake and breadth-first crawl loop.

use crate::config::{Config, RetryPolicy};
use crate::cookie::CookieJar;
use crate::crawl::extract::Extractor;
use crate::crawl::session::CrawlSession;
use crate::error::{CrawlError, Result};
use crate::http::client::Transport;

/// What the scheduler does with a fetched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Fetch again before anything else; not marked visited
    Retry,
    /// Follow the `Location` header
    Redirect,
    /// Drop the path
    Abandon,
    /// Harvest cookies, flags and links from the body
    Process,
}

/// Maps a status code to the scheduler's reaction.
///
/// # Example
///
/// ```
/// # use fakebook_crawler::crawl::scheduler::{classify, Disposition};
/// assert_eq!(classify(Some(500)), Disposition::Retry);
/// assert_eq!(classify(None), Disposition::Retry);
/// assert_eq!(classify(Some(301)), Disposition::Redirect);
/// assert_eq!(classify(Some(404)), Disposition::Abandon);
/// assert_eq!(classify(Some(200)), Disposition::Process);
/// ```
pub fn classify(status: Option<u16>) -> Disposition {
    match status {
        None | Some(500) => Disposition::Retry,
        Some(301) => Disposition::Redirect,
        Some(403) | Some(404) => Disposition::Abandon,
        Some(_) => Disposition::Process,
    }
}

/// Outcome of a finished crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub flags: Vec<String>,
    pub pages_visited: usize,
    /// Fetches repeated because of a 500 or unreadable response
    pub retries: u32,
    /// Paths dropped on 403/404 or after exhausting their retries
    pub abandoned: Vec<String>,
}

/// Drives the login handshake and the crawl over one transport.
pub struct Crawler<T, E> {
    transport: T,
    extractor: E,
    login_path: String,
    root_path: String,
    retry: RetryPolicy,
}

impl<T: Transport, E: Extractor> Crawler<T, E> {
    pub fn new(transport: T, extractor: E, config: &Config) -> Self {
        Self {
            transport,
            extractor,
            login_path: config.site.login_path.clone(),
            root_path: config.site.root_path.clone(),
            retry: config.crawl.retry.clone(),
        }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Fetches the login form and submits the credentials.
    ///
    /// The form GET is retried once; the POST must answer 302.
    pub async fn login(
        &mut self,
        session: &mut CrawlSession,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let login_path = self.login_path.clone();

        let (mut status, mut text) = self.fetch(&login_path, &mut session.cookies).await?;
        if status != Some(200) {
            tracing::warn!(
                path = %login_path,
                status = ?status,
                "Login page unavailable, retrying once"
            );

            (status, text) = self.fetch(&login_path, &mut session.cookies).await?;
            if status != Some(200) {
                return Err(CrawlError::LoginPage {
                    status: describe(status),
                });
            }
        }

        self.harvest(&text, session);

        let csrf = session.cookies.csrf_token().unwrap_or_default().to_string();
        if csrf.is_empty() {
            tracing::warn!("No CSRF token issued before login");
        }

        let fields = [
            ("username", username),
            ("password", password),
            ("csrfmiddlewaretoken", csrf.as_str()),
            ("next", ""),
        ];
        let response = self
            .transport
            .post_form(&login_path, &fields, &mut session.cookies)
            .await?;
        let text = response.text();

        let status = self.extractor.status_code(&text);
        if status != Some(302) {
            return Err(CrawlError::LoginRejected {
                status: describe(status),
            });
        }

        self.harvest(&text, session);

        tracing::info!(
            session = session.cookies.session_id().is_some(),
            "Logged in"
        );
        Ok(())
    }

    /// Crawls breadth-first from the root path.
    ///
    /// Stops when the frontier is exhausted or the flag store is complete.
    pub async fn run(&mut self, session: &mut CrawlSession) -> Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();

        session.enqueue(self.root_path.clone());

        while !session.is_finished() {
            let Some(path) = session.frontier.pop_front() else {
                break;
            };

            // Stale duplicate entry
            if session.is_visited(&path) {
                continue;
            }

            let attempt = session.record_attempt(&path);
            let (status, text) = self.fetch(&path, &mut session.cookies).await?;
            let disposition = classify(status);

            tracing::debug!(
                path = %path,
                status = ?status,
                attempt = attempt,
                disposition = ?disposition,
                "Fetched"
            );

            if disposition == Disposition::Retry {
                if !self.retry.allows(attempt) {
                    tracing::warn!(
                        path = %path,
                        attempts = attempt,
                        "Retry limit reached, abandoning path"
                    );
                    session.mark_visited(&path);
                    summary.abandoned.push(path);
                    continue;
                }

                summary.retries += 1;
                let backoff = self.retry.backoff();
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
                session.requeue_front(path);
                continue;
            }

            session.mark_visited(&path);

            match disposition {
                Disposition::Redirect => {
                    for target in self.extractor.redirect_targets(&text) {
                        tracing::debug!(from = %path, to = %target, "Redirected");
                        session.enqueue(target);
                    }
                }
                Disposition::Abandon => {
                    summary.abandoned.push(path);
                }
                Disposition::Process => self.harvest(&text, session),
                Disposition::Retry => {}
            }
        }

        summary.pages_visited = session.visited.len();
        summary.flags = session.flags.iter().map(str::to_string).collect();

        tracing::info!(
            flags = summary.flags.len(),
            pages = summary.pages_visited,
            retries = summary.retries,
            abandoned = summary.abandoned.len(),
            "Crawl finished"
        );

        Ok(summary)
    }

    /// GETs a path and reads its status code.
    ///
    /// A transient failure or missing status line replaces the connection
    /// and reports no status; fatal errors propagate.
    async fn fetch(&mut self, path: &str, cookies: &mut CookieJar) -> Result<(Option<u16>, String)> {
        let text = match self.transport.get(path, cookies).await {
            Ok(response) => response.text(),
            Err(e) if e.is_transient() => {
                tracing::warn!(path = %path, error = %e, "Exchange failed, reconnecting");
                self.transport.reconnect().await?;
                return Ok((None, String::new()));
            }
            Err(e) => return Err(e),
        };

        let status = self.extractor.status_code(&text);
        if status.is_none() {
            tracing::warn!(path = %path, "No status line in response, reconnecting");
            self.transport.reconnect().await?;
        }

        Ok((status, text))
    }

    /// Applies cookies, flags and links found in a response.
    fn harvest(&self, text: &str, session: &mut CrawlSession) {
        for cookie in self.extractor.cookies(text) {
            session.cookies.apply(cookie);
        }

        for flag in self.extractor.flags(text) {
            if session.flags.insert(flag.clone()) {
                tracing::info!(
                    flag = %flag,
                    found = session.flags.len(),
                    target = session.flags.target(),
                    "Flag found"
                );
            }
        }

        for link in self.extractor.links(text) {
            session.enqueue(link);
        }
    }
}

fn describe(status: Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "no status line".to_string())
}
