//! Request issuing on top of the single site connection.

use crate::config::SiteConfig;
use crate::cookie::CookieJar;
use crate::error::Result;
use crate::http::connection::Connection;
use crate::http::request::{HeaderBlock, Request};
use crate::http::response::Response;

/// The exchange operations the crawl needs from the HTTP layer.
///
/// Every request consults the cookie jar, so the jar is passed in rather
/// than owned.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&mut self, path: &str, jar: &mut CookieJar) -> Result<Response>;

    async fn post_form(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
        jar: &mut CookieJar,
    ) -> Result<Response>;

    /// Replaces the underlying connection after a broken exchange.
    async fn reconnect(&mut self) -> Result<()>;
}

/// HTTP/1.1 client bound to one site.
pub struct HttpClient {
    connection: Connection,
    site: SiteConfig,
}

impl HttpClient {
    /// Connects to the configured host and port.
    pub async fn connect(site: SiteConfig) -> Result<Self> {
        let connection = Connection::connect(&site.host, site.port)
            .await?
            .with_response_limit(site.max_response_bytes);
        Ok(Self { connection, site })
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.connection.shutdown().await
    }

    fn header_block<'a>(&'a self, cookie: &'a str) -> HeaderBlock<'a> {
        HeaderBlock {
            host: &self.site.host,
            identity: &self.site.identity,
            user_agent: &self.site.user_agent,
            cookie,
        }
    }
}

impl Transport for HttpClient {
    async fn get(&mut self, path: &str, jar: &mut CookieJar) -> Result<Response> {
        let request = Request::get(path, &self.header_block(jar.build_header()));
        let response = self.connection.send(&request).await?;

        tracing::debug!(path = %path, status = response.status, "GET");
        Ok(response)
    }

    async fn post_form(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
        jar: &mut CookieJar,
    ) -> Result<Response> {
        let request = Request::post_form(path, fields, &self.header_block(jar.build_header()));
        let response = self.connection.send(&request).await?;

        tracing::debug!(path = %path, status = response.status, "POST");
        Ok(response)
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.connection.reconnect().await
    }
}
