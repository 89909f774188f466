//! Page fetching over HTTP.
//!
//! The lookup service only needs `GET url -> body`; the trait keeps the
//! transport swappable (tests use an in-memory fetcher). Retries and
//! connection pooling are left to the HTTP client.

use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::{
    config::HttpConfig,
    errors::{DocLookupConfigError, DocLookupFetchError},
};

/// Downloads documentation pages as UTF-8 text.
pub trait PageFetcher: Send + Sync {
    /// Performs a single GET against `url`.
    ///
    /// Anything but `200 OK` is a failure; no retries are attempted.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, DocLookupFetchError>> + Send;
}

/// `reqwest`-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http: Client,
}

impl HttpPageFetcher {
    /// Builds a fetcher with the configured timeout and user agent.
    pub fn new(cfg: &HttpConfig) -> Result<Self, DocLookupConfigError> {
        debug!(
            "Initializing page fetcher: timeout_secs={}, user_agent={}",
            cfg.timeout_secs, cfg.user_agent
        );

        let http = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    /// Wraps an already configured client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

impl PageFetcher for HttpPageFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, DocLookupFetchError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DocLookupFetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "page fetch rejected");
            return Err(DocLookupFetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DocLookupFetchError::from_reqwest(url, e))?;

        let text = String::from_utf8(bytes.to_vec()).map_err(|e| DocLookupFetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(%url, bytes = text.len(), "page fetched");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response on a loopback port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = sock.read(&mut buf).await;
            sock.write_all(response.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
        });
        format!("http://{addr}/api.html")
    }

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::with_client(Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn builds_from_config() {
        let cfg = HttpConfig {
            timeout_secs: 3,
            user_agent: "rtfm-test".into(),
        };
        assert!(HttpPageFetcher::new(&cfg).is_ok());
    }

    #[tokio::test]
    async fn ok_body_is_returned() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\nConnection: close\r\n\r\n<p>api</p>\n",
        )
        .await;
        assert_eq!(fetcher().fetch(&url).await.unwrap(), "<p>api</p>\n");
    }

    #[tokio::test]
    async fn non_200_is_rejected() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, DocLookupFetchError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher()
            .fetch(&format!("http://{addr}/api.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocLookupFetchError::Transport { .. }));
    }
}
