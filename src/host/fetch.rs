// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network access for `XMLHttpRequest_send`

use url::Url;

use crate::error::Result;

/// Default user agent for host-issued requests
pub const DEFAULT_USER_AGENT: &str = concat!("hostdom/", env!("CARGO_PKG_VERSION"));

/// Performs the request behind a synchronous `XMLHttpRequest`
pub trait Fetcher: Send + Sync {
    /// Run the request and return the response body
    fn fetch(&self, method: &str, url: &Url, body: Option<&str>) -> Result<String>;
}

impl<F> Fetcher for F
where
    F: Fn(&str, &Url, Option<&str>) -> Result<String> + Send + Sync,
{
    fn fetch(&self, method: &str, url: &Url, body: Option<&str>) -> Result<String> {
        self(method, url, body)
    }
}

#[cfg(feature = "http")]
pub use self::http::{HttpFetcher, HttpFetcherConfig};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use reqwest::redirect::Policy;
    use reqwest::Method;
    use tracing::debug;
    use url::Url;

    use super::{Fetcher, DEFAULT_USER_AGENT};
    use crate::error::{Error, Result};

    /// HTTP fetcher configuration
    #[derive(Debug, Clone)]
    pub struct HttpFetcherConfig {
        /// User agent string
        pub user_agent: String,
        /// Per-request timeout
        pub timeout: Duration,
        /// Maximum redirects to follow
        pub max_redirects: usize,
    }

    impl Default for HttpFetcherConfig {
        fn default() -> Self {
            Self {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout: Duration::from_secs(30),
                max_redirects: 10,
            }
        }
    }

    impl HttpFetcherConfig {
        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = user_agent.into();
            self
        }

        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn max_redirects(mut self, max_redirects: usize) -> Self {
            self.max_redirects = max_redirects;
            self
        }
    }

    /// Blocking reqwest client
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: Client,
    }

    impl HttpFetcher {
        pub fn new() -> Result<Self> {
            Self::with_config(HttpFetcherConfig::default())
        }

        pub fn with_config(config: HttpFetcherConfig) -> Result<Self> {
            let client = Client::builder()
                .user_agent(&config.user_agent)
                .timeout(config.timeout)
                .redirect(Policy::limited(config.max_redirects))
                .build()?;
            Ok(Self { client })
        }
    }

    impl Fetcher for HttpFetcher {
        fn fetch(&self, method: &str, url: &Url, body: Option<&str>) -> Result<String> {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::other(format!("invalid HTTP method '{}'", method)))?;

            debug!(%method, %url, "fetching");
            let mut request = self.client.request(method, url.clone());
            if let Some(body) = body {
                request = request.body(body.to_string());
            }

            let response = request.send()?;
            Ok(response.text()?)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_fetcher() {
        let fetcher = |method: &str, url: &Url, body: Option<&str>| -> Result<String> {
            Ok(format!("{} {} {}", method, url.path(), body.unwrap_or("-")))
        };
        let url = Url::parse("http://guestbook.test/add").unwrap();
        assert_eq!(fetcher.fetch("POST", &url, Some("a=1")).unwrap(), "POST /add a=1");
        assert_eq!(fetcher.fetch("GET", &url, None).unwrap(), "GET /add -");
    }
}
