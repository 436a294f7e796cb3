// API client module: a small blocking HTTP client that fetches JSON
// documents from the intent classifier and the stats service. Everything
// is synchronous; one request is in flight at a time.

use crate::config::Config;
use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use url::Url;

/// Anything that can turn a URL into a JSON document. The real
/// implementation is [`HttpClient`]; tests swap in an in-memory map.
pub trait JsonSource {
    /// GET `url` and decode the body as JSON.
    fn fetch_json(&self, url: &Url) -> Result<Value, FetchError>;

    /// Like [`fetch_json`](Self::fetch_json) but never fails: any error is
    /// logged and an empty JSON object is returned, so callers treat a
    /// failed request and a response missing the expected keys the same.
    fn get_json(&self, url: &Url) -> Value {
        match self.fetch_json(url) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed, using empty document");
                Value::Object(Map::new())
            }
        }
    }
}

impl<T: JsonSource + ?Sized> JsonSource for &T {
    fn fetch_json(&self, url: &Url) -> Result<Value, FetchError> {
        (**self).fetch_json(url)
    }
}

/// Blocking reqwest client used against the live services.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client from the config. The timeout is only set when
    /// `timeout_secs` is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpClient { client })
    }
}

impl JsonSource for HttpClient {
    fn fetch_json(&self, url: &Url) -> Result<Value, FetchError> {
        tracing::debug!(%url, "GET");
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let res = self.client.get(url.clone()).send().map_err(transport)?;
        // The status is not checked: an error page that is valid JSON is
        // still handed to the caller.
        if !res.status().is_success() {
            tracing::debug!(status = %res.status(), %url, "non-success status");
        }
        let body = res.text().map_err(transport)?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl JsonSource for Failing {
        fn fetch_json(&self, url: &Url) -> Result<Value, FetchError> {
            let source = serde_json::from_str::<Value>("<html>").unwrap_err();
            Err(FetchError::Decode {
                url: url.to_string(),
                source,
            })
        }
    }

    #[test]
    fn get_json_returns_empty_object_on_failure() {
        let url = Url::parse("http://localhost/anything").unwrap();
        let value = Failing.get_json(&url);
        assert_eq!(value, Value::Object(Map::new()));
    }

    #[test]
    fn rejected_request_is_transport_error_and_get_json_is_empty() {
        let client = HttpClient::from_config(&Config::default()).unwrap();
        // reqwest refuses non-http schemes before opening a connection.
        let url = Url::parse("ftp://stats.invalid/json").unwrap();

        assert!(matches!(
            client.fetch_json(&url),
            Err(FetchError::Transport { .. })
        ));
        assert_eq!(client.get_json(&url), Value::Object(Map::new()));
    }
}
