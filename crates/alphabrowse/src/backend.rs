use crate::prelude::*;
use alphabrowse_core::browse::{BackendError, BrowsePage, BrowseQuery};
use alphabrowse_core::config::BackendConfig;
use alphabrowse_core::solr::{browse_params, classify_error, parse_browse_response, BROWSE_HANDLER};
use std::future::Future;
use std::time::Duration;

/// A sorted-term index that can return a window of headings around a term
pub trait BrowseBackend: Send + Sync {
    fn query(
        &self,
        query: &BrowseQuery,
    ) -> impl Future<Output = Result<BrowsePage, BackendError>> + Send;
}

/// Browse backend talking to the Solr browse request handler
#[derive(Debug, Clone)]
pub struct SolrBrowseBackend {
    client: reqwest::Client,
    handler_url: String,
}

impl SolrBrowseBackend {
    /// Create a backend with the configured timeout applied to every request
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("alphabrowse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            handler_url: format!("{}/{BROWSE_HANDLER}", config.url.trim_end_matches('/')),
        })
    }

    pub fn handler_url(&self) -> &str {
        &self.handler_url
    }
}

fn request_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::Unavailable(err.to_string())
    }
}

impl BrowseBackend for SolrBrowseBackend {
    async fn query(&self, query: &BrowseQuery) -> Result<BrowsePage, BackendError> {
        let params = browse_params(query);
        log::debug!("GET {} {:?}", self.handler_url, params);

        let response = self
            .client
            .get(&self.handler_url)
            .query(&params)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        parse_browse_response(&body)
    }
}
