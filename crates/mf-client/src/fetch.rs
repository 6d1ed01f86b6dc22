//! `http(s)` image fetching for the compositor.

use mf_render::{RemoteFetch, RenderError};
use reqwest::blocking::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl RemoteFetch for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let network = |message: String| RenderError::Network {
            url: url.to_string(),
            message,
        };
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("status {status}")));
        }
        let bytes = response.bytes().map_err(|e| network(e.to_string()))?;
        log::debug!("fetched {url}: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
