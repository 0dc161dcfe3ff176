use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::ProductId;
use crate::error::HarvestError;

pub const DEFAULT_API_BASE: &str = "https://www.webhallen.com";

/// Raw result of a product request, before any decoding.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

pub trait ProductClient {
    fn fetch_product(&self, id: ProductId) -> Result<FetchedBody, HarvestError>;
}

#[derive(Clone)]
pub struct WebhallenHttpClient {
    client: Client,
    base_url: String,
}

impl WebhallenHttpClient {
    pub fn new() -> Result<Self, HarvestError> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("webhallen-harvester/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HarvestError::HttpClient(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| HarvestError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn product_url(&self, id: ProductId) -> String {
        format!("{}/api/product/{}", self.base_url, id)
    }
}

impl ProductClient for WebhallenHttpClient {
    fn fetch_product(&self, id: ProductId) -> Result<FetchedBody, HarvestError> {
        let url = self.product_url(id);
        let transport = |err: reqwest::Error| HarvestError::Transport {
            url: url.clone(),
            message: err.to_string(),
        };

        let response = self.client.get(&url).send().map_err(transport)?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            tracing::debug!(%id, status, "webhallen answered with a non-success status");
        }
        let body = response.bytes().map_err(transport)?.to_vec();

        Ok(FetchedBody { url, status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_url_joins_base_and_id() {
        let client = WebhallenHttpClient::with_base_url("http://localhost:8080/").unwrap();
        let id = ProductId::new(101).unwrap();
        assert_eq!(client.product_url(id), "http://localhost:8080/api/product/101");
    }

    #[test]
    fn default_base_points_at_webhallen() {
        let client = WebhallenHttpClient::new().unwrap();
        let id = ProductId::new(42).unwrap();
        assert_eq!(
            client.product_url(id),
            "https://www.webhallen.com/api/product/42"
        );
    }
}
