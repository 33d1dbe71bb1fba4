//! Graph HTTP client with token injection, retry and OData pagination.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::auth::TokenCache;
use crate::error::{GraphError, GraphResult};

/// `OData` error response body.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error detail.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}

/// Paginated Graph response wrapper.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// HTTP client for Graph API requests.
///
/// Injects bearer tokens from the [`TokenCache`], retries transient errors
/// (502/503/504) with exponential backoff, and honors Retry-After on 429
/// responses up to the configured attempt limit.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    max_retries: u32,
}

impl GraphClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Config`] if the underlying HTTP client cannot
    /// be built.
    pub fn new(
        token_cache: Arc<TokenCache>,
        timeout_secs: u64,
        max_retries: u32,
    ) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GraphError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token_cache,
            max_retries,
        })
    }

    /// GET returning a deserialized body.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> GraphResult<T> {
        let response = self.send(reqwest::Method::GET, url, None::<&()>).await?;
        response.json().await.map_err(GraphError::from)
    }

    /// POST returning a deserialized body.
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> GraphResult<T> {
        let response = self.send(reqwest::Method::POST, url, Some(body)).await?;
        response.json().await.map_err(GraphError::from)
    }

    /// PATCH; Graph answers 204 No Content, so the body is discarded.
    #[instrument(skip(self, body))]
    pub async fn patch<B: serde::Serialize>(&self, url: &str, body: &B) -> GraphResult<()> {
        self.send(reqwest::Method::PATCH, url, Some(body)).await?;
        Ok(())
    }

    /// DELETE; Graph answers 204 No Content.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> GraphResult<()> {
        self.send(reqwest::Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    /// Sends one request with retry handling, returning the raw successful
    /// response.
    async fn send<B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> GraphResult<reqwest::Response> {
        let mut retries = 0u32;
        let mut rate_limit_attempts = 0u32;
        let mut delay = Duration::from_secs(1);

        loop {
            let token = self.token_cache.get_token().await?;

            let mut request = self
                .http_client
                .request(method.clone(), url)
                .bearer_auth(&token);
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if rate_limit_attempts >= self.max_retries {
                    return Err(GraphError::RateLimited {
                        attempts: rate_limit_attempts,
                    });
                }
                let wait = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!("rate limited, waiting {wait}s before retry");
                tokio::time::sleep(Duration::from_secs(wait)).await;
                rate_limit_attempts += 1;
                continue;
            }

            if matches!(
                status,
                reqwest::StatusCode::BAD_GATEWAY
                    | reqwest::StatusCode::SERVICE_UNAVAILABLE
                    | reqwest::StatusCode::GATEWAY_TIMEOUT
            ) && retries < self.max_retries
            {
                retries += 1;
                warn!(
                    "transient error {status}, retry {retries}/{} after {delay:?}",
                    self.max_retries
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            if status.is_success() {
                return Ok(response);
            }

            let error_body = response.text().await.unwrap_or_default();
            if let Ok(odata_error) = serde_json::from_str::<ODataError>(&error_body) {
                return Err(GraphError::Api {
                    code: odata_error.error.code,
                    message: odata_error.error.message,
                });
            }
            return Err(GraphError::Api {
                code: status.to_string(),
                message: error_body,
            });
        }
    }

    /// Drains all pages of a paginated listing into one vector.
    #[instrument(skip(self))]
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        initial_url: &str,
    ) -> GraphResult<Vec<T>> {
        let mut url = initial_url.to_string();
        let mut items = Vec::new();

        loop {
            debug!("fetching page: {url}");
            let mut response: ODataResponse<T> = self.get(&url).await?;
            items.append(&mut response.value);

            match response.next_link {
                Some(next) => url = next,
                None => return Ok(items),
            }
        }
    }
}
