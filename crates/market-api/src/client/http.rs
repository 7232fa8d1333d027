//! Authenticated JSON client for the marketplace REST backend

use market_common::{ApiConfig, TokenStore};
use market_core::{ApiResult, DomainError};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::error::{error_from_status, map_decode_error, map_transport_error};

/// Shared HTTP client
///
/// Every call carries the bearer token from the token store. A 401 clears the
/// store so the session has to sign in again.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a new ApiClient
    ///
    /// # Errors
    /// Returns `Transport` if the underlying HTTP client cannot be built
    pub fn new(config: ApiConfig, tokens: TokenStore) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| map_transport_error(&e))?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// The token store this client authenticates with
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// GET a JSON document
    pub async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path)?.query(query);
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| map_decode_error(&e))
    }

    /// POST a JSON body and decode the JSON reply
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| map_decode_error(&e))
    }

    /// POST and ignore the reply body
    pub async fn post_unit<B>(&self, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(Method::POST, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await.map(|_| ())
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let bearer = self.tokens.bearer().ok_or(DomainError::MissingSession)?;
        Ok(self
            .http
            .request(method, self.config.url(path))
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, "application/json"))
    }

    #[instrument(skip(self, request))]
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            map_transport_error(&e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(&e))?;

        if status.is_success() {
            debug!(status = status.as_u16(), path = %url, "Request succeeded");
            return Ok(body.to_vec());
        }

        let error = error_from_status(status.as_u16(), &body);
        if matches!(error, DomainError::Unauthorized) {
            warn!(path = %url, "Credentials rejected, clearing token");
            self.tokens.clear();
        } else {
            warn!(status = status.as_u16(), path = %url, error = %error, "Request rejected");
        }
        Err(error)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("tokens", &self.tokens)
            .finish()
    }
}
