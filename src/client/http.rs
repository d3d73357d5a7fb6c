//! HTTP client implementation for the directory API.

use std::sync::Arc;

use serde_json::Value;

use crate::api::{
    CustomFieldsService, GroupsService, LinkedAccountProvidersService, LinkedAccountsService,
    StatusesService, UsersService,
};
use crate::auth::{Credentials, TokenManager};
use crate::cache::CacheGateway;
use crate::models::ListOptions;
use crate::{Error, Result};

use super::config::ClientConfig;
use super::request::{RequestSpec, Response};
use super::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// The main client for interacting with the directory API.
///
/// The client owns the token lifecycle, the retry loop and pagination.
/// Resource services are thin wrappers that pick a path and a result
/// field.
///
/// # Example
///
/// ```no_run
/// use directory_client::{ClientConfig, Credentials, DirectoryClient, ListOptions};
///
/// # async fn example() -> directory_client::Result<()> {
/// let client = DirectoryClient::new(
///     Credentials::user_refresh_token("ada", "refresh-token"),
///     ClientConfig::default(),
/// )?;
///
/// let users = client.users().list(ListOptions::default().limit(20)).await?;
/// println!("Found {} users", users.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DirectoryClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) tokens: TokenManager,
    pub(crate) config: ClientConfig,
    pub(crate) cache: Option<Arc<dyn CacheGateway>>,
}

/// Builder for [`DirectoryClient`] when the defaults are not enough.
pub struct ClientBuilder {
    credentials: Credentials,
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    cache: Option<Arc<dyn CacheGateway>>,
}

impl ClientBuilder {
    /// Set the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send requests through a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach a cache consulted by resource lookups.
    pub fn cache(mut self, cache: Arc<dyn CacheGateway>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DirectoryClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let http = reqwest::Client::builder()
                    .timeout(self.config.timeout)
                    .user_agent(&self.config.user_agent)
                    .build()?;
                Arc::new(ReqwestTransport::new(http))
            }
        };

        let tokens = TokenManager::new(
            self.credentials,
            self.config.token_url.clone(),
            transport.clone(),
        );

        Ok(DirectoryClient {
            inner: Arc::new(ClientInner {
                transport,
                tokens,
                config: self.config,
                cache: self.cache,
            }),
        })
    }
}

impl DirectoryClient {
    /// Create a client with the given credentials and configuration.
    ///
    /// No network call is made until the first request.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        Self::builder(credentials).config(config).build()
    }

    /// Start building a client.
    pub fn builder(credentials: Credentials) -> ClientBuilder {
        ClientBuilder {
            credentials,
            config: ClientConfig::default(),
            transport: None,
            cache: None,
        }
    }

    /// Get the users service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.inner.clone())
    }

    /// Get the groups service.
    pub fn groups(&self) -> GroupsService {
        GroupsService::new(self.inner.clone())
    }

    /// Get the custom fields service.
    pub fn custom_fields(&self) -> CustomFieldsService {
        CustomFieldsService::new(self.inner.clone())
    }

    /// Get the linked accounts service.
    pub fn linked_accounts(&self) -> LinkedAccountsService {
        LinkedAccountsService::new(self.inner.clone())
    }

    /// Get the linked account providers service.
    pub fn linked_account_providers(&self) -> LinkedAccountProvidersService {
        LinkedAccountProvidersService::new(self.inner.clone())
    }

    /// Get the statuses service.
    pub fn statuses(&self) -> StatusesService {
        StatusesService::new(self.inner.clone())
    }

    /// Obtain a valid access token, refreshing it if needed.
    ///
    /// `credentials` override the stored ones for this call.
    pub async fn authenticate(&self, credentials: Option<&Credentials>) -> Result<String> {
        self.inner.tokens.valid_token(credentials).await
    }

    /// Get the token manager.
    pub fn tokens(&self) -> &TokenManager {
        &self.inner.tokens
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Send one request, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an invalid spec (fields on a non-GET, no target)
    /// - [`Error::Api`] for a non-retryable status or an exhausted retry budget
    /// - [`Error::Auth`] if no token can be obtained
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Response> {
        self.inner.execute(spec).await
    }

    /// Fetch every page of a collection and concatenate the `field` arrays.
    ///
    /// Pages are requested from 1 with `page` and `page_size` query
    /// options until the response metadata reports the last page or
    /// `limit` results have been collected. The result never holds more
    /// than `limit` items.
    pub async fn fetch_all(
        &self,
        spec: &RequestSpec,
        field: &str,
        limit: Option<usize>,
        page_size: Option<u32>,
    ) -> Result<Vec<Value>> {
        self.inner.fetch_all(spec, field, limit, page_size).await
    }

    /// Remove a cached entry. Returns `false` when no cache is attached
    /// or nothing was stored under `key`.
    pub fn invalidate_cached(&self, key: &str) -> bool {
        self.inner.cache_delete(key)
    }
}

impl ClientInner {
    /// Run the send/evaluate/retry loop for one request.
    pub(crate) async fn execute(&self, spec: &RequestSpec) -> Result<Response> {
        let url = spec.resolve_url(&self.config.api_base_url)?;
        let headers = match &spec.headers {
            Some(headers) => headers.clone(),
            None => self.tokens.auth_headers().await?,
        };
        let body = spec.body.as_ref().map(serde_json::to_vec).transpose()?;

        self.send_with_retry(HttpRequest {
            method: spec.method.clone(),
            url,
            headers,
            body,
        })
        .await
    }

    async fn send_with_retry(&self, request: HttpRequest) -> Result<Response> {
        let policy = &self.config.retry;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tracing::debug!(
                attempt = attempts,
                method = %request.method,
                url = %request.url,
                "sending request"
            );

            let response = self.transport.send(request.clone()).await?;
            let status = response.status;
            tracing::debug!(attempt = attempts, status, url = %request.url, "received response");

            if response.is_success() {
                return Response::from_body(&response.body);
            }

            if !policy.should_retry_status(status) {
                return Err(Error::from_status(status, response.text()));
            }

            let delay = policy.delay_for(status, response.header("retry-after"));
            if !policy.allows_another(attempts) {
                tracing::warn!(
                    attempts,
                    status,
                    url = %request.url,
                    "retries exhausted"
                );
                return Err(Error::from_status(status, response.text()));
            }

            tracing::warn!(
                attempt = attempts,
                status,
                delay_secs = delay.as_secs(),
                url = %request.url,
                "retryable status, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// GET a single resource, serving it from the cache when present.
    pub(crate) async fn get_cached(&self, path: &str) -> Result<Value> {
        if let Some(hit) = self.cache_get(path) {
            tracing::debug!(path, "cache hit");
            return Ok(hit);
        }

        let value = self.execute(&RequestSpec::get(path)).await?.json()?;
        self.cache_set(path, &value);
        Ok(value)
    }

    /// List a collection with the caller's options.
    pub(crate) async fn list(
        &self,
        path: &str,
        field: &str,
        options: &ListOptions,
    ) -> Result<Vec<Value>> {
        self.fetch_all(&options.spec(path), field, options.limit, options.page_size)
            .await
    }

    pub(crate) fn cache_get(&self, key: &str) -> Option<Value> {
        self.cache.as_ref().and_then(|c| c.get(key))
    }

    pub(crate) fn cache_set(&self, key: &str, value: &Value) {
        if let Some(cache) = &self.cache {
            cache.set(key, value.clone());
        }
    }

    pub(crate) fn cache_delete(&self, key: &str) -> bool {
        self.cache.as_ref().is_some_and(|c| c.delete(key))
    }
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
