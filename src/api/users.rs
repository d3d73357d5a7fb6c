//! Users service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{ClientInner, RequestSpec, Response};
use crate::models::{ListOptions, Resource, ResourceId};
use crate::Result;

/// Service for user operations.
///
/// Single-user lookups go through the client cache when one is attached;
/// updates and deletes invalidate the cached entry.
///
/// # Example
///
/// ```no_run
/// use directory_client::{ListOptions, ResourceId};
///
/// # async fn example(client: directory_client::DirectoryClient) -> directory_client::Result<()> {
/// let active = client
///     .users()
///     .list(ListOptions::default().query("status", "active"))
///     .await?;
///
/// let user = client.users().get(&ResourceId::from(42u64)).await?;
/// # Ok(())
/// # }
/// ```
pub struct UsersService {
    inner: Arc<ClientInner>,
}

impl UsersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List users across all pages.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<Value>> {
        let users = Resource::USERS;
        self.inner.list(users.path, users.field, &options).await
    }

    /// Get a single user.
    pub async fn get(&self, id: &ResourceId) -> Result<Value> {
        self.inner.get_cached(&Resource::USERS.item_path(id)).await
    }

    /// Create a user.
    pub async fn create(&self, user: Value) -> Result<Response> {
        self.inner
            .execute(&RequestSpec::post(Resource::USERS.path).json(user))
            .await
    }

    /// Update a user.
    pub async fn update(&self, id: &ResourceId, changes: Value) -> Result<Response> {
        let path = Resource::USERS.item_path(id);
        let response = self
            .inner
            .execute(&RequestSpec::put(path.as_str()).json(changes))
            .await?;
        self.inner.cache_delete(&path);
        Ok(response)
    }

    /// Delete a user.
    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        let path = Resource::USERS.item_path(id);
        self.inner.execute(&RequestSpec::delete(path.as_str())).await?;
        self.inner.cache_delete(&path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheGateway, InMemoryCache};
    use crate::client::transport::MockTransport;
    use crate::{ClientConfig, Credentials, DirectoryClient};
    use chrono::{Duration, Utc};
    use reqwest::Method;
    use serde_json::json;

    const BASE: &str = "https://api.test/v1";

    async fn client() -> (DirectoryClient, MockTransport, Arc<InMemoryCache>) {
        let transport = MockTransport::new();
        let cache = Arc::new(InMemoryCache::new());
        let client = DirectoryClient::builder(Credentials::refresh_token("r"))
            .config(ClientConfig::default().with_api_base_url(BASE))
            .transport(Arc::new(transport.clone()))
            .cache(cache.clone())
            .build()
            .unwrap();
        client
            .tokens()
            .set_token("tok", Utc::now() + Duration::hours(1))
            .await;
        (client, transport, cache)
    }

    #[tokio::test]
    async fn test_get_is_cached() {
        let (client, transport, cache) = client().await;
        transport.push_json(Method::GET, format!("{BASE}/users/42"), 200, json!({"id": 42}));

        let id = ResourceId::from(42u64);
        assert_eq!(client.users().get(&id).await.unwrap(), json!({"id": 42}));
        assert_eq!(client.users().get(&id).await.unwrap(), json!({"id": 42}));

        assert_eq!(transport.requests().len(), 1);
        assert_eq!(cache.get("/users/42"), Some(json!({"id": 42})));
    }

    #[tokio::test]
    async fn test_update_and_delete_invalidate() {
        let (client, transport, cache) = client().await;
        cache.set("/users/7", json!({"id": 7, "name": "old"}));
        transport.push_json(Method::PUT, format!("{BASE}/users/7"), 200, json!({"id": 7}));

        let id = ResourceId::from(7u64);
        client
            .users()
            .update(&id, json!({"name": "new"}))
            .await
            .unwrap();
        assert!(cache.get("/users/7").is_none());

        cache.set("/users/7", json!({"id": 7}));
        transport.push(
            Method::DELETE,
            format!("{BASE}/users/7"),
            crate::client::HttpResponse {
                status: 204,
                headers: Default::default(),
                body: Vec::new(),
            },
        );
        client.users().delete(&id).await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_cached() {
        let (client, _transport, cache) = client().await;
        cache.set("/users/1", json!({}));
        assert!(client.invalidate_cached("/users/1"));
        assert!(!client.invalidate_cached("/users/1"));
    }
}
