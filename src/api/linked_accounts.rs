//! Linked accounts and their providers.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientInner;
use crate::models::{ListOptions, Resource, ResourceId};
use crate::Result;

/// Service for accounts linked to users from external providers.
///
/// # Example
///
/// ```no_run
/// use directory_client::{ListOptions, ResourceId};
///
/// # async fn example(client: directory_client::DirectoryClient) -> directory_client::Result<()> {
/// let user = ResourceId::from(42u64);
/// let linked = client
///     .linked_accounts()
///     .for_user(&user, ListOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct LinkedAccountsService {
    inner: Arc<ClientInner>,
}

impl LinkedAccountsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get a single linked account.
    pub async fn get(&self, id: &ResourceId) -> Result<Value> {
        self.inner
            .get_cached(&Resource::LINKED_ACCOUNTS.item_path(id))
            .await
    }

    /// List the accounts linked to a user.
    pub async fn for_user(&self, user: &ResourceId, options: ListOptions) -> Result<Vec<Value>> {
        let path = Resource::USERS.nested_path(user, &Resource::LINKED_ACCOUNTS);
        self.inner
            .list(&path, Resource::LINKED_ACCOUNTS.field, &options)
            .await
    }
}

/// Service for the providers accounts can be linked from.
pub struct LinkedAccountProvidersService {
    inner: Arc<ClientInner>,
}

impl LinkedAccountProvidersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List linked account providers.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<Value>> {
        let providers = Resource::LINKED_ACCOUNT_PROVIDERS;
        self.inner
            .list(providers.path, providers.field, &options)
            .await
    }
}
