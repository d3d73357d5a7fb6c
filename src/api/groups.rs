//! Groups service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientInner;
use crate::models::{ListOptions, Resource, ResourceId};
use crate::Result;

/// Service for group operations.
pub struct GroupsService {
    inner: Arc<ClientInner>,
}

impl GroupsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List groups across all pages.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<Value>> {
        let groups = Resource::GROUPS;
        self.inner.list(groups.path, groups.field, &options).await
    }

    /// Get a single group.
    pub async fn get(&self, id: &ResourceId) -> Result<Value> {
        self.inner.get_cached(&Resource::GROUPS.item_path(id)).await
    }

    /// List the users belonging to a group.
    pub async fn members(&self, id: &ResourceId, options: ListOptions) -> Result<Vec<Value>> {
        let path = Resource::GROUPS.nested_path(id, &Resource::USERS);
        self.inner
            .list(&path, Resource::USERS.field, &options)
            .await
    }
}
