//! Custom field definitions service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientInner;
use crate::models::{ListOptions, Resource, ResourceId};
use crate::Result;

/// Service for custom field definitions.
pub struct CustomFieldsService {
    inner: Arc<ClientInner>,
}

impl CustomFieldsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List custom field definitions.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<Value>> {
        let fields = Resource::CUSTOM_FIELDS;
        self.inner.list(fields.path, fields.field, &options).await
    }

    /// Get a single custom field definition.
    pub async fn get(&self, id: &ResourceId) -> Result<Value> {
        self.inner
            .get_cached(&Resource::CUSTOM_FIELDS.item_path(id))
            .await
    }
}
