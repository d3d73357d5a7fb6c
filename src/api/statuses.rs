//! Statuses service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ClientInner;
use crate::models::{ListOptions, Resource};
use crate::Result;

/// Service for the status values users can carry.
pub struct StatusesService {
    inner: Arc<ClientInner>,
}

impl StatusesService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List statuses.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<Value>> {
        let statuses = Resource::STATUSES;
        self.inner
            .list(statuses.path, statuses.field, &options)
            .await
    }
}
