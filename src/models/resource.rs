//! Resource descriptors and list parameters.
//!
//! Every resource is a path plus the response field its items live in.

use crate::client::RequestSpec;

use super::ResourceId;

/// A collection endpoint and the field holding its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Collection path under the base URL
    pub path: &'static str,
    /// Response field holding the items (and keying `meta`)
    pub field: &'static str,
}

impl Resource {
    /// Users.
    pub const USERS: Resource = Resource {
        path: "/users",
        field: "users",
    };
    /// Groups.
    pub const GROUPS: Resource = Resource {
        path: "/groups",
        field: "groups",
    };
    /// Custom field definitions.
    pub const CUSTOM_FIELDS: Resource = Resource {
        path: "/custom_fields",
        field: "custom_fields",
    };
    /// Linked accounts.
    pub const LINKED_ACCOUNTS: Resource = Resource {
        path: "/linked_accounts",
        field: "linked_accounts",
    };
    /// Linked account providers.
    pub const LINKED_ACCOUNT_PROVIDERS: Resource = Resource {
        path: "/linked_account_providers",
        field: "linked_account_providers",
    };
    /// Statuses.
    pub const STATUSES: Resource = Resource {
        path: "/statuses",
        field: "statuses",
    };

    /// Path of a single item, e.g. `/users/42`.
    ///
    /// The id is percent-encoded as one path segment.
    pub fn item_path(&self, id: &ResourceId) -> String {
        format!("{}/{}", self.path, urlencoding::encode(id.as_str()))
    }

    /// Path of a collection nested under an item, e.g. `/groups/3/users`.
    pub fn nested_path(&self, id: &ResourceId, child: &Resource) -> String {
        format!(
            "{}/{}{}",
            self.path,
            urlencoding::encode(id.as_str()),
            child.path
        )
    }
}

/// Parameters for list calls.
///
/// # Example
///
/// ```
/// use directory_client::ListOptions;
///
/// let opts = ListOptions::default()
///     .limit(25)
///     .query("status", "active");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Stop after this many results
    pub limit: Option<usize>,
    /// Override the configured page size
    pub page_size: Option<u32>,
    /// Extra query options sent with every page
    pub query: Vec<(String, String)>,
}

impl ListOptions {
    /// Stop after `limit` results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request `page_size` items per page.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Add a query option.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub(crate) fn spec(&self, path: impl Into<String>) -> RequestSpec {
        RequestSpec::get(path).queries(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}
