//! # directory-client
//!
//! An async Rust client for the directory REST API: users, groups,
//! custom fields, linked accounts, linked-account providers and statuses.
//!
//! ## Features
//!
//! - **Authentication**: refresh-token and password grants, with tokens
//!   reused until five seconds before expiry
//! - **Resilient requests**: configurable retryable statuses, flat backoff
//!   and server-dictated `Retry-After` on 429
//! - **Pagination**: collection endpoints fetched page by page and merged
//!   into one ordered list, optionally capped by a limit
//! - **Caching**: pluggable key-value cache for single-resource lookups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use directory_client::{ClientConfig, Credentials, DirectoryClient, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> directory_client::Result<()> {
//!     let client = DirectoryClient::new(
//!         Credentials::password("ada", "hunter2"),
//!         ClientConfig::default(),
//!     )?;
//!
//!     let users = client.users().list(ListOptions::default().limit(10)).await?;
//!     println!("Found {} users", users.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Generic requests
//!
//! Endpoints without a dedicated service go through
//! [`DirectoryClient::execute`] and [`DirectoryClient::fetch_all`]:
//!
//! ```rust,no_run
//! use directory_client::{DirectoryClient, RequestSpec};
//!
//! # async fn example(client: DirectoryClient) -> directory_client::Result<()> {
//! let providers = client
//!     .fetch_all(
//!         &RequestSpec::get("/linked_account_providers"),
//!         "linked_account_providers",
//!         None,
//!         None,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use auth::{Credentials, TokenManager};
pub use cache::{CacheGateway, InMemoryCache};
pub use client::{
    ClientBuilder, ClientConfig, DirectoryClient, RequestSpec, Response, RetryPolicy,
};
pub use error::{Error, Result};
pub use models::{ListOptions, Resource, ResourceId};

/// Prelude module for convenient imports.
///
/// ```rust
/// use directory_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{Credentials, TokenManager};
    pub use crate::cache::{CacheGateway, InMemoryCache};
    pub use crate::client::{
        ClientConfig, DirectoryClient, PageMeta, RequestSpec, Response, RetryPolicy,
    };
    pub use crate::error::{Error, Result};
    pub use crate::models::{ListOptions, Resource, ResourceId};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_descriptors() {
        assert_eq!(Resource::USERS.path, "/users");
        assert_eq!(Resource::USERS.field, "users");
        assert_eq!(
            Resource::LINKED_ACCOUNT_PROVIDERS.path,
            "/linked_account_providers"
        );
    }

    #[test]
    fn test_client_builds_without_network() {
        let client = DirectoryClient::new(
            Credentials::refresh_token("r"),
            ClientConfig::default().with_page_size(25),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().config().page_size, 25);
    }
}
