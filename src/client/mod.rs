//! HTTP client and request engine for the directory API.
//!
//! This module provides the main entry point [`DirectoryClient`] along
//! with the pieces it is built from: the retry policy, request specs,
//! the pager and the transport boundary.
//!
//! # Example
//!
//! ```no_run
//! use directory_client::{ClientConfig, Credentials, DirectoryClient, RequestSpec};
//!
//! # async fn example() -> directory_client::Result<()> {
//! let client = DirectoryClient::new(
//!     Credentials::password("ada", "hunter2"),
//!     ClientConfig::from_env()?,
//! )?;
//!
//! let groups = client
//!     .fetch_all(&RequestSpec::get("/groups"), "groups", Some(50), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
pub mod paginated;
mod request;
pub mod transport;

pub use config::{ClientConfig, RetryPolicy, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_URL};
pub use http::{ClientBuilder, DirectoryClient};
pub use paginated::PageMeta;
pub use request::{RequestSpec, Response, Target};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub(crate) use http::ClientInner;
