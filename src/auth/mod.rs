//! Authentication for the directory API.
//!
//! Three credential shapes are accepted, tried in this order when a new
//! access token is needed:
//!
//! 1. **Username + refresh token** - refresh-token grant
//! 2. **Username + password** - password grant (password percent-encoded)
//! 3. **Bare refresh token** - refresh-token grant without a username
//!
//! Tokens are reused until they have five seconds or less left.
//!
//! ```no_run
//! use directory_client::{ClientConfig, Credentials, DirectoryClient};
//!
//! # async fn example() -> directory_client::Result<()> {
//! let client = DirectoryClient::new(
//!     Credentials::password("ada", "hunter2"),
//!     ClientConfig::default(),
//! )?;
//! let token = client.authenticate(None).await?;
//! # Ok(())
//! # }
//! ```

mod token;

pub use token::{Credentials, TokenManager, EXPIRY_MARGIN_SECS};
