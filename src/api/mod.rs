//! API service modules for directory endpoints.
//!
//! Each service is a thin layer over the client's request engine: it
//! picks a path and the response field items live in, and leaves auth,
//! retries and paging to the client.

mod custom_fields;
mod groups;
mod linked_accounts;
mod statuses;
mod users;

pub use custom_fields::CustomFieldsService;
pub use groups::GroupsService;
pub use linked_accounts::{LinkedAccountProvidersService, LinkedAccountsService};
pub use statuses::StatusesService;
pub use users::UsersService;
