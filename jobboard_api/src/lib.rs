//! Client for the job board's admin list endpoints.
//!
//! Provides the canonical [`QueryState`], the built-in [`ListSection`]s, and
//! an HTTP [`Client`] that normalizes both list body shapes into a single
//! [`types::ListResponse`].

mod client;
mod errors;
mod query;
pub mod section;
pub mod types;
pub use self::client::{Client, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::query::{QueryState, SortDirection, DEFAULT_PAGE_SIZE};
pub use self::section::ListSection;
