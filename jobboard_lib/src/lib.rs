//! List synchronization engine for the job board admin views.
//!
//! Keeps a list session's query, its remote results and the address
//! fragment consistent: one authoritative state machine ([`state`]), an
//! async driver ([`controller`]), page arithmetic ([`pagination`]) and the
//! fragment bridge ([`fragment`]).

pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod fragment;
pub mod pagination;
pub mod state;
pub mod validation;

pub use jobboard_api;
pub use jobboard_api::section;
pub use jobboard_api::types;
pub use jobboard_api::{Client, ListSection, QueryState, SortDirection};

pub use config::SyncConfig;
pub use controller::{SessionOptions, SyncController};
pub use error::{FailureReason, FetchError, SyncError};
pub use fetcher::{ApiListSource, ListFetcher, ListSource};
pub use fragment::{FragmentBridge, FragmentChange, MemoryLocation, NavigationSurface};
pub use pagination::PaginationView;
pub use state::{ListSnapshot, Phase, SyncEvent, SyncState};
