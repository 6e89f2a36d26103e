//! CLI subcommand implementations.

pub mod list;
pub mod session;

use std::sync::Arc;

use anyhow::Result;
use jobboard_lib::{
    ApiListSource, ListSection, MemoryLocation, QueryState, SessionOptions, SyncConfig,
    SyncController,
};
use serde_json::Value;

/// A controller over raw JSON records, so every section can be listed.
pub type Session = SyncController<ApiListSource<Value>, MemoryLocation>;

/// Starts a session against the configured API. The returned location is
/// the session's fragment, so callers can navigate it.
pub fn open_session(
    section: &ListSection,
    config: &SyncConfig,
    query: QueryState,
    fragment: Option<&str>,
) -> Result<(Session, Arc<MemoryLocation>)> {
    tracing::debug!("Opening {} session against {}", section.key, config.api_url);
    let client = Arc::new(config.build_client()?);
    let source = Arc::new(ApiListSource::new(client, *section));
    let location = Arc::new(MemoryLocation::new(fragment.unwrap_or("")));
    let options = SessionOptions::for_section(section)
        .with_query(query)
        .with_search_debounce(config.search_debounce);
    let controller = SyncController::start(source, Arc::clone(&location), options);
    Ok((controller, location))
}
