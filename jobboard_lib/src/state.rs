//! The list session state machine.
//!
//! [`SyncState::handle`] is the only place where the query, the generation
//! counter and the published snapshot change. It performs no I/O: when a
//! transition needs data it returns a [`FetchRequest`], and the fetch
//! result comes back later as [`SyncEvent::Fetched`].

use jobboard_api::types::ListResponse;
use jobboard_api::QueryState;
use serde::Serialize;

use crate::error::{FailureReason, FetchError};
use crate::fragment::FragmentChange;
use crate::pagination::{resolve, PaginationView};

/// Lifecycle phase of a list session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error(FailureReason),
}

/// Everything a view needs to render the list.
///
/// Items and pagination always come from the same fetch cycle. After a
/// failure they keep the last good values and `last_error` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub pagination: PaginationView,
    pub phase: Phase,
    #[serde(serialize_with = "serialize_error")]
    pub last_error: Option<FetchError>,
}

fn serialize_error<S>(error: &Option<FetchError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl<T> ListSnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

/// A fetch the driver must perform for `query`, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: QueryState,
}

/// Inputs to the state machine.
#[derive(Debug)]
pub enum SyncEvent<T> {
    /// Session start: load the first page unless a fetch is already out.
    Start,
    SearchCommitted(String),
    StatusChanged(Option<String>),
    SortSelected(String),
    PageSizeChanged(u32),
    PageRequested(u32),
    /// Explicit re-trigger of the current query.
    Retry,
    Fragment(FragmentChange),
    Fetched {
        generation: u64,
        result: Result<ListResponse<T>, FetchError>,
    },
}

/// Query, generation counter and published snapshot of one list session.
pub struct SyncState<T> {
    query: QueryState,
    generation: u64,
    /// Generation whose result is still awaited.
    awaiting: Option<u64>,
    /// Whether this cycle already spent its corrective fetch.
    corrected: bool,
    snapshot: ListSnapshot<T>,
}

impl<T> SyncState<T> {
    pub fn new(query: QueryState) -> Self {
        let pagination = PaginationView::initial(&query);
        Self {
            query,
            generation: 0,
            awaiting: None,
            corrected: false,
            snapshot: ListSnapshot {
                items: Vec::new(),
                pagination,
                phase: Phase::Idle,
                last_error: None,
            },
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Generation of the most recently issued fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> &ListSnapshot<T> {
        &self.snapshot
    }

    /// True while the result of the current generation is outstanding.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    /// Applies one event. Returns the fetch to issue, if any.
    pub fn handle(&mut self, event: SyncEvent<T>) -> Option<FetchRequest> {
        match event {
            SyncEvent::Start => {
                if self.awaiting.is_some() || self.snapshot.phase != Phase::Idle {
                    return None;
                }
                self.corrected = false;
                Some(self.begin_fetch())
            }
            SyncEvent::SearchCommitted(text) => {
                let next = self.query.clone().with_search(&text);
                self.mutate(next)
            }
            SyncEvent::StatusChanged(status) => {
                let next = self.query.clone().with_status(status.as_deref());
                self.mutate(next)
            }
            SyncEvent::SortSelected(field) => {
                let next = self.query.clone().with_sort(&field);
                self.mutate(next)
            }
            SyncEvent::PageSizeChanged(size) => {
                let next = self.query.clone().with_page_size(size);
                self.mutate(next)
            }
            SyncEvent::PageRequested(page) => {
                let next = self.query.clone().with_page(page);
                self.mutate(next)
            }
            SyncEvent::Retry => {
                self.corrected = false;
                Some(self.begin_fetch())
            }
            SyncEvent::Fragment(change) => match change {
                FragmentChange::Search(term) if Some(term.as_str()) != self.query.search_term() => {
                    let next = self.query.clone().with_search(&term);
                    self.mutate(next)
                }
                FragmentChange::Cleared if self.query.search_term().is_some() => {
                    let next = self.query.clone().with_search("");
                    self.mutate(next)
                }
                _ => None,
            },
            SyncEvent::Fetched { generation, result } => self.apply_result(generation, result),
        }
    }

    fn mutate(&mut self, next: QueryState) -> Option<FetchRequest> {
        let failed = matches!(self.snapshot.phase, Phase::Error(_));
        if next == self.query && !failed {
            tracing::debug!("Query unchanged, no fetch");
            return None;
        }
        self.query = next;
        self.corrected = false;
        Some(self.begin_fetch())
    }

    fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.awaiting = Some(self.generation);
        self.snapshot.phase = Phase::Loading;
        tracing::debug!(
            "Fetch generation {} (page {}, search {:?})",
            self.generation,
            self.query.page(),
            self.query.search_term()
        );
        FetchRequest {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    fn apply_result(
        &mut self,
        generation: u64,
        result: Result<ListResponse<T>, FetchError>,
    ) -> Option<FetchRequest> {
        if self.awaiting != Some(generation) {
            tracing::debug!(
                "Discarding stale result of generation {} (current {})",
                generation,
                self.generation
            );
            return None;
        }
        self.awaiting = None;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    "Fetch generation {} failed [{}]: {}",
                    generation,
                    e.reason(),
                    e
                );
                self.snapshot.phase = Phase::Error(e.reason());
                self.snapshot.last_error = Some(e);
                return None;
            }
        };

        let resolution = resolve(response, &self.query);
        if resolution.view.page != self.query.page() {
            self.query = self.query.clone().with_page(resolution.view.page);
        }
        self.snapshot = ListSnapshot {
            items: resolution.items,
            pagination: resolution.view,
            phase: Phase::Ready,
            last_error: None,
        };

        match resolution.correction {
            Some(page) if !self.corrected => {
                tracing::debug!(
                    "Page out of range, refetching page {} of {}",
                    page,
                    resolution.view.total_pages
                );
                self.corrected = true;
                Some(self.begin_fetch())
            }
            Some(page) => {
                tracing::warn!(
                    "Page {} still out of range after correction; keeping published items",
                    page
                );
                None
            }
            None => None,
        }
    }
}
