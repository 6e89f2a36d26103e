//! Bridges fetch requests from the state machine to the list endpoint.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use jobboard_api::types::ListResponse;
use jobboard_api::{Client, ListSection, QueryState};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::state::FetchRequest;

/// The remote list endpoint, seen from the engine.
///
/// One call is one request: implementations must not retry.
pub trait ListSource: Send + Sync + 'static {
    type Item: Send + 'static;

    fn fetch(
        &self,
        query: &QueryState,
    ) -> impl Future<Output = Result<ListResponse<Self::Item>, FetchError>> + Send;
}

/// [`ListSource`] backed by the HTTP client for one section.
pub struct ApiListSource<T> {
    client: Arc<Client>,
    section: ListSection,
    _item: PhantomData<fn() -> T>,
}

impl<T> ApiListSource<T> {
    pub fn new(client: Arc<Client>, section: ListSection) -> Self {
        Self {
            client,
            section,
            _item: PhantomData,
        }
    }
}

impl<T> ListSource for ApiListSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn fetch(
        &self,
        query: &QueryState,
    ) -> impl Future<Output = Result<ListResponse<T>, FetchError>> + Send {
        async move {
            self.client
                .get_list::<T>(&self.section, query)
                .await
                .map_err(FetchError::from)
        }
    }
}

/// A settled fetch, tagged with the generation that issued it.
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub generation: u64,
    pub result: Result<ListResponse<T>, FetchError>,
}

/// Runs each [`FetchRequest`] as its own task and reports the outcome on a
/// channel.
///
/// In-flight requests are never aborted. A superseded request still
/// completes and reports; the state machine drops it by generation.
pub struct ListFetcher<S: ListSource> {
    source: Arc<S>,
    outcomes: mpsc::UnboundedSender<FetchOutcome<S::Item>>,
}

impl<S: ListSource> ListFetcher<S> {
    pub fn new(source: Arc<S>, outcomes: mpsc::UnboundedSender<FetchOutcome<S::Item>>) -> Self {
        Self { source, outcomes }
    }

    /// Spawns the request onto the current tokio runtime.
    pub fn dispatch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let FetchRequest { generation, query } = request;
            let result = source.fetch(&query).await;
            match &result {
                Ok(response) => tracing::debug!(
                    "Generation {} returned {} items ({})",
                    generation,
                    response.items.len(),
                    if response.is_paginated() { "paginated" } else { "unpaginated" }
                ),
                Err(e) => tracing::debug!("Generation {} settled with {}", generation, e.reason()),
            }
            if outcomes.send(FetchOutcome { generation, result }).is_err() {
                tracing::debug!("Session ended before generation {} settled", generation);
            }
        });
    }
}
