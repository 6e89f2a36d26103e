//! Async driver for one list session.
//!
//! The controller owns the [`SyncState`], turns user actions and fragment
//! changes into events, runs the fetches the state machine asks for, and
//! publishes every new snapshot on a `watch` channel. All transitions happen
//! on the task that calls into the controller, one event at a time.

use std::sync::Arc;
use std::time::Duration;

use jobboard_api::{ListSection, QueryState};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::fetcher::{FetchOutcome, ListFetcher, ListSource};
use crate::fragment::{FragmentBridge, FragmentSubscription, NavigationSurface};
use crate::state::{ListSnapshot, SyncEvent, SyncState};

/// Quiet period before typed search text is committed.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// How a session starts.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Fragment section key this session answers to.
    pub section_key: String,
    /// Initial query; a search found in the fragment overrides its text.
    pub query: QueryState,
    pub search_debounce: Duration,
}

impl SessionOptions {
    pub fn for_section(section: &ListSection) -> Self {
        Self {
            section_key: section.key.to_string(),
            query: QueryState::for_section(section),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }

    pub fn with_query(mut self, query: QueryState) -> Self {
        self.query = query;
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }
}

struct PendingSearch {
    text: String,
    deadline: Instant,
}

enum Wake<T> {
    Outcome(FetchOutcome<T>),
    Fragment(bool),
    Debounce,
}

/// Drives one list session against a [`ListSource`] and a
/// [`NavigationSurface`].
///
/// The fragment subscription is taken in [`SyncController::start`] and
/// released when the controller is closed or dropped.
pub struct SyncController<S, N>
where
    S: ListSource,
    N: NavigationSurface + ?Sized + 'static,
{
    state: SyncState<S::Item>,
    fetcher: ListFetcher<S>,
    outcomes: mpsc::UnboundedReceiver<FetchOutcome<S::Item>>,
    fragment_events: mpsc::UnboundedReceiver<()>,
    fragment_open: bool,
    bridge: FragmentBridge<N>,
    subscription: Option<FragmentSubscription<N>>,
    snapshots: watch::Sender<ListSnapshot<S::Item>>,
    pending_search: Option<PendingSearch>,
    search_debounce: Duration,
}

impl<S, N> SyncController<S, N>
where
    S: ListSource,
    S::Item: Clone,
    N: NavigationSurface + ?Sized + 'static,
{
    /// Subscribes to the surface, seeds the search from the current
    /// fragment and issues the first fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(source: Arc<S>, surface: Arc<N>, options: SessionOptions) -> Self {
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();
        let (fragment_tx, fragment_events) = mpsc::unbounded_channel();

        let bridge = FragmentBridge::new(surface, &options.section_key);
        let subscription = bridge.subscribe(Arc::new(move || {
            let _ = fragment_tx.send(());
        }));

        let state = SyncState::new(options.query);
        let (snapshots, _) = watch::channel(state.snapshot().clone());

        let mut controller = Self {
            state,
            fetcher: ListFetcher::new(source, outcome_tx),
            outcomes,
            fragment_events,
            fragment_open: true,
            bridge,
            subscription: Some(subscription),
            snapshots,
            pending_search: None,
            search_debounce: options.search_debounce,
        };

        let seed = controller
            .bridge
            .read(controller.state.query().search_text());
        controller.apply(SyncEvent::Fragment(seed));
        controller.apply(SyncEvent::Start);
        tracing::debug!("Started {} session", options.section_key);
        controller
    }

    pub fn query(&self) -> &QueryState {
        self.state.query()
    }

    pub fn snapshot(&self) -> &ListSnapshot<S::Item> {
        self.state.snapshot()
    }

    /// Generation of the most recently issued fetch.
    pub fn generation(&self) -> u64 {
        self.state.generation()
    }

    pub fn section_key(&self) -> &str {
        self.bridge.section_key()
    }

    /// A receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<S::Item>> {
        self.snapshots.subscribe()
    }

    /// True while a fetch result or a debounced search is outstanding.
    pub fn is_busy(&self) -> bool {
        self.state.is_awaiting() || self.pending_search.is_some()
    }

    /// Commits `text` as the search, cancelling any pending typed search,
    /// and mirrors it into the fragment.
    pub fn commit_search(&mut self, text: &str) {
        self.pending_search = None;
        self.apply(SyncEvent::SearchCommitted(text.to_string()));
        self.bridge.write(self.state.query().search_text());
    }

    /// Records typed search text; it is committed once no further text
    /// arrives for the debounce period.
    pub fn type_search(&mut self, text: &str) {
        if self.search_debounce.is_zero() {
            self.commit_search(text);
            return;
        }
        self.pending_search = Some(PendingSearch {
            text: text.to_string(),
            deadline: Instant::now() + self.search_debounce,
        });
    }

    pub fn set_status(&mut self, status: Option<&str>) {
        self.apply(SyncEvent::StatusChanged(status.map(str::to_string)));
    }

    pub fn select_sort(&mut self, field: &str) {
        self.apply(SyncEvent::SortSelected(field.to_string()));
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.apply(SyncEvent::PageSizeChanged(page_size));
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.apply(SyncEvent::PageRequested(page));
    }

    /// Re-issues the current query.
    pub fn retry(&mut self) {
        self.apply(SyncEvent::Retry);
    }

    /// Applies every fragment change notified so far.
    pub fn apply_fragment_events(&mut self) {
        while self.fragment_events.try_recv().is_ok() {
            self.on_fragment_changed();
        }
    }

    /// Applies one outcome, fragment change or debounce expiry. Anything
    /// already delivered is applied without waiting; otherwise waits while a
    /// fetch or typed search is outstanding. Returns `false` when there was
    /// nothing to apply and nothing to wait for.
    pub async fn process_next(&mut self) -> bool {
        if let Ok(outcome) = self.outcomes.try_recv() {
            self.apply_outcome(outcome);
            return true;
        }
        if self.fragment_events.try_recv().is_ok() {
            self.on_fragment_changed();
            return true;
        }
        if !self.is_busy() {
            return false;
        }

        let deadline = self.pending_search.as_ref().map(|p| p.deadline);
        let wake = tokio::select! {
            Some(outcome) = self.outcomes.recv() => Wake::Outcome(outcome),
            event = self.fragment_events.recv(), if self.fragment_open => Wake::Fragment(event.is_some()),
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Debounce,
            else => return false,
        };

        match wake {
            Wake::Outcome(outcome) => self.apply_outcome(outcome),
            Wake::Fragment(true) => self.on_fragment_changed(),
            Wake::Fragment(false) => {
                tracing::debug!("Navigation surface dropped the fragment listener");
                self.fragment_open = false;
            }
            Wake::Debounce => {
                if let Some(pending) = self.pending_search.take() {
                    self.commit_search(&pending.text);
                }
            }
        }
        true
    }

    /// Processes events until nothing is outstanding and returns the
    /// resulting snapshot.
    pub async fn settle(&mut self) -> &ListSnapshot<S::Item> {
        while self.process_next().await {}
        self.state.snapshot()
    }

    /// Ends the session, releasing the fragment subscription.
    pub fn close(mut self) -> ListSnapshot<S::Item> {
        self.subscription.take();
        self.state.snapshot().clone()
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome<S::Item>) {
        let FetchOutcome { generation, result } = outcome;
        self.apply(SyncEvent::Fetched { generation, result });
    }

    fn on_fragment_changed(&mut self) {
        let change = self.bridge.read(self.state.query().search_text());
        self.apply(SyncEvent::Fragment(change));
    }

    fn apply(&mut self, event: SyncEvent<S::Item>) {
        if let Some(request) = self.state.handle(event) {
            self.fetcher.dispatch(request);
        }
        self.snapshots.send_replace(self.state.snapshot().clone());
    }
}
