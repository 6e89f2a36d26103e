use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobboard_lib::jobboard_api::section::COMPANIES;
use jobboard_lib::jobboard_api::types::ListResponse;
use jobboard_lib::{
    FailureReason, FetchError, ListSource, MemoryLocation, NavigationSurface, Phase, QueryState,
    SessionOptions, SyncController,
};

/// In-memory list endpoint with per-search latency and injectable failures.
struct ScriptedSource {
    names: Vec<String>,
    paginate: bool,
    delays: HashMap<String, Duration>,
    failures: Mutex<Vec<FetchError>>,
    calls: Mutex<Vec<QueryState>>,
}

impl ScriptedSource {
    fn paginated(count: usize) -> Self {
        Self::with_names(company_names(count), true)
    }

    fn unpaginated(names: Vec<String>) -> Self {
        Self::with_names(names, false)
    }

    fn with_names(names: Vec<String>, paginate: bool) -> Self {
        Self {
            names,
            paginate,
            delays: HashMap::new(),
            failures: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn delay(mut self, search: &str, delay: Duration) -> Self {
        self.delays.insert(search.to_string(), delay);
        self
    }

    fn fail_next(&self, error: FetchError) {
        self.failures.lock().unwrap().push(error);
    }

    fn calls(&self) -> Vec<QueryState> {
        self.calls.lock().unwrap().clone()
    }
}

impl ListSource for ScriptedSource {
    type Item = String;

    fn fetch(
        &self,
        query: &QueryState,
    ) -> impl Future<Output = Result<ListResponse<String>, FetchError>> + Send {
        let query = query.clone();
        async move {
            self.calls.lock().unwrap().push(query.clone());
            let term = query.search_term().unwrap_or("").to_string();
            if let Some(delay) = self.delays.get(&term) {
                tokio::time::sleep(*delay).await;
            }
            let failure = self.failures.lock().unwrap().pop();
            if let Some(e) = failure {
                return Err(e);
            }

            let needle = term.to_lowercase();
            let matching: Vec<String> = self
                .names
                .iter()
                .filter(|n| n.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            if !self.paginate {
                return Ok(ListResponse::unpaginated(matching));
            }
            let size = query.page_size() as usize;
            let start = (query.page() as usize - 1) * size;
            let page = matching.iter().skip(start).take(size).cloned().collect();
            Ok(ListResponse::paginated(page, matching.len() as u64))
        }
    }
}

fn company_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Company {:02}", i)).collect()
}

fn start(
    source: &Arc<ScriptedSource>,
    location: &Arc<MemoryLocation>,
    query: QueryState,
) -> SyncController<ScriptedSource, MemoryLocation> {
    let options = SessionOptions::for_section(&COMPANIES).with_query(query);
    SyncController::start(Arc::clone(source), Arc::clone(location), options)
}

#[tokio::test(start_paused = true)]
async fn start_loads_first_page() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    assert!(controller.snapshot().is_loading());
    let snapshot = controller.settle().await;

    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.items.len(), 10);
    assert_eq!(snapshot.items[0], "Company 01");
    assert_eq!(snapshot.pagination.total_pages, 5);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_seeds_search_from_fragment() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new("#companies?search=Company+1"));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    controller.settle().await;

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search_term(), Some("Company 1"));
    assert_eq!(controller.snapshot().items.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn fragment_for_other_section_is_ignored() {
    let source = Arc::new(ScriptedSource::paginated(5));
    let location = Arc::new(MemoryLocation::new("#jobs?search=driver"));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    controller.settle().await;
    assert_eq!(controller.query().search_term(), None);
}

#[tokio::test(start_paused = true)]
async fn search_resets_page_and_clamps_unpaginated_result() {
    let mut names = company_names(19);
    names.extend(["Acme Tools", "Acme Labs", "ACME Freight", "Bright Acme"].map(String::from));
    let source = Arc::new(ScriptedSource::unpaginated(names));
    let location = Arc::new(MemoryLocation::new(""));
    let query = QueryState::for_section(&COMPANIES).with_page(3);
    let mut controller = start(&source, &location, query);

    let snapshot = controller.settle().await;
    assert_eq!(snapshot.pagination.page, 3);
    assert_eq!(snapshot.pagination.total_pages, 3);
    assert_eq!(snapshot.items.len(), 3);

    controller.commit_search("acme");
    assert_eq!(controller.query().page(), 1);
    assert!(controller.snapshot().is_loading());

    let snapshot = controller.settle().await;
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.pagination.page, 1);
    assert_eq!(snapshot.pagination.total_pages, 1);
    assert_eq!(snapshot.items.len(), 4);
    assert_eq!(location.fragment(), "#companies?search=acme");
}

#[tokio::test(start_paused = true)]
async fn out_of_range_page_issues_one_corrective_fetch() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let query = QueryState::for_section(&COMPANIES).with_page(6);
    let mut controller = start(&source, &location, query);

    let snapshot = controller.settle().await.clone();

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].page(), 6);
    assert_eq!(calls[1].page(), 5);
    assert_eq!(snapshot.pagination.page, 5);
    assert_eq!(snapshot.pagination.total_pages, 5);
    assert_eq!(snapshot.items.len(), 5);
    assert_eq!(snapshot.items[0], "Company 41");
    assert_eq!(controller.query().page(), 5);
}

#[tokio::test(start_paused = true)]
async fn fragment_navigation_drives_search() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new("#companies"));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    controller.settle().await;
    controller.go_to_page(3);
    controller.settle().await;

    location.set_fragment("#companies?search=Company+4");
    controller.apply_fragment_events();
    assert_eq!(controller.query().search_text(), "Company 4");
    assert_eq!(controller.query().page(), 1);
    assert!(controller.snapshot().is_loading());

    let snapshot = controller.settle().await;
    assert_eq!(
        snapshot.items,
        vec!["Company 40", "Company 41", "Company 42", "Company 43", "Company 44", "Company 45"]
    );

    location.set_fragment("#companies");
    controller.settle().await;
    assert_eq!(controller.query().search_term(), None);
    assert_eq!(controller.query().page(), 1);
    assert_eq!(controller.snapshot().items.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn equivalent_fragment_does_not_refetch() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    controller.commit_search("Company 1");
    controller.settle().await;
    let generation = controller.generation();
    let calls = source.calls().len();

    location.set_fragment("#companies?search=Company%201");
    controller.settle().await;

    assert_eq!(controller.generation(), generation);
    assert_eq!(source.calls().len(), calls);
}

#[tokio::test(start_paused = true)]
async fn padded_search_commit_fetches_once() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    controller.settle().await;
    let generation = controller.generation();

    controller.commit_search("Company 1 ");
    controller.settle().await;

    assert_eq!(controller.generation(), generation + 1);
    assert_eq!(source.calls().len(), 2);
    assert_eq!(location.fragment(), "#companies?search=Company+1");
    assert_eq!(controller.query().search_term(), Some("Company 1"));
    assert_eq!(controller.snapshot().items.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn unchanged_query_is_not_refetched() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    controller.settle().await;

    controller.go_to_page(1);
    controller.commit_search("");
    controller.set_status(None);

    assert!(!controller.is_busy());
    assert_eq!(controller.generation(), 1);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn process_next_returns_when_idle() {
    let source = Arc::new(ScriptedSource::paginated(5));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    assert!(controller.process_next().await);
    assert!(!controller.is_busy());
    assert!(!controller.process_next().await);

    location.set_fragment("#companies?search=Company+2");
    assert!(controller.process_next().await);
    assert!(controller.snapshot().is_loading());
}

#[tokio::test(start_paused = true)]
async fn slow_superseded_response_is_discarded() {
    let source = Arc::new(
        ScriptedSource::paginated(45)
            .delay("Company 1", Duration::from_millis(200))
            .delay("Company 2", Duration::from_millis(10)),
    );
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    controller.commit_search("Company 1");
    controller.commit_search("Company 2");
    let snapshot = controller.settle().await;
    assert_eq!(snapshot.items[0], "Company 02");
    assert_eq!(snapshot.items[1], "Company 20");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(controller.process_next().await);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.items[0], "Company 02");
    assert_eq!(controller.query().search_text(), "Company 2");
    assert_eq!(source.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn typed_search_is_debounced() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    controller.settle().await;

    controller.type_search("C");
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.type_search("Company");
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.type_search("Company 3");
    assert!(controller.is_busy());
    assert_eq!(controller.query().search_term(), None);

    controller.settle().await;

    let searches: Vec<_> = source
        .calls()
        .iter()
        .filter_map(|q| q.search_term().map(str::to_string))
        .collect();
    assert_eq!(searches, vec!["Company 3"]);
    assert_eq!(location.fragment(), "#companies?search=Company+3");
}

#[tokio::test(start_paused = true)]
async fn commit_cancels_pending_typed_search() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    controller.type_search("Company 1");
    controller.commit_search("Company 2");
    controller.settle().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(!controller.is_busy());
    assert_eq!(controller.query().search_text(), "Company 2");
}

#[tokio::test(start_paused = true)]
async fn failure_keeps_items_until_retry() {
    let source = Arc::new(ScriptedSource::paginated(45));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    controller.settle().await;

    source.fail_next(FetchError::NetworkFailure("connection reset".to_string()));
    controller.go_to_page(2);
    let snapshot = controller.settle().await;
    assert_eq!(snapshot.phase, Phase::Error(FailureReason::NetworkFailure));
    assert_eq!(snapshot.items[0], "Company 01");
    assert!(snapshot.last_error.is_some());

    controller.retry();
    let snapshot = controller.settle().await;
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.items[0], "Company 11");
    assert_eq!(snapshot.last_error, None);
}

#[tokio::test(start_paused = true)]
async fn unchanged_query_after_failure_retries() {
    let source = Arc::new(ScriptedSource::paginated(45));
    source.fail_next(FetchError::MalformedResponse("expected list".to_string()));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));

    let snapshot = controller.settle().await;
    assert_eq!(snapshot.phase, Phase::Error(FailureReason::MalformedResponse));

    controller.go_to_page(1);
    let snapshot = controller.settle().await;
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn watchers_see_published_snapshots() {
    let source = Arc::new(ScriptedSource::paginated(12));
    let location = Arc::new(MemoryLocation::new(""));
    let mut controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    let watcher = controller.subscribe();
    assert!(watcher.borrow().is_loading());

    controller.set_page_size(5);
    controller.settle().await;

    let seen = watcher.borrow();
    assert_eq!(seen.phase, Phase::Ready);
    assert_eq!(seen.pagination.page_size, 5);
    assert_eq!(seen.pagination.total_pages, 3);
    assert_eq!(seen.items.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn closing_releases_fragment_subscription() {
    let source = Arc::new(ScriptedSource::paginated(3));
    let location = Arc::new(MemoryLocation::new(""));
    let controller = start(&source, &location, QueryState::for_section(&COMPANIES));
    assert_eq!(location.listener_count(), 1);

    controller.close();
    assert_eq!(location.listener_count(), 0);

    {
        let _second = start(&source, &location, QueryState::for_section(&COMPANIES));
        assert_eq!(location.listener_count(), 1);
    }
    assert_eq!(location.listener_count(), 0);
}
