//! Search orchestration
//!
//! [`SearchOrchestrator`] decides when a request is made and whether its
//! result is applied. Typed queries are debounced. Every fetch is tagged
//! with a generation number and a response is applied only while its
//! generation is still current, so a superseded request can never change
//! what is on screen regardless of when it completes.

mod retry;
mod session;
mod state;

#[cfg(test)]
mod tests;

pub use state::{SearchFailure, SearchPhase, SearchSnapshot};

use crate::cache::ResultCache;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::github::{CodeSearchClient, PageRequest};
use crate::history::{HistoryFilters, SearchHistoryStore};
use crate::query::{parse_search_query, qualifier, SearchFilter};
use crate::validation::{validate_search_query, SearchFilters, SearchRequest};
use retry::{fetch_with_retry, RetryPolicy};
use session::SearchSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Mutable orchestrator state. The lock guarding it is never held across
/// an await point.
#[derive(Default)]
struct OrchestratorState {
    /// Bumped whenever a fetch starts or the current one is abandoned
    generation: u64,
    session: Option<SearchSession>,
    /// Query waiting for its debounce timer
    pending_query: Option<String>,
    /// Last query whose page-1 fetch was started
    last_executed: Option<String>,
    debounce: Option<CancellationToken>,
    debounce_seq: u64,
    in_flight: Option<CancellationToken>,
    phase: SearchPhase,
    is_loading: bool,
    error: Option<SearchFailure>,
}

impl OrchestratorState {
    fn snapshot(&self) -> SearchSnapshot {
        let query = match (&self.pending_query, &self.session) {
            (Some(pending), _) => pending.clone(),
            (None, Some(session)) => session.query.clone(),
            (None, None) => String::new(),
        };

        match &self.session {
            Some(session) => SearchSnapshot {
                query,
                results: Arc::clone(&session.results),
                is_loading: self.is_loading,
                error: self.error.clone(),
                has_more: session.has_more,
                total_results: session.total_count,
                filtered_out_count: session.filtered_out_count,
                phase: self.phase,
            },
            None => SearchSnapshot {
                query,
                is_loading: self.is_loading,
                error: self.error.clone(),
                phase: self.phase,
                ..Default::default()
            },
        }
    }

    fn cancel_debounce(&mut self) -> bool {
        self.pending_query = None;
        match self.debounce.take() {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(cancel) = self.in_flight.take() {
            cancel.cancel();
        }
    }

    /// Leave the loading state, staying in `Debouncing` if a timer is
    /// pending. A rejected input reported mid-fetch keeps `Error`.
    fn settle(&mut self) {
        self.is_loading = false;
        self.in_flight = None;
        self.phase = if self.debounce.is_some() {
            SearchPhase::Debouncing
        } else if self.error.is_some() {
            SearchPhase::Error
        } else {
            SearchPhase::Idle
        };
    }

    /// Surface a problem with newly submitted input. Work already in
    /// flight for the previous query is left alone.
    fn reject(&mut self, err: SearchError) {
        self.cancel_debounce();
        if !self.is_loading {
            self.phase = SearchPhase::Error;
        }
        self.error = Some(SearchFailure::from(err));
    }

    fn fail(&mut self, err: SearchError) {
        self.error = Some(SearchFailure::from(err));
        self.settle();
        // Allow the same query to be submitted again
        self.last_executed = None;
        if let Some(session) = self.session.as_mut() {
            session.has_more = false;
        }
    }
}

/// Work order for one fetch flow: a page and any backfill pages after it
struct FetchTicket {
    generation: u64,
    query: String,
    page: u32,
    token: String,
    cancel: CancellationToken,
    /// Consecutive pages whose items were all filtered out
    empty_pages: u32,
}

struct Inner {
    client: Arc<dyn CodeSearchClient>,
    cache: Arc<ResultCache>,
    history: Option<Arc<SearchHistoryStore>>,
    config: SearchConfig,
    exclude_non_programming: AtomicBool,
    token: RwLock<Option<String>>,
    state: Mutex<OrchestratorState>,
    snapshot_tx: watch::Sender<SearchSnapshot>,
}

/// Builder for [`SearchOrchestrator`]
pub struct SearchOrchestratorBuilder {
    client: Arc<dyn CodeSearchClient>,
    config: SearchConfig,
    cache: Option<Arc<ResultCache>>,
    history: Option<Arc<SearchHistoryStore>>,
    token: Option<String>,
}

impl SearchOrchestratorBuilder {
    /// Share an existing result cache
    pub fn cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Record executed queries into a history store
    pub fn history(mut self, history: Arc<SearchHistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn build(self) -> SearchOrchestrator {
        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(ResultCache::new(
                self.config.cache_capacity,
                self.config.cache_duration(),
            ))
        });
        let (snapshot_tx, _) = watch::channel(SearchSnapshot::default());

        SearchOrchestrator {
            inner: Arc::new(Inner {
                client: self.client,
                cache,
                history: self.history,
                exclude_non_programming: AtomicBool::new(self.config.exclude_non_programming),
                config: self.config,
                token: RwLock::new(self.token),
                state: Mutex::new(OrchestratorState::default()),
                snapshot_tx,
            }),
        }
    }
}

/// Coordinates debounced searches, paging and caching for one view.
///
/// Cloning yields another handle to the same orchestrator. `search_code`,
/// `load_more` and the setters spawn their work on the current Tokio
/// runtime and return immediately; progress is observed through
/// [`SearchOrchestrator::subscribe`].
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

impl SearchOrchestrator {
    pub fn builder(client: Arc<dyn CodeSearchClient>, config: SearchConfig) -> SearchOrchestratorBuilder {
        SearchOrchestratorBuilder {
            client,
            config,
            cache: None,
            history: None,
            token: None,
        }
    }

    /// Orchestrator with its own cache and no history
    pub fn new(client: Arc<dyn CodeSearchClient>, config: SearchConfig) -> Self {
        Self::builder(client, config).build()
    }

    /// Submit the text currently typed by the user.
    ///
    /// Empty input clears the session immediately. Input shorter than the
    /// minimum length, or equal to the query last executed, is ignored.
    /// Anything else is executed once the debounce delay passes without a
    /// newer submission.
    pub fn search_code(&self, raw_query: &str) {
        let inner = &self.inner;
        let query = raw_query.trim();

        if query.is_empty() {
            self.clear();
            return;
        }

        if query.chars().count() < inner.config.min_query_length {
            debug!("Ignoring short query {:?}", query);
            return;
        }

        let mut state = inner.lock();

        if state.last_executed.as_deref() == Some(query) {
            debug!("Query {:?} already executed", query);
            if state.cancel_debounce() {
                // Typed away and back again before the timer fired
                state.phase = if state.is_loading {
                    SearchPhase::Fetching
                } else {
                    SearchPhase::Idle
                };
                inner.publish(&state);
            }
            return;
        }

        if inner.current_token().is_none() {
            state.reject(SearchError::MissingToken);
            inner.publish(&state);
            return;
        }

        if let Err(err) = validate_search_query(&validation_request(query)) {
            debug!("Rejected query {:?}: {}", query, err);
            state.reject(SearchError::from(err));
            inner.publish(&state);
            return;
        }

        state.cancel_debounce();
        state.debounce_seq += 1;
        let seq = state.debounce_seq;
        let timer = CancellationToken::new();
        state.debounce = Some(timer.clone());
        state.pending_query = Some(query.to_string());
        state.error = None;
        state.phase = SearchPhase::Debouncing;
        inner.publish(&state);
        drop(state);

        let inner = Arc::clone(inner);
        let query = query.to_string();
        let delay = inner.config.debounce_delay();
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(delay) => inner.fire_debounce(seq, query).await,
            }
        });
    }

    /// Fetch the next page of the current query right away.
    ///
    /// Returns false without doing anything while a fetch or debounce is
    /// pending, when no pages remain, or when there is no active query.
    pub fn load_more(&self) -> bool {
        let inner = &self.inner;

        let ticket = {
            let mut state = inner.lock();
            if state.is_loading || state.debounce.is_some() {
                return false;
            }

            let Some(session) = state.session.as_ref() else {
                return false;
            };
            if !session.has_more {
                return false;
            }
            let query = session.query.clone();
            let page = session.current_page + 1;

            let Some(token) = inner.current_token() else {
                state.fail(SearchError::MissingToken);
                inner.publish(&state);
                return false;
            };

            state.generation += 1;
            let generation = state.generation;
            state.cancel_in_flight();
            state.error = None;
            debug!("Loading page {} of {:?}", page, query);
            inner.issue(&mut state, generation, query, page, token, 0)
        };

        let inner = Arc::clone(inner);
        tokio::spawn(async move { inner.run(ticket).await });
        true
    }

    /// Drop the session and abandon any pending or in-flight work
    pub fn clear(&self) {
        let inner = &self.inner;
        let mut state = inner.lock();

        state.generation += 1;
        state.cancel_debounce();
        state.cancel_in_flight();
        state.session = None;
        state.last_executed = None;
        state.error = None;
        state.settle();
        inner.publish(&state);
    }

    /// Abandon pending and in-flight work but keep the results on screen
    pub fn cancel(&self) {
        let inner = &self.inner;
        let mut state = inner.lock();

        state.generation += 1;
        state.cancel_debounce();
        if state.in_flight.is_some() {
            state.cancel_in_flight();
            // The interrupted query may be submitted again
            state.last_executed = None;
        }
        state.settle();
        inner.publish(&state);
    }

    /// Replace the token used for subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn exclude_non_programming(&self) -> bool {
        self.inner.exclude_non_programming.load(Ordering::SeqCst)
    }

    /// Toggle the non-programming file filter.
    ///
    /// The current query is re-applied from its first page, which is
    /// normally served from the cache.
    pub fn set_exclude_non_programming(&self, exclude: bool) {
        let inner = &self.inner;
        if inner.exclude_non_programming.swap(exclude, Ordering::SeqCst) == exclude {
            return;
        }
        debug!("Non-programming file filter {}", if exclude { "enabled" } else { "disabled" });

        let ticket = {
            let mut state = inner.lock();
            if state.debounce.is_some() {
                // The pending query picks up the new setting
                return;
            }
            let Some(query) = state.session.as_ref().map(|s| s.query.clone()) else {
                return;
            };
            inner.start_query(&mut state, query)
        };

        if let Some(ticket) = ticket {
            let inner = Arc::clone(inner);
            tokio::spawn(async move { inner.run(ticket).await });
        }
    }

    /// Latest published state
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.inner.cache
    }

    pub fn history(&self) -> Option<&Arc<SearchHistoryStore>> {
        self.inner.history.as_ref()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, OrchestratorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &OrchestratorState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn exclude(&self) -> bool {
        self.exclude_non_programming.load(Ordering::SeqCst)
    }

    async fn fire_debounce(&self, seq: u64, query: String) {
        let ticket = {
            let mut state = self.lock();
            if state.debounce_seq != seq || state.debounce.is_none() {
                return;
            }
            state.debounce = None;
            state.pending_query = None;
            self.start_query(&mut state, query)
        };

        if let Some(ticket) = ticket {
            self.run(ticket).await;
        }
    }

    /// Begin page 1 of `query` under a new generation. Returns `None` when
    /// the cache answered without any network call left to make.
    fn start_query(&self, state: &mut OrchestratorState, query: String) -> Option<FetchTicket> {
        state.generation += 1;
        let generation = state.generation;
        state.cancel_in_flight();
        state.error = None;
        state.last_executed = Some(query.clone());

        let Some(token) = self.current_token() else {
            state.fail(SearchError::MissingToken);
            self.publish(state);
            return None;
        };

        let mut session = SearchSession::new(query.clone());

        if let Some(cached) = self.cache.get(&query) {
            let exclude = self.exclude();
            let added =
                session.apply_page(cached.items, 1, cached.total_count, exclude, &self.config);
            let backfill = exclude && added == 0 && session.has_more;
            debug!("Serving {:?} from cache ({} results)", query, session.len());

            state.session = Some(session);
            self.record_history(&query);

            if backfill && self.config.max_retries > 0 {
                return Some(self.issue(state, generation, query, 2, token, 1));
            }
            state.settle();
            self.publish(state);
            return None;
        }

        state.session = Some(session);
        Some(self.issue(state, generation, query, 1, token, 0))
    }

    /// Mark a fetch as in flight and publish the loading state
    fn issue(
        &self,
        state: &mut OrchestratorState,
        generation: u64,
        query: String,
        page: u32,
        token: String,
        empty_pages: u32,
    ) -> FetchTicket {
        let cancel = CancellationToken::new();
        state.in_flight = Some(cancel.clone());
        state.is_loading = true;
        state.phase = SearchPhase::Fetching;
        self.publish(state);

        FetchTicket {
            generation,
            query,
            page,
            token,
            cancel,
            empty_pages,
        }
    }

    /// Fetch pages for a ticket, backfilling while the filter hides
    /// everything a page returned.
    async fn run(&self, mut ticket: FetchTicket) {
        let policy = RetryPolicy::from_config(&self.config);

        loop {
            let request = PageRequest::new(ticket.query.as_str(), ticket.page, self.config.per_page);
            debug!(
                "Fetching page {} of {:?} (generation {})",
                ticket.page, ticket.query, ticket.generation
            );

            let result = fetch_with_retry(
                self.client.as_ref(),
                &request,
                &ticket.token,
                &ticket.cancel,
                &policy,
            )
            .await;

            let mut state = self.lock();
            if state.generation != ticket.generation {
                debug!(
                    "Discarding page {} of {:?} from superseded generation {}",
                    ticket.page, ticket.query, ticket.generation
                );
                return;
            }

            let page = match result {
                Ok(page) => page,
                Err(SearchError::Cancelled) => {
                    debug!("Fetch of {:?} cancelled", ticket.query);
                    state.settle();
                    self.publish(&state);
                    return;
                }
                Err(err) => {
                    debug!("Search for {:?} failed: {}", ticket.query, err);
                    state.fail(err);
                    self.publish(&state);
                    return;
                }
            };

            let raw = Arc::new(page.items);
            if ticket.page == 1 {
                self.cache
                    .set(ticket.query.clone(), Arc::clone(&raw), page.total_count);
            }

            let exclude = self.exclude();
            let Some(session) = state.session.as_mut() else {
                return;
            };
            let added =
                session.apply_page(raw, ticket.page, page.total_count, exclude, &self.config);
            let backfill = exclude
                && added == 0
                && session.has_more
                && ticket.empty_pages < self.config.max_retries;
            debug!(
                "Page {} of {:?}: {} new, {} shown of {} total",
                ticket.page,
                ticket.query,
                added,
                session.len(),
                session.total_count
            );

            if ticket.page == 1 {
                self.record_history(&ticket.query);
            }

            if backfill {
                debug!(
                    "Page {} of {:?} was entirely filtered out, fetching the next one",
                    ticket.page, ticket.query
                );
                ticket.page += 1;
                ticket.empty_pages += 1;
                self.publish(&state);
                continue;
            }

            state.settle();
            self.publish(&state);
            return;
        }
    }

    fn record_history(&self, query: &str) {
        if let Some(history) = &self.history {
            history.add(query, history_filters(query));
        }
    }
}

fn non_empty<'a>(filters: &'a [SearchFilter], key: &str) -> Option<&'a str> {
    qualifier(filters, key).filter(|value| !value.is_empty())
}

/// Structured filters used to validate the qualifiers inside a query
fn validation_request(query: &str) -> SearchRequest {
    let filters = parse_search_query(query);
    let repo = non_empty(&filters, "repo");

    let owner = non_empty(&filters, "user")
        .or_else(|| non_empty(&filters, "org"))
        .or_else(|| repo.and_then(|r| r.split_once('/').map(|(owner, _)| owner)));
    let repo_name = repo.and_then(|r| r.rsplit('/').next());

    SearchRequest::new(query).with_filters(SearchFilters {
        language: non_empty(&filters, "language").map(str::to_string),
        owner: owner.filter(|o| !o.is_empty()).map(str::to_string),
        repo: repo_name.filter(|r| !r.is_empty()).map(str::to_string),
    })
}

fn history_filters(query: &str) -> Option<HistoryFilters> {
    let filters = parse_search_query(query);
    let recorded = HistoryFilters {
        language: non_empty(&filters, "language").map(str::to_string),
        stars: non_empty(&filters, "stars").map(str::to_string),
        updated_at: non_empty(&filters, "pushed").map(str::to_string),
    };

    if recorded == HistoryFilters::default() {
        None
    } else {
        Some(recorded)
    }
}
