use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use shared::{
    domain::{CardId, SetId},
    error::FetchError,
    protocol::{CardSummary, SetSummary},
};

pub mod config;
pub mod provider;
pub mod sort;
pub mod state;

use crate::provider::{CardPage, CatalogProvider, MissingCatalogProvider};
use crate::sort::SortSpec;
use crate::state::{reduce, Action, ViewMode, ViewerState, MIN_SEARCH_LEN};

/// Descriptor of one network operation. At most one of these is
/// authoritative at any instant; issuing a new one supersedes the old.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    ListSets,
    ListSetCards { set_id: SetId, page: u32 },
    SearchCards { term: String },
}

/// Completion notifications for frontends. These carry summaries only;
/// renderers pull [`ViewerHandle::snapshot`] for the data.
#[derive(Debug, Clone)]
pub enum ViewerEvent {
    SetsLoaded { count: usize },
    SetsLoadFailed { message: String },
    CardsLoaded { count: usize, page: Option<u32> },
    SearchCompleted { term: String, count: usize },
    RequestFailed { message: String },
    ViewReset,
}

enum RequestOutcome {
    Sets(Vec<SetSummary>),
    CardPage(CardPage),
    SearchResults(Vec<CardSummary>),
}

/// Owns the view state and the single authoritative in-flight request.
///
/// Supersession is tracked by a monotonically increasing generation: every
/// issued request captures the counter value, and a completion is applied
/// only while its generation is still current. The stored join handle is
/// aborted as a best-effort resource release; correctness never depends on
/// the abort landing, only on the generation check.
pub struct ViewerClient {
    provider: Arc<dyn CatalogProvider>,
    inner: Mutex<ViewerState>,
    generation: AtomicU64,
    inflight: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ViewerEvent>,
}

impl ViewerClient {
    /// Client with no provider attached; every request surfaces a failure.
    pub fn new() -> Arc<Self> {
        Self::with_provider(Arc::new(MissingCatalogProvider))
    }

    pub fn with_provider(provider: Arc<dyn CatalogProvider>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            provider,
            inner: Mutex::new(ViewerState::default()),
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
            events,
        })
    }

    /// Supersede whatever is in flight and start `request`. The optional
    /// action is applied atomically with the generation bump so a racing
    /// completion can never interleave between the two.
    async fn issue(self: &Arc<Self>, action: Option<Action>, request: CatalogRequest) -> u64 {
        let generation = {
            let mut guard = self.inner.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(action) = action {
                *guard = reduce(&guard, action);
            }
            generation
        };

        debug!(generation, ?request, "issuing catalog request");

        let client = Arc::clone(self);
        let task_request = request.clone();
        let handle = tokio::spawn(async move {
            let outcome = client.run_request(&task_request).await;
            if let Err(err) = client.complete(generation, &task_request, outcome).await {
                if err.is_cancelled() {
                    debug!(generation, "catalog completion suppressed");
                }
            }
        });

        let previous = self.inflight.lock().await.replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        generation
    }

    async fn run_request(&self, request: &CatalogRequest) -> Result<RequestOutcome, FetchError> {
        let result = match request {
            CatalogRequest::ListSets => self.provider.list_sets().await.map(RequestOutcome::Sets),
            CatalogRequest::ListSetCards { set_id, page } => self
                .provider
                .list_set_cards(set_id, *page)
                .await
                .map(RequestOutcome::CardPage),
            CatalogRequest::SearchCards { term } => self
                .provider
                .search_cards(term)
                .await
                .map(RequestOutcome::SearchResults),
        };
        result.map_err(|err| FetchError::RequestFailed(err.to_string()))
    }

    /// Apply a finished request. Returns `Err(FetchError::Cancelled)` when
    /// the request was superseded while in flight; a superseded outcome,
    /// success or failure, must not touch state or events.
    async fn complete(
        &self,
        generation: u64,
        request: &CatalogRequest,
        outcome: Result<RequestOutcome, FetchError>,
    ) -> Result<(), FetchError> {
        let mut guard = self.inner.lock().await;
        if generation != self.generation.load(Ordering::SeqCst) {
            return Err(FetchError::Cancelled);
        }

        match outcome {
            Ok(RequestOutcome::Sets(sets)) => {
                let count = sets.len();
                info!(count, "set listing loaded");
                *guard = reduce(&guard, Action::SetsLoaded(sets));
                let _ = self.events.send(ViewerEvent::SetsLoaded { count });
            }
            Ok(RequestOutcome::CardPage(page)) => {
                let count = page.cards.len();
                *guard = reduce(
                    &guard,
                    Action::CardsLoaded {
                        cards: page.cards,
                        total_count: page.total_count,
                    },
                );
                let current_page = guard.mode.page();
                info!(count, page = ?current_page, "card page loaded");
                let _ = self.events.send(ViewerEvent::CardsLoaded {
                    count,
                    page: current_page,
                });
            }
            Ok(RequestOutcome::SearchResults(cards)) => {
                let count = cards.len();
                let term = match request {
                    CatalogRequest::SearchCards { term } => term.clone(),
                    _ => String::new(),
                };
                info!(count, term_len = term.chars().count(), "search completed");
                *guard = reduce(&guard, Action::SearchLoaded(cards));
                let _ = self.events.send(ViewerEvent::SearchCompleted { term, count });
            }
            // A cancelled marker can only come from the generation check
            // above, never from the provider; treat it as suppressed.
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(FetchError::RequestFailed(message)) => {
                warn!(%message, ?request, "catalog request failed");
                let (action, event) = match request {
                    CatalogRequest::ListSets => (
                        Action::SetsLoadFailed(message.clone()),
                        ViewerEvent::SetsLoadFailed {
                            message: message.clone(),
                        },
                    ),
                    _ => (
                        Action::CardsFailed(message.clone()),
                        ViewerEvent::RequestFailed {
                            message: message.clone(),
                        },
                    ),
                };
                *guard = reduce(&guard, action);
                let _ = self.events.send(event);
            }
        }

        Ok(())
    }

    async fn dispatch(&self, action: Action) {
        let mut guard = self.inner.lock().await;
        *guard = reduce(&guard, action);
    }

    /// Cancel in-flight work and reset the view to its initial shape.
    /// Favorites and the sort selection survive the reset.
    async fn reset_to_home(self: &Arc<Self>) {
        {
            let mut guard = self.inner.lock().await;
            self.generation.fetch_add(1, Ordering::SeqCst);
            *guard = reduce(&guard, Action::WentHome);
        }
        let previous = self.inflight.lock().await.take();
        if let Some(previous) = previous {
            previous.abort();
        }
        info!("view reset to home");
        let _ = self.events.send(ViewerEvent::ViewReset);
    }
}

/// Frontend-facing operations. Requests are fire-and-forget: issuing
/// methods return once the request is authoritative, and completions arrive
/// as [`ViewerEvent`]s.
#[async_trait]
pub trait ViewerHandle: Send + Sync {
    /// Startup fetch of the set catalog.
    async fn load_sets(&self);
    /// Browse a set from page 1, superseding any in-flight request.
    async fn open_set(&self, set: SetSummary);
    /// Edit the search box; clears the stale "no results" notice.
    async fn set_search_term(&self, text: &str);
    /// Submit the current term. Returns `false` (and issues nothing) when
    /// the term is shorter than the minimum length.
    async fn search(&self) -> bool;
    /// Returns `false` when already on the last known page.
    async fn next_page(&self) -> bool;
    /// Returns `false` when already on the first page.
    async fn previous_page(&self) -> bool;
    /// Leave set browsing. No-op outside of set browsing.
    async fn back_to_sets(&self);
    /// Global reset, valid from any state.
    async fn go_home(&self);
    async fn toggle_favorite(&self, card_id: CardId);
    async fn set_sort(&self, spec: SortSpec);
    async fn snapshot(&self) -> ViewerState;
    fn subscribe_events(&self) -> broadcast::Receiver<ViewerEvent>;
}

#[async_trait]
impl ViewerHandle for Arc<ViewerClient> {
    async fn load_sets(&self) {
        ViewerClient::issue(self, Some(Action::SetsRequested), CatalogRequest::ListSets).await;
    }

    async fn open_set(&self, set: SetSummary) {
        info!(set_id = %set.id, "opening set");
        let request = CatalogRequest::ListSetCards {
            set_id: set.id.clone(),
            page: 1,
        };
        ViewerClient::issue(self, Some(Action::SetSelected(set)), request).await;
    }

    async fn set_search_term(&self, text: &str) {
        self.dispatch(Action::SearchTermEdited(text.to_string()))
            .await;
    }

    async fn search(&self) -> bool {
        let term = {
            let guard = self.inner.lock().await;
            guard.search_term.clone()
        };
        if term.chars().count() < MIN_SEARCH_LEN {
            debug!(
                term_len = term.chars().count(),
                "search term below minimum length; not issuing"
            );
            return false;
        }

        info!(term_len = term.chars().count(), "searching cards");
        ViewerClient::issue(
            self,
            Some(Action::SearchSubmitted(term.clone())),
            CatalogRequest::SearchCards { term },
        )
        .await;
        true
    }

    async fn next_page(&self) -> bool {
        let target = {
            let guard = self.inner.lock().await;
            match &guard.mode {
                ViewMode::SetBrowse {
                    set,
                    page,
                    total_pages,
                } if *page < *total_pages => Some((set.id.clone(), page + 1)),
                _ => None,
            }
        };
        let Some((set_id, page)) = target else {
            return false;
        };

        info!(set_id = %set_id, page, "paging forward");
        ViewerClient::issue(
            self,
            Some(Action::PageRequested(page)),
            CatalogRequest::ListSetCards { set_id, page },
        )
        .await;
        true
    }

    async fn previous_page(&self) -> bool {
        let target = {
            let guard = self.inner.lock().await;
            match &guard.mode {
                ViewMode::SetBrowse { set, page, .. } if *page > 1 => {
                    Some((set.id.clone(), page - 1))
                }
                _ => None,
            }
        };
        let Some((set_id, page)) = target else {
            return false;
        };

        info!(set_id = %set_id, page, "paging backward");
        ViewerClient::issue(
            self,
            Some(Action::PageRequested(page)),
            CatalogRequest::ListSetCards { set_id, page },
        )
        .await;
        true
    }

    async fn back_to_sets(&self) {
        let browsing = {
            let guard = self.inner.lock().await;
            guard.mode.selected_set().is_some()
        };
        if browsing {
            ViewerClient::reset_to_home(self).await;
        }
    }

    async fn go_home(&self) {
        ViewerClient::reset_to_home(self).await;
    }

    async fn toggle_favorite(&self, card_id: CardId) {
        self.dispatch(Action::FavoriteToggled(card_id)).await;
    }

    async fn set_sort(&self, spec: SortSpec) {
        self.dispatch(Action::SortChanged(spec)).await;
    }

    async fn snapshot(&self) -> ViewerState {
        self.inner.lock().await.clone()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
