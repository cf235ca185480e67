//! Frontend data layer: the home load, debounced search and per-selection trailer
//! fetch, each guarded against responses that outlive their trigger.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::gateway::{ClientError, GatewayApi};
use crate::models::{HomeBundle, Movie};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrailerState {
    #[default]
    Idle,
    Loading,
    Loaded(String),
    Unavailable,
}

/// Everything the presentation layer reads. Cloned out by [`Session::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub home_status: LoadStatus,
    pub home: Option<HomeBundle>,
    /// Bumped each time `home` is replaced.
    pub home_generation: u64,
    pub query: String,
    /// `Some` while a search is active, even when it matched nothing.
    pub search: Option<Vec<Movie>>,
    pub searching: bool,
    pub selection: Option<Movie>,
    pub trailer: TrailerState,
    /// Last error from any source; newer errors overwrite older ones.
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    view: SessionState,
    search_task: Option<CancellationToken>,
    trailer_task: Option<CancellationToken>,
}

pub struct Session {
    api: Arc<dyn GatewayApi>,
    inner: Arc<Mutex<Inner>>,
    lifetime: CancellationToken,
}

impl Session {
    pub fn new(api: Arc<dyn GatewayApi>) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner::default())),
            lifetime: CancellationToken::new(),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        lock(&self.inner).view.clone()
    }

    /// Starts the home load. Previous rows stay visible if it fails.
    pub fn load_home(&self) -> JoinHandle<()> {
        lock(&self.inner).view.home_status = LoadStatus::Loading;

        let api = self.api.clone();
        let inner = self.inner.clone();
        let token = self.lifetime.clone();
        tokio::spawn(async move {
            let result = api.get_home().await;
            let mut guard = lock(&inner);
            if token.is_cancelled() {
                debug!("Dropping home response after teardown");
                return;
            }
            let view = &mut guard.view;
            match result {
                Ok(bundle) => {
                    view.home = Some(bundle);
                    view.home_generation += 1;
                    view.home_status = LoadStatus::Loaded;
                    view.error = None;
                }
                Err(e) => {
                    warn!("Home load failed: {}", e);
                    view.home_status = LoadStatus::Failed;
                    view.error = Some(describe(&e, "Failed to load"));
                }
            }
        })
    }

    /// Records a new query. Non-empty queries fire after [`SEARCH_DEBOUNCE`] unless
    /// replaced first; empty ones end the search immediately. Repeating the current
    /// query is a no-op.
    pub fn set_query(&self, query: &str) {
        let mut guard = lock(&self.inner);
        if guard.view.query == query {
            return;
        }
        if let Some(previous) = guard.search_task.take() {
            previous.cancel();
        }
        guard.view.query = query.to_string();

        let term = query.trim().to_string();
        if term.is_empty() {
            guard.view.search = None;
            guard.view.searching = false;
            return;
        }

        guard.view.searching = true;
        let token = self.lifetime.child_token();
        guard.search_task = Some(token.clone());
        drop(guard);

        let api = self.api.clone();
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(SEARCH_DEBOUNCE) => {}
            }
            debug!(query = %term, "Searching");
            let result = api.search_movies(&term).await;
            let mut guard = lock(&inner);
            if token.is_cancelled() {
                debug!(query = %term, "Dropping superseded search response");
                return;
            }
            let view = &mut guard.view;
            match result {
                Ok(found) => {
                    view.search = Some(found.results);
                    view.error = None;
                }
                Err(e) => {
                    warn!("Search for '{}' failed: {}", term, e);
                    view.error = Some(describe(&e, "Search failed"));
                }
            }
            view.searching = false;
        });
    }

    /// Changes the selected movie and restarts the trailer fetch for it.
    pub fn select(&self, movie: Option<Movie>) -> Option<JoinHandle<()>> {
        let mut guard = lock(&self.inner);
        if let Some(previous) = guard.trailer_task.take() {
            previous.cancel();
        }
        guard.view.selection = movie.clone();

        let Some(movie) = movie else {
            guard.view.trailer = TrailerState::Idle;
            return None;
        };
        guard.view.trailer = TrailerState::Loading;
        let token = self.lifetime.child_token();
        guard.trailer_task = Some(token.clone());
        drop(guard);

        let api = self.api.clone();
        let inner = self.inner.clone();
        Some(tokio::spawn(async move {
            let result = api.get_trailer(movie.id).await;
            let mut guard = lock(&inner);
            if token.is_cancelled() {
                debug!(movie_id = movie.id, "Dropping trailer for closed selection");
                return;
            }
            let view = &mut guard.view;
            view.trailer = match result {
                Ok(found) => found
                    .key
                    .filter(|k| !k.is_empty())
                    .map(TrailerState::Loaded)
                    .unwrap_or(TrailerState::Unavailable),
                Err(e) => {
                    warn!("Trailer for movie {} failed: {}", movie.id, e);
                    view.error = Some(describe(&e, "Trailer failed"));
                    TrailerState::Unavailable
                }
            };
        }))
    }

    pub fn close(&self) {
        self.select(None);
    }

    /// Ends the session. Responses still in flight are discarded.
    pub fn teardown(&self) {
        let _guard = lock(&self.inner);
        self.lifetime.cancel();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn describe(err: &ClientError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
