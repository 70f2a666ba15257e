//! Client-side cache of evaluations and the polling watch.
//!
//! The cache holds the latest fetched snapshot per evaluation, the dashboard
//! list and the "current" marker that drives the creation overlay. Polling is
//! a lazy stream: nothing is fetched until it is consumed and dropping it
//! stops all further requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use gw_core::error::ApiError;
use gw_core::evaluation::{Evaluation, EvaluationRequest, RefineEvaluationRequest};
use gw_core::ids::EvaluationId;
use gw_core::ports::EvaluationsPort;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_OVERLAY_CEILING: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub poll_interval: Duration,
    /// How long the creation overlay may block the page.
    pub overlay_ceiling: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            overlay_ceiling: DEFAULT_OVERLAY_CEILING,
        }
    }
}

pub struct EvaluationStore {
    evaluations: Arc<dyn EvaluationsPort>,
    settings: WatchSettings,
    cache: RwLock<HashMap<EvaluationId, Evaluation>>,
    list: RwLock<Vec<Evaluation>>,
    current: RwLock<Option<EvaluationId>>,
    /// Bumped whenever the current marker changes or a watch starts; stale
    /// watches stop.
    generation: AtomicU64,
}

impl EvaluationStore {
    pub fn new(evaluations: Arc<dyn EvaluationsPort>, settings: WatchSettings) -> Self {
        Self {
            evaluations,
            settings,
            cache: RwLock::new(HashMap::new()),
            list: RwLock::new(Vec::new()),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> WatchSettings {
        self.settings
    }

    pub async fn create(&self, request: &EvaluationRequest) -> Result<Evaluation, ApiError> {
        let evaluation = self.evaluations.create_evaluation(request).await?;
        info!(
            evaluation_id = %evaluation.id,
            terminal = evaluation.is_terminal(),
            paid = request.payment_reference.is_some(),
            "evaluation created"
        );
        self.adopt(evaluation.clone()).await;
        Ok(evaluation)
    }

    pub async fn refine(&self, request: &RefineEvaluationRequest) -> Result<Evaluation, ApiError> {
        let evaluation = self.evaluations.refine_evaluation(request).await?;
        info!(
            evaluation_id = %evaluation.id,
            refined_from = %request.evaluation_id,
            "evaluation refined"
        );
        self.adopt(evaluation.clone()).await;
        Ok(evaluation)
    }

    async fn adopt(&self, evaluation: Evaluation) {
        let id = evaluation.id;
        self.store(evaluation).await;
        self.mark_current(id).await;
        if let Err(err) = self.refresh_list().await {
            warn!(error = %err, "evaluation list refresh failed");
        }
    }

    async fn store(&self, evaluation: Evaluation) {
        self.cache.write().await.insert(evaluation.id, evaluation);
    }

    pub async fn get(&self, id: EvaluationId) -> Result<Evaluation, ApiError> {
        let evaluation = self.evaluations.get_evaluation(id).await?;
        self.store(evaluation.clone()).await;
        Ok(evaluation)
    }

    pub async fn cached(&self, id: EvaluationId) -> Option<Evaluation> {
        self.cache.read().await.get(&id).cloned()
    }

    pub async fn list(&self) -> Vec<Evaluation> {
        self.list.read().await.clone()
    }

    pub async fn refresh_list(&self) -> Result<Vec<Evaluation>, ApiError> {
        let fetched = self.evaluations.list_evaluations().await?;
        {
            let mut cache = self.cache.write().await;
            for evaluation in &fetched {
                cache.insert(evaluation.id, evaluation.clone());
            }
        }
        *self.list.write().await = fetched.clone();
        debug!(count = fetched.len(), "evaluation list refreshed");
        Ok(fetched)
    }

    /// Refetches the list when the window regains focus, so evaluations
    /// finished in the background show up.
    pub async fn on_window_focus(&self) {
        if let Err(err) = self.refresh_list().await {
            warn!(error = %err, "evaluation list refresh on focus failed");
        }
    }

    pub async fn current(&self) -> Option<EvaluationId> {
        *self.current.read().await
    }

    pub async fn mark_current(&self, id: EvaluationId) {
        *self.current.write().await = Some(id);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn clear_current(&self) {
        *self.current.write().await = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Drops the current marker after the overlay ceiling elapsed, unless a
    /// newer evaluation took its place.
    pub async fn release_overlay(&self, id: EvaluationId) {
        let mut current = self.current.write().await;
        if *current == Some(id) {
            *current = None;
            self.generation.fetch_add(1, Ordering::SeqCst);
            debug!(evaluation_id = %id, "creation overlay released");
        }
    }

    /// Polls `id` until it turns terminal.
    ///
    /// Yields every fetched snapshot. The stream ends after the first
    /// terminal snapshot or the first error, or as soon as the current marker
    /// changes or a newer watch is opened.
    pub fn watch(self: &Arc<Self>, id: EvaluationId) -> BoxStream<'static, Result<Evaluation, ApiError>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let state = WatchState {
            store: Arc::clone(self),
            id,
            generation,
            first: true,
            done: false,
        };
        stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            if !state.first {
                tokio::time::sleep(state.store.settings.poll_interval).await;
            }
            state.first = false;
            if state.is_stale() {
                debug!(evaluation_id = %state.id, "watch superseded");
                return None;
            }

            let result = state.store.evaluations.get_evaluation(state.id).await;
            if state.is_stale() {
                return None;
            }
            match &result {
                Ok(evaluation) => {
                    state.store.store(evaluation.clone()).await;
                    state.done = evaluation.is_terminal();
                }
                Err(err) => {
                    warn!(evaluation_id = %state.id, error = %err, "evaluation poll failed");
                    state.done = true;
                }
            }
            Some((result, state))
        })
        .boxed()
    }
}

struct WatchState {
    store: Arc<EvaluationStore>,
    id: EvaluationId,
    generation: u64,
    first: bool,
    done: bool,
}

impl WatchState {
    fn is_stale(&self) -> bool {
        self.store.generation.load(Ordering::SeqCst) != self.generation
    }
}
