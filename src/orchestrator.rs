//! Cycle orchestration: sample → fetch details → compute pairs.
//!
//! Each cycle runs on its own worker thread and is tagged with a
//! monotonically increasing `CycleId`. Workers publish results through a
//! single state mutex; every write first checks that the worker's cycle is
//! still the current one, and late results from superseded cycles are
//! dropped. The sample and pairs of a cycle are published behind `Arc`s and
//! never mutated afterwards; a new cycle swaps in fresh ones.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PairsConfig;
use crate::data::{CountrySummary, Pair};
use crate::errors::{FailureKind, PairsError};
use crate::fetch::DetailFetcher;
use crate::pairs::find_pairs;
use crate::sampler::CountrySampler;
use crate::source::CountrySource;
use crate::types::CycleId;

/// Loading state of one orchestration phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    /// Not started for the current cycle.
    #[default]
    Idle,
    /// Work in flight.
    Loading,
    /// Results published.
    Ready,
    /// The cycle failed.
    Failed,
}

/// Why a cycle failed, in a form the presentation layer can keep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CycleFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Rendered error message.
    pub message: String,
}

impl From<&PairsError> for CycleFailure {
    fn from(err: &PairsError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Everything the presentation layer may observe about the current cycle.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PresentationState {
    /// Current cycle; 0 before the first `start`.
    pub cycle: CycleId,
    /// Phase A: full list + sampling.
    pub sampling: PhaseState,
    /// Phase B: detail fetch + pair computation.
    pub pairing: PhaseState,
    /// Sample of the current cycle; empty until phase A is ready.
    pub sample: Arc<Vec<CountrySummary>>,
    /// Pairs of the current cycle; empty until phase B is ready.
    pub pairs: Arc<Vec<Pair>>,
    /// Set when the cycle failed; both phases are then `Failed`.
    pub failure: Option<CycleFailure>,
    /// When the current cycle began.
    pub started_at: Option<DateTime<Utc>>,
    /// When the current cycle settled.
    pub finished_at: Option<DateTime<Utc>>,
}

impl PresentationState {
    /// True while either phase is loading.
    pub fn is_loading(&self) -> bool {
        self.sampling == PhaseState::Loading || self.pairing == PhaseState::Loading
    }

    /// True when the cycle finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// True when the cycle failed.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// State shared between the orchestrator handle and its cycle workers.
struct SharedState {
    state: Mutex<PresentationState>,
    changed: Condvar,
}

impl SharedState {
    /// Apply `update` if `cycle` is still current. Returns `false` for stale cycles.
    fn apply(
        &self,
        cycle: CycleId,
        what: &str,
        update: impl FnOnce(&mut PresentationState),
    ) -> bool {
        let mut state = self.state.lock().expect("orchestrator state poisoned");
        if state.cycle != cycle {
            debug!(
                stale_cycle = cycle,
                current_cycle = state.cycle,
                result = what,
                "discarding result from superseded cycle"
            );
            return false;
        }
        update(&mut state);
        self.changed.notify_all();
        true
    }

    fn sample_ready(&self, cycle: CycleId, sample: Arc<Vec<CountrySummary>>) -> bool {
        self.apply(cycle, "sample", |state| {
            state.sample = sample;
            state.sampling = PhaseState::Ready;
            state.pairing = PhaseState::Loading;
        })
    }

    fn pairs_ready(&self, cycle: CycleId, pairs: Vec<Pair>) -> bool {
        self.apply(cycle, "pairs", |state| {
            state.pairs = Arc::new(pairs);
            state.pairing = PhaseState::Ready;
            state.finished_at = Some(Utc::now());
        })
    }

    fn fail(&self, cycle: CycleId, err: &PairsError) -> bool {
        let applied = self.apply(cycle, "failure", |state| {
            state.sampling = PhaseState::Failed;
            state.pairing = PhaseState::Failed;
            state.pairs = Arc::new(Vec::new());
            state.failure = Some(CycleFailure::from(err));
            state.finished_at = Some(Utc::now());
        });
        if applied {
            warn!(cycle, error = %err, "cycle failed");
        }
        applied
    }
}

/// Everything a worker needs to run one cycle.
struct CycleJob<S> {
    cycle: CycleId,
    source: Arc<S>,
    shared: Arc<SharedState>,
    sampler: CountrySampler,
    fetcher: DetailFetcher,
    sample_size: usize,
}

impl<S: CountrySource> CycleJob<S> {
    fn run(self) {
        let started = Instant::now();
        let sample = match self
            .source
            .list_countries()
            .and_then(|all| self.sampler.sample_for_cycle(&all, self.sample_size, self.cycle))
        {
            Ok(sample) => Arc::new(sample),
            Err(err) => {
                self.shared.fail(self.cycle, &err);
                return;
            }
        };
        if !self.shared.sample_ready(self.cycle, Arc::clone(&sample)) {
            return;
        }
        let pairs = self
            .fetcher
            .fetch_all(self.source.as_ref(), &sample)
            .and_then(|details| find_pairs(&details));
        match pairs {
            Ok(pairs) => {
                let count = pairs.len();
                if self.shared.pairs_ready(self.cycle, pairs) {
                    info!(
                        cycle = self.cycle,
                        sampled = sample.len(),
                        pairs = count,
                        elapsed_ms = started.elapsed().as_millis(),
                        "cycle completed"
                    );
                }
            }
            Err(err) => {
                self.shared.fail(self.cycle, &err);
            }
        }
    }
}

/// Drives sampling cycles against a country source.
///
/// `start` always begins a new cycle, superseding any outstanding one.
/// `retry` only does so when no phase is loading.
pub struct Orchestrator<S: CountrySource + 'static> {
    source: Arc<S>,
    sample_size: usize,
    sampler: CountrySampler,
    fetcher: DetailFetcher,
    shared: Arc<SharedState>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: CountrySource + 'static> Orchestrator<S> {
    /// Create an idle orchestrator. No cycle runs until `start`.
    pub fn new(source: S, config: &PairsConfig) -> Result<Self, PairsError> {
        config.validate()?;
        let sampler = CountrySampler::from_optional_seed(config.seed);
        debug!(
            source_id = %source.id(),
            base_seed = sampler.base_seed(),
            sample_size = config.sample_size,
            "orchestrator created"
        );
        Ok(Self {
            source: Arc::new(source),
            sample_size: config.sample_size,
            sampler,
            fetcher: DetailFetcher::from_config(&config.fetch),
            shared: Arc::new(SharedState {
                state: Mutex::new(PresentationState::default()),
                changed: Condvar::new(),
            }),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Base seed the per-cycle seeds derive from.
    pub fn base_seed(&self) -> u64 {
        self.sampler.base_seed()
    }

    /// Begin a new cycle unconditionally and return its id.
    pub fn start(&self) -> CycleId {
        let mut state = self.shared.state.lock().expect("orchestrator state poisoned");
        self.begin_cycle(&mut state)
    }

    /// Begin a new cycle unless a phase is loading.
    ///
    /// Returns `None` (and changes nothing) while the current cycle is loading.
    pub fn retry(&self) -> Option<CycleId> {
        let mut state = self.shared.state.lock().expect("orchestrator state poisoned");
        if state.is_loading() {
            debug!(cycle = state.cycle, "retry ignored while loading");
            return None;
        }
        Some(self.begin_cycle(&mut state))
    }

    /// Snapshot of the current presentation state.
    pub fn state(&self) -> PresentationState {
        self.shared
            .state
            .lock()
            .expect("orchestrator state poisoned")
            .clone()
    }

    /// Block until `predicate` holds for the current state, or `timeout` elapses.
    pub fn wait_until<F>(&self, timeout: Duration, predicate: F) -> Option<PresentationState>
    where
        F: Fn(&PresentationState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock().expect("orchestrator state poisoned");
        loop {
            if predicate(&state) {
                return Some(state.clone());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (next, _) = self
                .shared
                .changed
                .wait_timeout(state, remaining)
                .expect("orchestrator state poisoned");
            state = next;
        }
    }

    /// Block until the current cycle has no loading phase, or `timeout` elapses.
    pub fn wait_until_settled(&self, timeout: Duration) -> Option<PresentationState> {
        self.wait_until(timeout, PresentationState::is_settled)
    }

    fn begin_cycle(&self, state: &mut PresentationState) -> CycleId {
        let cycle = state.cycle + 1;
        let first = state.cycle == 0;
        *state = PresentationState {
            cycle,
            sampling: PhaseState::Loading,
            pairing: if first {
                PhaseState::Idle
            } else {
                PhaseState::Loading
            },
            started_at: Some(Utc::now()),
            ..PresentationState::default()
        };
        self.shared.changed.notify_all();
        debug!(cycle, "cycle started");

        let job = CycleJob {
            cycle,
            source: Arc::clone(&self.source),
            shared: Arc::clone(&self.shared),
            sampler: self.sampler.clone(),
            fetcher: self.fetcher.clone(),
            sample_size: self.sample_size,
        };
        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || {
            if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
                shared.fail(
                    cycle,
                    &PairsError::FetchFailure {
                        source_id: "orchestrator".into(),
                        locator: String::new(),
                        reason: format!("cycle {cycle} worker panicked"),
                    },
                );
            }
        });
        self.track_worker(handle);
        cycle
    }

    fn track_worker(&self, handle: JoinHandle<()>) {
        let mut workers = self.workers.lock().expect("orchestrator workers poisoned");
        let (finished, running): (Vec<_>, Vec<_>) =
            workers.drain(..).partition(|worker| worker.is_finished());
        for worker in finished {
            let _ = worker.join();
        }
        *workers = running;
        workers.push(handle);
    }
}

impl<S: CountrySource + 'static> Drop for Orchestrator<S> {
    fn drop(&mut self) {
        let workers = match self.workers.get_mut() {
            Ok(workers) => std::mem::take(workers),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for worker in workers {
            let _ = worker.join();
        }
    }
}
