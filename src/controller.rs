use crate::config::RunConfig;
use crate::engine::{AggregateState, AggregationEngine, RunOutcome};
use crate::error::EngineError;
use crate::metrics::MetricsSnapshot;
use crate::point::Coord;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Owns the worker thread, the abort flag, the shared aggregate state, and
/// the hand-off queue.
///
/// The controller is the boundary surface for external consumers: start and
/// clear runs, raise the abort signal, read metrics, and drain newly
/// attached coordinates. Metrics reads are stale-but-consistent; the
/// aggregate index and metrics live behind one mutex so no read is ever
/// torn.
pub struct RunController<P: Coord> {
    config: RunConfig,
    state: Arc<Mutex<AggregateState<P>>>,
    abort: Arc<AtomicBool>,
    tx: Sender<P>,
    rx: Receiver<P>,
    worker: Option<JoinHandle<Result<RunOutcome, EngineError>>>,
    last_result: Option<Result<RunOutcome, EngineError>>,
}

impl<P: Coord> RunController<P> {
    /// Create a controller and seed the attractor from `config`.
    pub fn new(config: RunConfig) -> Result<Self, EngineError> {
        config.validate(P::DIMENSION)?;
        let state = Arc::new(Mutex::new(AggregateState::new()));
        state.lock().reset(&config)?;
        let (tx, rx) = unbounded();
        Ok(Self {
            config,
            state,
            abort: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
            worker: None,
            last_result: None,
        })
    }

    /// Replace the configuration used by subsequent runs.
    ///
    /// Never affects an in-flight run: the engine takes its own copy at
    /// start.
    pub fn configure(&mut self, config: RunConfig) -> Result<(), EngineError> {
        config.validate(P::DIMENSION)?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Start a run of `target` particles (0 = continuous until aborted) on
    /// a dedicated worker thread.
    ///
    /// Resets the aggregate, re-seeds the attractor, and discards anything
    /// left in the hand-off queue from a previous run. Fails with
    /// `InvalidState` while a run is active.
    pub fn start(&mut self, target: u32) -> Result<(), EngineError> {
        self.reap_finished();
        if self.worker.is_some() {
            return Err(EngineError::InvalidState("a run is already active"));
        }

        self.abort.store(false, Ordering::Relaxed);
        self.state.lock().reset(&self.config)?;
        while self.rx.try_recv().is_ok() {}

        let engine = AggregationEngine::new(
            self.config.clone(),
            Arc::clone(&self.state),
            self.tx.clone(),
            Arc::clone(&self.abort),
        )?;
        let handle = thread::Builder::new()
            .name("dla-engine-worker".into())
            .spawn(move || engine.generate(target))?;
        self.worker = Some(handle);
        self.last_result = None;
        Ok(())
    }

    /// Request cooperative termination of the active run. Idempotent; a
    /// no-op when no run is active.
    ///
    /// The worker observes the signal at the next safe point (top of the
    /// walk loop), so `wait` returns promptly and no half-applied
    /// attachment is ever visible.
    pub fn raise_abort_signal(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Block until the active run ends and return how it ended.
    pub fn wait(&mut self) -> Result<RunOutcome, EngineError> {
        if let Some(handle) = self.worker.take() {
            self.last_result = Some(handle.join().unwrap_or(Err(EngineError::WorkerFailed)));
        }
        self.last_result
            .take()
            .unwrap_or(Err(EngineError::InvalidState("no run has been started")))
    }

    /// Reset the aggregate and metrics, re-seed the attractor, and discard
    /// pending queue entries.
    ///
    /// Fails with `InvalidState` while a run is active; an aborted run must
    /// be acknowledged (the worker observed the signal and exited) before
    /// clearing.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::InvalidState(
                "clear requires the active run to finish or acknowledge abort",
            ));
        }
        self.reap_finished();
        self.abort.store(false, Ordering::Relaxed);
        self.state.lock().reset(&self.config)?;
        while self.rx.try_recv().is_ok() {}
        Ok(())
    }

    /// Remove and return every coordinate currently queued, in attachment
    /// order. Non-blocking; empty when nothing is pending.
    pub fn drain_new_attachments(&self) -> Vec<P> {
        self.rx.try_iter().collect()
    }

    /// The receiving side of the hand-off queue, for consumers that prefer
    /// a blocking drain over polling.
    pub fn attachments(&self) -> &Receiver<P> {
        &self.rx
    }

    /// Count of attached particles, seeds excluded.
    pub fn size(&self) -> usize {
        self.state.lock().metrics.attached()
    }

    pub fn aggregate_misses(&self) -> u64 {
        self.state.lock().metrics.misses()
    }

    pub fn aggregate_radius_sq(&self) -> f64 {
        self.state.lock().metrics.max_radius_sq()
    }

    pub fn estimate_fractal_dimension(&self) -> f64 {
        self.state.lock().metrics.fractal_dimension()
    }

    pub fn most_recently_attached(&self) -> Option<P> {
        self.state.lock().metrics.most_recent()
    }

    /// All metrics captured under one critical section.
    pub fn metrics(&self) -> MetricsSnapshot<P> {
        self.state.lock().metrics.snapshot()
    }

    /// Bounding-radius growth samples from the current run.
    pub fn radius_samples(&self) -> Vec<(usize, f64)> {
        self.state.lock().metrics.radius_samples().to_vec()
    }

    /// Join a worker that has already exited, keeping its result for
    /// `wait`.
    fn reap_finished(&mut self) {
        let finished = self.worker.as_ref().is_some_and(|h| h.is_finished());
        if finished {
            if let Some(handle) = self.worker.take() {
                self.last_result =
                    Some(handle.join().unwrap_or(Err(EngineError::WorkerFailed)));
            }
        }
    }
}

/// Dropping the controller never leaks the worker: the abort signal is
/// raised and the thread joined before the channel and state go away.
impl<P: Coord> Drop for RunController<P> {
    fn drop(&mut self) {
        self.abort.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
