use crate::aggregate::AggregateIndex;
use crate::boundary;
use crate::config::RunConfig;
use crate::error::EngineError;
use crate::lattice;
use crate::metrics::{MetricsTracker, RADIUS_SAMPLE_POINTS};
use crate::point::Coord;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Offset added to the spawn diameter so particles never spawn directly onto
/// the aggregate.
const SPAWN_BOUNDARY_OFFSET: i32 = 16;

/// How a run ended. Abort is controlled termination, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The target particle count was reached.
    Completed,
    /// The abort signal was observed at a safe point.
    Aborted,
}

enum ParticleFate<P> {
    Attached(P),
    /// Walk-step cap reached; the particle is discarded and a fresh one
    /// spawns.
    Respawn,
    Aborted,
}

/// Aggregate index and metrics behind one mutex.
///
/// Insert and metrics update commit under the same critical section, so a
/// consumer reading size alongside radius never observes a torn update.
#[derive(Debug)]
pub struct AggregateState<P: Coord> {
    pub index: AggregateIndex<P>,
    pub metrics: MetricsTracker<P>,
}

impl<P: Coord> AggregateState<P> {
    pub fn new() -> Self {
        Self {
            index: AggregateIndex::new(),
            metrics: MetricsTracker::new(),
        }
    }

    /// Empty the aggregate, zero the metrics, and re-seed the attractor.
    pub fn reset(&mut self, config: &RunConfig) -> Result<(), EngineError> {
        self.index.clear();
        self.metrics.reset();
        let seed_radius_sq = self
            .index
            .seed_attractor(config.attractor, config.attractor_extent)?;
        self.metrics
            .seed(self.index.total_sites(), seed_radius_sq);
        if config.particles > 0 {
            let interval = (config.particles as usize / RADIUS_SAMPLE_POINTS).max(1);
            self.metrics.set_sample_interval(interval);
        }
        Ok(())
    }
}

/// Drives particle lifecycles against a shared aggregate state.
///
/// One engine instance runs one generation pass on a single worker thread:
/// spawn, walk, boundary reflection, collision and stickiness checks,
/// attach-or-continue. Newly attached coordinates are published to the
/// hand-off channel in strict attachment order.
pub struct AggregationEngine<P: Coord> {
    config: RunConfig,
    state: Arc<Mutex<AggregateState<P>>>,
    tx: Sender<P>,
    abort: Arc<AtomicBool>,
    rng: StdRng,
}

impl<P: Coord> AggregationEngine<P> {
    pub fn new(
        config: RunConfig,
        state: Arc<Mutex<AggregateState<P>>>,
        tx: Sender<P>,
        abort: Arc<AtomicBool>,
    ) -> Result<Self, EngineError> {
        config.validate(P::DIMENSION)?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            state,
            tx,
            abort,
            rng,
        })
    }

    /// Generate particles until the attached count reaches `target`, or
    /// indefinitely when `target` is 0, until the abort signal is raised.
    ///
    /// Blocking; intended to run on a dedicated worker thread. On abort no
    /// partially applied attachment is ever visible: any attachment that
    /// committed stays committed, and the method returns promptly.
    pub fn generate(mut self, target: u32) -> Result<RunOutcome, EngineError> {
        loop {
            let (attached, radius) = {
                let state = self.state.lock();
                (state.metrics.attached(), state.metrics.radius())
            };
            if target != 0 && attached >= target as usize {
                return Ok(RunOutcome::Completed);
            }
            if self.abort.load(Ordering::Relaxed) {
                return Ok(RunOutcome::Aborted);
            }

            // spawn zone: twice the current spanning radius plus an offset
            let spawn_diameter = 2 * radius as i32 + SPAWN_BOUNDARY_OFFSET;
            match self.walk_one(spawn_diameter)? {
                ParticleFate::Attached(position) => {
                    // a closed channel means the consumer is gone; treat it
                    // as an abort rather than generating into the void
                    if self.tx.send(position).is_err() {
                        return Ok(RunOutcome::Aborted);
                    }
                }
                ParticleFate::Respawn => {}
                ParticleFate::Aborted => return Ok(RunOutcome::Aborted),
            }
        }
    }

    /// One particle lifecycle: Spawned -> Walking -> (Reflected ->
    /// Walking)* -> Colliding -> Attached | Bounced.
    fn walk_one(&mut self, spawn_diameter: i32) -> Result<ParticleFate<P>, EngineError> {
        let mut position = P::spawn(spawn_diameter, &mut self.rng);
        let mut steps = 0usize;

        loop {
            if self.abort.load(Ordering::Relaxed) {
                return Ok(ParticleFate::Aborted);
            }
            if self.config.max_walk_steps != 0 && steps >= self.config.max_walk_steps {
                return Ok(ParticleFate::Respawn);
            }
            steps += 1;

            let previous = position;
            position = lattice::step(position, self.config.lattice, &mut self.rng);
            let (checked, reflected) = boundary::check_and_reflect(
                position,
                previous,
                self.config.attractor,
                spawn_diameter,
            );
            position = checked;
            if reflected {
                // reflected back to a position already known to be
                // non-adjacent, skip the collision test
                continue;
            }

            let attached = {
                let mut state = self.state.lock();
                if state.index.contains(position) {
                    // walked onto an occupied site; keep walking
                    continue;
                }
                if !state.index.is_adjacent(position) {
                    continue;
                }
                // direct field access: the held guard borrows self.state,
                // so the roll must not go through a &mut self method
                if self.config.stickiness.should_stick(&mut self.rng) {
                    state.index.insert(position)?;
                    state.metrics.record_attachment(position);
                    true
                } else {
                    state.metrics.record_miss();
                    false
                }
            };
            if attached {
                return Ok(ParticleFate::Attached(position));
            }
            // failed the gate: the particle stays where it is and may
            // immediately re-roll on the next step
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point2, Point3};
    use crate::stickiness::Stickiness;
    use crossbeam_channel::unbounded;

    fn run_engine<P: Coord>(
        config: RunConfig,
        target: u32,
    ) -> (RunOutcome, Arc<Mutex<AggregateState<P>>>, Vec<P>) {
        let state = Arc::new(Mutex::new(AggregateState::<P>::new()));
        state.lock().reset(&config).unwrap();
        let (tx, rx) = unbounded();
        let abort = Arc::new(AtomicBool::new(false));
        let engine = AggregationEngine::new(config, Arc::clone(&state), tx, abort).unwrap();
        let outcome = engine.generate(target).unwrap();
        let drained: Vec<P> = rx.try_iter().collect();
        (outcome, state, drained)
    }

    #[test]
    fn test_single_particle_attaches_adjacent_to_origin() {
        let config = RunConfig {
            particles: 1,
            rng_seed: Some(1),
            ..RunConfig::default()
        };
        let (outcome, state, drained) = run_engine::<Point2>(config, 1);
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(state.lock().metrics.attached(), 1);
        assert_eq!(drained.len(), 1);
        let p = drained[0];
        assert_eq!(
            p.x.abs() + p.y.abs(),
            1,
            "attached site {p} is not lattice-adjacent to the origin seed"
        );
        assert_eq!(state.lock().metrics.most_recent(), Some(p));
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let config = RunConfig {
            stickiness: Stickiness::new(0.5).unwrap(),
            rng_seed: Some(77),
            ..RunConfig::default()
        };
        let (_, state_a, drained_a) = run_engine::<Point2>(config.clone(), 60);
        let (_, state_b, drained_b) = run_engine::<Point2>(config, 60);
        assert_eq!(drained_a, drained_b);
        assert_eq!(
            state_a.lock().metrics.misses(),
            state_b.lock().metrics.misses()
        );
    }

    #[test]
    fn test_partial_stickiness_records_misses() {
        let config = RunConfig {
            stickiness: Stickiness::new(0.2).unwrap(),
            rng_seed: Some(5),
            ..RunConfig::default()
        };
        let (_, state, _) = run_engine::<Point2>(config, 40);
        assert!(
            state.lock().metrics.misses() > 0,
            "a 0.2 coefficient over 40 attachments should record misses"
        );
    }

    #[test]
    fn test_abort_flag_stops_before_any_walk() {
        let config = RunConfig {
            rng_seed: Some(3),
            ..RunConfig::default()
        };
        let state = Arc::new(Mutex::new(AggregateState::<Point2>::new()));
        state.lock().reset(&config).unwrap();
        let (tx, rx) = unbounded();
        let abort = Arc::new(AtomicBool::new(true));
        let engine = AggregationEngine::new(config, Arc::clone(&state), tx, abort).unwrap();
        assert_eq!(engine.generate(10_000).unwrap(), RunOutcome::Aborted);
        assert_eq!(state.lock().metrics.attached(), 0);
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn test_3d_run_attaches_adjacent_to_seed() {
        let config = RunConfig {
            rng_seed: Some(11),
            ..RunConfig::default()
        };
        let (outcome, _, drained) = run_engine::<Point3>(config, 1);
        assert_eq!(outcome, RunOutcome::Completed);
        let p = drained[0];
        assert_eq!(p.x.abs() + p.y.abs() + p.z.abs(), 1);
    }

    #[test]
    fn test_continuous_run_stops_when_consumer_disconnects() {
        let config = RunConfig {
            rng_seed: Some(6),
            ..RunConfig::default()
        };
        let state = Arc::new(Mutex::new(AggregateState::<Point2>::new()));
        state.lock().reset(&config).unwrap();
        let (tx, rx) = unbounded();
        drop(rx);
        let abort = Arc::new(AtomicBool::new(false));
        let engine = AggregationEngine::new(config, Arc::clone(&state), tx, abort).unwrap();
        // continuous target with nobody reading: the first failed send ends
        // the run instead of generating forever
        assert_eq!(engine.generate(0).unwrap(), RunOutcome::Aborted);
        assert_eq!(state.lock().metrics.attached(), 1);
    }

    #[test]
    fn test_radius_growth_is_sampled() {
        let config = RunConfig {
            particles: 100,
            rng_seed: Some(9),
            ..RunConfig::default()
        };
        let (_, state, _) = run_engine::<Point2>(config, 100);
        let state = state.lock();
        let samples = state.metrics.radius_samples();
        assert!(!samples.is_empty());
        // radii are non-decreasing across samples
        for pair in samples.windows(2) {
            assert!(pair[1].1 >= pair[0].1);
            assert!(pair[1].0 > pair[0].0);
        }
    }
}
