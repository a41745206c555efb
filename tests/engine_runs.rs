//! End-to-end runs through the public controller surface.

use dla_engine::{
    AttractorType, Coord, EngineError, LatticeType, Point2, Point3, RunConfig, RunController,
    RunOutcome, Stickiness,
};
use std::collections::HashSet;
use std::time::Duration;

fn config_2d(particles: u32, seed: u64) -> RunConfig {
    RunConfig {
        particles,
        rng_seed: Some(seed),
        ..RunConfig::default()
    }
}

#[test]
fn bounded_run_produces_exactly_n_attachments() {
    let config = RunConfig {
        lattice: LatticeType::Triangle,
        stickiness: Stickiness::new(0.7).unwrap(),
        ..config_2d(300, 17)
    };
    let mut controller = RunController::<Point2>::new(config).unwrap();
    controller.start(300).unwrap();
    assert_eq!(controller.wait().unwrap(), RunOutcome::Completed);

    let drained = controller.drain_new_attachments();
    assert_eq!(controller.size(), 300);
    assert_eq!(drained.len(), 300);

    let distinct: HashSet<Point2> = drained.iter().copied().collect();
    assert_eq!(distinct.len(), 300, "no coordinate is attached twice");
    assert!(!distinct.contains(&Point2::new(0, 0)), "seed is never re-attached");
}

#[test]
fn attached_sites_respect_the_spawn_boundary() {
    let mut controller = RunController::<Point2>::new(config_2d(250, 29)).unwrap();
    controller.start(250).unwrap();
    controller.wait().unwrap();

    // the bounding region tracks the spanning radius, so the final bound
    // covers every attachment made along the way
    let final_radius = controller.aggregate_radius_sq().sqrt();
    let bound = (2 * final_radius as i32 + 16) / 2 + 2;
    for p in controller.drain_new_attachments() {
        assert!(
            p.max_abs() <= bound,
            "attached site {p} outside boundary {bound}"
        );
    }
}

#[test]
fn radius_is_nondecreasing_across_observations() {
    let mut controller = RunController::<Point2>::new(config_2d(400, 5)).unwrap();
    controller.start(400).unwrap();

    let mut last = 0.0f64;
    while controller.is_running() {
        let radius_sq = controller.aggregate_radius_sq();
        assert!(radius_sq >= last, "radius decreased mid-run");
        last = radius_sq;
        std::thread::sleep(Duration::from_millis(1));
    }
    controller.wait().unwrap();
    assert!(controller.aggregate_radius_sq() >= last);
}

#[test]
fn line_attractor_grows_from_the_seed_row() {
    let config = RunConfig {
        attractor: AttractorType::Line,
        attractor_extent: 9,
        ..config_2d(100, 41)
    };
    let mut controller = RunController::<Point2>::new(config).unwrap();
    controller.start(100).unwrap();
    controller.wait().unwrap();
    assert_eq!(controller.size(), 100);
    // seed row spans x in [-4, 4]; radius reflects it from the start
    assert!(controller.aggregate_radius_sq() >= 16.0);
}

#[test]
fn plane_attractor_runs_in_3d_and_fails_in_2d() {
    let config = RunConfig {
        attractor: AttractorType::Plane,
        attractor_extent: 5,
        particles: 80,
        rng_seed: Some(13),
        ..RunConfig::default()
    };

    assert!(matches!(
        RunController::<Point2>::new(config.clone()),
        Err(EngineError::InvalidConfiguration(_))
    ));

    let mut controller = RunController::<Point3>::new(config).unwrap();
    controller.start(80).unwrap();
    assert_eq!(controller.wait().unwrap(), RunOutcome::Completed);
    assert_eq!(controller.size(), 80);
}

#[test]
fn blocking_consumers_can_take_from_the_queue() {
    let mut controller = RunController::<Point2>::new(config_2d(0, 55)).unwrap();
    controller.start(0).unwrap();

    // a consumer may block on the receiver instead of polling
    let first = controller
        .attachments()
        .recv_timeout(Duration::from_secs(10))
        .expect("no attachment arrived");
    assert_eq!(first.x.abs() + first.y.abs(), 1);

    controller.raise_abort_signal();
    assert_eq!(controller.wait().unwrap(), RunOutcome::Aborted);
}

#[test]
fn seeded_controllers_replay_identical_runs() {
    let config = RunConfig {
        stickiness: Stickiness::new(0.5).unwrap(),
        ..config_2d(150, 99)
    };

    let mut first = RunController::<Point2>::new(config.clone()).unwrap();
    first.start(150).unwrap();
    first.wait().unwrap();

    let mut second = RunController::<Point2>::new(config).unwrap();
    second.start(150).unwrap();
    second.wait().unwrap();

    assert_eq!(first.drain_new_attachments(), second.drain_new_attachments());
    assert_eq!(first.aggregate_misses(), second.aggregate_misses());
    assert_eq!(first.aggregate_radius_sq(), second.aggregate_radius_sq());
}
