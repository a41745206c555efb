//! Diffusion-Limited Aggregation engine.
//!
//! Particles are released near a boundary, perform unbiased random walks on
//! a lattice, and permanently attach when they first become adjacent to the
//! growing aggregate or to a fixed attractor seed, gated by a stickiness
//! coefficient. Repeated many times this produces a branching fractal
//! structure.
//!
//! The engine runs on a dedicated worker thread owned by a
//! [`controller::RunController`]; a consumer drains newly attached
//! coordinates from the hand-off queue on its own schedule and reads
//! metrics (size, spanning radius, miss count, fractal dimension estimate)
//! at any time. Rendering and persistence of aggregate state are out of
//! scope; the bundled binary is a headless runner playing the consumer
//! role.

pub mod aggregate;
pub mod boundary;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod lattice;
pub mod metrics;
pub mod point;
pub mod stickiness;

pub use aggregate::AggregateIndex;
pub use boundary::AttractorType;
pub use config::RunConfig;
pub use controller::RunController;
pub use engine::{AggregateState, AggregationEngine, RunOutcome};
pub use error::EngineError;
pub use lattice::LatticeType;
pub use metrics::{MetricsSnapshot, MetricsTracker};
pub use point::{Coord, Point2, Point3};
pub use stickiness::Stickiness;
