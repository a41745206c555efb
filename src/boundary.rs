use crate::point::Coord;
use serde::{Deserialize, Serialize};

/// Fixed seed geometry that the first wandering particles attach to.
///
/// Determines the shape pre-seeded into the aggregate index and, in
/// principle, the bounding-region test. Line and Plane carry an extent in
/// [`crate::config::RunConfig::attractor_extent`]; Point ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttractorType {
    #[default]
    Point,
    Line,
    Plane,
}

impl AttractorType {
    pub fn name(&self) -> &str {
        match self {
            AttractorType::Point => "Point",
            AttractorType::Line => "Line",
            AttractorType::Plane => "Plane",
        }
    }
}

/// Check a stepped particle against the simulation bounding region and
/// reflect it back to its previous position if it wandered out.
///
/// A particle is out of bounds when any axis exceeds `spawn_diameter / 2 + 2`
/// in absolute value. The bound is deliberately wider than the attractor so
/// particles have room to wander before being pulled back. Reflection is a
/// one-step reset to the previous in-bounds position, not a bounce
/// trajectory.
///
/// Line and Plane attractors reuse the origin-relative bound; measuring from
/// the nearest point on the attractor instead is a known approximation gap.
pub fn check_and_reflect<P: Coord>(
    position: P,
    previous: P,
    attractor: AttractorType,
    spawn_diameter: i32,
) -> (P, bool) {
    let bound = spawn_diameter / 2 + 2;
    match attractor {
        AttractorType::Point | AttractorType::Line | AttractorType::Plane => {
            if position.max_abs() > bound {
                (previous, true)
            } else {
                (position, false)
            }
        }
    }
}
