use crate::lattice::LatticeType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// An integer lattice site.
///
/// The dimension is fixed by the implementing type; a 2D engine and a 3D
/// engine are distinct instantiations and never mix coordinates. Values are
/// immutable once created and used as hash keys by the aggregate index.
pub trait Coord:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const DIMENSION: usize;

    /// The attractor origin.
    fn origin() -> Self;

    /// Unit step table for the given lattice type.
    ///
    /// Bucket order is part of the reproducibility contract for a fixed
    /// random stream and must not be reordered.
    fn steps(lattice: LatticeType) -> &'static [Self];

    /// Axis-aligned unit offsets used for aggregate adjacency checks
    /// (4-neighborhood in 2D, 6-neighborhood in 3D).
    fn axis_offsets() -> &'static [Self];

    fn translate(self, offset: Self) -> Self;

    /// Largest absolute value among the coordinate's axes.
    fn max_abs(self) -> i32;

    /// Squared Euclidean distance from the origin.
    fn radius_sq(self) -> f64;

    /// Random position on the spawn boundary: the perimeter of a square of
    /// side `spawn_diameter` in 2D, the faces of a cube in 3D.
    fn spawn<R: Rng>(spawn_diameter: i32, rng: &mut R) -> Self;

    /// Site at offset `i` along the line attractor through the origin.
    fn on_line(i: i32) -> Self;

    /// Site at offsets `(i, j)` on the plane attractor through the origin.
    /// `None` when the dimension has no plane attractor.
    fn on_plane(i: i32, j: i32) -> Option<Self>;
}

/// A site on a 2D lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point2 {
    pub x: i32,
    pub y: i32,
}

/// A site on a 3D lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Point3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

const STEPS_2D_SQUARE: [Point2; 4] = [
    Point2::new(1, 0),
    Point2::new(-1, 0),
    Point2::new(0, 1),
    Point2::new(0, -1),
];

const STEPS_2D_TRIANGLE: [Point2; 6] = [
    Point2::new(1, 0),
    Point2::new(-1, 0),
    Point2::new(1, 1),
    Point2::new(1, -1),
    Point2::new(-1, 1),
    Point2::new(-1, -1),
];

const STEPS_3D_SQUARE: [Point3; 6] = [
    Point3::new(1, 0, 0),
    Point3::new(-1, 0, 0),
    Point3::new(0, 1, 0),
    Point3::new(0, -1, 0),
    Point3::new(0, 0, 1),
    Point3::new(0, 0, -1),
];

const STEPS_3D_TRIANGLE: [Point3; 8] = [
    Point3::new(1, 0, 0),
    Point3::new(-1, 0, 0),
    Point3::new(1, 1, 0),
    Point3::new(1, -1, 0),
    Point3::new(-1, 1, 0),
    Point3::new(-1, -1, 0),
    Point3::new(0, 0, 1),
    Point3::new(0, 0, -1),
];

/// Random offset in `[-diameter/2, diameter/2]` along one axis.
fn edge_offset<R: Rng>(diameter: i32, rng: &mut R) -> i32 {
    (diameter as f64 * (rng.gen::<f64>() - 0.5)) as i32
}

impl Coord for Point2 {
    const DIMENSION: usize = 2;

    fn origin() -> Self {
        Point2::new(0, 0)
    }

    fn steps(lattice: LatticeType) -> &'static [Self] {
        match lattice {
            LatticeType::Square => &STEPS_2D_SQUARE,
            LatticeType::Triangle => &STEPS_2D_TRIANGLE,
        }
    }

    fn axis_offsets() -> &'static [Self] {
        &STEPS_2D_SQUARE
    }

    fn translate(self, offset: Self) -> Self {
        Point2::new(self.x + offset.x, self.y + offset.y)
    }

    fn max_abs(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    fn radius_sq(self) -> f64 {
        let (x, y) = (self.x as f64, self.y as f64);
        x * x + y * y
    }

    fn spawn<R: Rng>(spawn_diameter: i32, rng: &mut R) -> Self {
        let placement: f64 = rng.gen();
        let half = spawn_diameter / 2;
        if placement < 0.25 {
            // upper edge
            Point2::new(edge_offset(spawn_diameter, rng), half)
        } else if placement < 0.5 {
            // lower edge
            Point2::new(edge_offset(spawn_diameter, rng), -half)
        } else if placement < 0.75 {
            // right edge
            Point2::new(half, edge_offset(spawn_diameter, rng))
        } else {
            // left edge
            Point2::new(-half, edge_offset(spawn_diameter, rng))
        }
    }

    fn on_line(i: i32) -> Self {
        Point2::new(i, 0)
    }

    fn on_plane(_i: i32, _j: i32) -> Option<Self> {
        None
    }
}

impl Coord for Point3 {
    const DIMENSION: usize = 3;

    fn origin() -> Self {
        Point3::new(0, 0, 0)
    }

    fn steps(lattice: LatticeType) -> &'static [Self] {
        match lattice {
            LatticeType::Square => &STEPS_3D_SQUARE,
            LatticeType::Triangle => &STEPS_3D_TRIANGLE,
        }
    }

    fn axis_offsets() -> &'static [Self] {
        &STEPS_3D_SQUARE
    }

    fn translate(self, offset: Self) -> Self {
        Point3::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }

    fn max_abs(self) -> i32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    fn radius_sq(self) -> f64 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        x * x + y * y + z * z
    }

    fn spawn<R: Rng>(spawn_diameter: i32, rng: &mut R) -> Self {
        let placement: f64 = rng.gen();
        let half = spawn_diameter / 2;
        if placement < 1.0 / 6.0 {
            Point3::new(
                edge_offset(spawn_diameter, rng),
                edge_offset(spawn_diameter, rng),
                -half,
            )
        } else if placement < 2.0 / 6.0 {
            Point3::new(
                edge_offset(spawn_diameter, rng),
                edge_offset(spawn_diameter, rng),
                half,
            )
        } else if placement < 3.0 / 6.0 {
            Point3::new(
                edge_offset(spawn_diameter, rng),
                -half,
                edge_offset(spawn_diameter, rng),
            )
        } else if placement < 4.0 / 6.0 {
            Point3::new(
                edge_offset(spawn_diameter, rng),
                half,
                edge_offset(spawn_diameter, rng),
            )
        } else if placement < 5.0 / 6.0 {
            Point3::new(
                -half,
                edge_offset(spawn_diameter, rng),
                edge_offset(spawn_diameter, rng),
            )
        } else {
            Point3::new(
                half,
                edge_offset(spawn_diameter, rng),
                edge_offset(spawn_diameter, rng),
            )
        }
    }

    fn on_line(i: i32) -> Self {
        Point3::new(i, 0, 0)
    }

    fn on_plane(i: i32, j: i32) -> Option<Self> {
        Some(Point3::new(i, j, 0))
    }
}
