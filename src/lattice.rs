use crate::point::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Grid connectivity constraining walk directions.
///
/// Fixed for the lifetime of one run; selects the step-direction table used
/// by [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LatticeType {
    /// Orthogonal steps only (4 directions in 2D, 6 in 3D).
    #[default]
    Square,
    /// Orthogonal x steps plus diagonal combinations (6 directions in 2D,
    /// 8 in 3D).
    Triangle,
}

impl LatticeType {
    pub fn name(&self) -> &str {
        match self {
            LatticeType::Square => "Square",
            LatticeType::Triangle => "Triangle",
        }
    }
}

/// Advance a particle by one unbiased random step.
///
/// Draws one uniform value in [0, 1) and partitions it into equal-width
/// buckets, one per direction in the lattice's step table. Pure function of
/// (position, lattice type, random draw).
pub fn step<P: Coord, R: Rng>(position: P, lattice: LatticeType, rng: &mut R) -> P {
    let table = P::steps(lattice);
    let draw: f64 = rng.gen();
    // draw < 1.0, so the index stays in range; min guards the degenerate
    // rounding case at the top of the interval
    let bucket = ((draw * table.len() as f64) as usize).min(table.len() - 1);
    position.translate(table[bucket])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point2, Point3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn assert_uniform_steps<P: Coord>(lattice: LatticeType, samples: usize) {
        let mut rng = StdRng::seed_from_u64(99);
        let table = P::steps(lattice);
        let mut counts: HashMap<P, usize> = HashMap::new();
        let origin = P::origin();
        for _ in 0..samples {
            let next = step(origin, lattice, &mut rng);
            assert!(
                table.iter().any(|d| origin.translate(*d) == next),
                "step produced a position outside the direction set"
            );
            *counts.entry(next).or_default() += 1;
        }
        let expected = samples as f64 / table.len() as f64;
        for (_, count) in counts {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(
                deviation < 0.1,
                "direction frequency deviates {:.1}% from uniform",
                deviation * 100.0
            );
        }
    }

    #[test]
    fn test_square_2d_steps_uniform() {
        assert_uniform_steps::<Point2>(LatticeType::Square, 60_000);
    }

    #[test]
    fn test_triangle_2d_steps_uniform() {
        assert_uniform_steps::<Point2>(LatticeType::Triangle, 60_000);
    }

    #[test]
    fn test_square_3d_steps_uniform() {
        assert_uniform_steps::<Point3>(LatticeType::Square, 60_000);
    }

    #[test]
    fn test_triangle_3d_steps_uniform() {
        assert_uniform_steps::<Point3>(LatticeType::Triangle, 60_000);
    }

    #[test]
    fn test_step_moves_exactly_one_lattice_unit() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pos = Point2::new(5, -2);
        for _ in 0..1000 {
            let next = step(pos, LatticeType::Triangle, &mut rng);
            let (dx, dy) = (next.x - pos.x, next.y - pos.y);
            assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
            assert_ne!((dx, dy), (0, 1), "pure y steps are not in the triangle set");
            assert_ne!((dx, dy), (0, -1), "pure y steps are not in the triangle set");
            pos = next;
        }
    }
}
