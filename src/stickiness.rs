use crate::error::EngineError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability in (0, 1] that a collision-adjacent encounter results in
/// permanent attachment.
///
/// `1.0` always sticks (classic DLA); smaller values model partial adhesion
/// and produce denser, less branchy aggregates. Invalid values are rejected
/// at construction and at deserialization, before any run starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Stickiness(f64);

impl Stickiness {
    pub const ALWAYS: Stickiness = Stickiness(1.0);

    pub fn new(coefficient: f64) -> Result<Self, EngineError> {
        if !coefficient.is_finite() || coefficient <= 0.0 || coefficient > 1.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "sticky coefficient must be in (0, 1], got {coefficient}"
            )));
        }
        Ok(Stickiness(coefficient))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Draw the stickiness gate for one collision-adjacent encounter.
    ///
    /// Returns true iff a uniform draw in [0, 1) is below the coefficient.
    /// A false result is a counted miss, never an error; the particle keeps
    /// walking from its current position.
    pub fn should_stick<R: Rng>(self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.0
    }
}

impl Default for Stickiness {
    fn default() -> Self {
        Stickiness::ALWAYS
    }
}

impl TryFrom<f64> for Stickiness {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Stickiness::new(value)
    }
}

impl From<Stickiness> for f64 {
    fn from(value: Stickiness) -> f64 {
        value.0
    }
}
