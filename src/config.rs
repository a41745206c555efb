use crate::boundary::AttractorType;
use crate::error::EngineError;
use crate::lattice::LatticeType;
use crate::stickiness::Stickiness;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_version() -> u32 {
    1
}

/// Complete run configuration.
///
/// Immutable for the duration of one run: the engine takes a copy at start,
/// so reconfiguring mid-run never affects the in-flight run. The next run
/// reads the updated values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Version field for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,
    /// Grid connectivity for the random walk
    pub lattice: LatticeType,
    /// Attractor seed geometry
    pub attractor: AttractorType,
    /// Extent of line/plane attractors; ignored (treated as 1) for Point
    pub attractor_extent: u32,
    /// Probability that a collision-adjacent encounter attaches
    pub stickiness: Stickiness,
    /// Target particle count; 0 means continuous generation until aborted
    pub particles: u32,
    /// Seed for the walk RNG; None draws from entropy
    pub rng_seed: Option<u64>,
    /// Walk steps per particle before it is respawned; 0 means uncapped
    pub max_walk_steps: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            version: 1,
            lattice: LatticeType::Square,
            attractor: AttractorType::Point,
            attractor_extent: 1,
            stickiness: Stickiness::ALWAYS,
            particles: 5000,
            rng_seed: None,
            max_walk_steps: 0,
        }
    }
}

impl RunConfig {
    /// Validate the configuration for an engine of the given dimension.
    ///
    /// The stickiness coefficient is range-checked by its own type; this
    /// covers the remaining cross-field constraints.
    pub fn validate(&self, dimension: usize) -> Result<(), EngineError> {
        if self.attractor_extent == 0 {
            return Err(EngineError::InvalidConfiguration(
                "attractor extent must be at least 1".into(),
            ));
        }
        if self.attractor == AttractorType::Plane && dimension < 3 {
            return Err(EngineError::InvalidConfiguration(format!(
                "plane attractor requires a 3D lattice, engine is {dimension}D"
            )));
        }
        Ok(())
    }

    /// Export the configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Import a configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Default location for a persisted configuration
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dla-engine").join("config.json"))
    }
}
