use crate::boundary::AttractorType;
use crate::error::EngineError;
use crate::point::Coord;
use std::collections::HashMap;

/// Membership structure backing collision tests: the set of occupied lattice
/// sites (attractor seeds plus attached particles), keyed by coordinate with
/// the attachment order as value.
///
/// Membership and adjacency queries are O(1) amortized, which is what lets
/// the engine scale to tens of thousands of particles. Sites are never
/// removed except by a full [`AggregateIndex::clear`].
#[derive(Debug)]
pub struct AggregateIndex<P: Coord> {
    sites: HashMap<P, usize>,
    seed_count: usize,
    next_order: usize,
}

impl<P: Coord> AggregateIndex<P> {
    pub fn new() -> Self {
        Self {
            sites: HashMap::new(),
            seed_count: 0,
            next_order: 0,
        }
    }

    /// Populate the index with the fixed attractor geometry before any
    /// particle walk begins. Returns the largest squared seed radius so the
    /// metrics tracker can start from the seed's span.
    ///
    /// Seeds carry order 0 and are excluded from the attached count.
    pub fn seed_attractor(
        &mut self,
        attractor: AttractorType,
        extent: u32,
    ) -> Result<f64, EngineError> {
        let mut seeds: Vec<P> = Vec::new();
        match attractor {
            AttractorType::Point => seeds.push(P::origin()),
            AttractorType::Line => {
                let extent = extent as i32;
                for i in 0..extent {
                    seeds.push(P::on_line(i - extent / 2));
                }
            }
            AttractorType::Plane => {
                let extent = extent as i32;
                for i in 0..extent {
                    for j in 0..extent {
                        let site = P::on_plane(i - extent / 2, j - extent / 2).ok_or_else(|| {
                            EngineError::InvalidConfiguration(format!(
                                "plane attractor requires a 3D lattice, engine is {}D",
                                P::DIMENSION
                            ))
                        })?;
                        seeds.push(site);
                    }
                }
            }
        }

        let mut max_radius_sq: f64 = 0.0;
        for seed in seeds {
            self.sites.insert(seed, 0);
            max_radius_sq = max_radius_sq.max(seed.radius_sq());
        }
        self.seed_count = self.sites.len();
        self.next_order = 1;
        Ok(max_radius_sq)
    }

    pub fn contains(&self, position: P) -> bool {
        self.sites.contains_key(&position)
    }

    /// True if any lattice neighbor of `position` (4-neighborhood in 2D,
    /// 6-neighborhood in 3D) is an occupied site, seeds included.
    pub fn is_adjacent(&self, position: P) -> bool {
        P::axis_offsets()
            .iter()
            .any(|offset| self.sites.contains_key(&position.translate(*offset)))
    }

    /// Add a newly attached particle.
    ///
    /// Inserting a site that is already occupied should never occur in
    /// correct operation; it is reported as [`EngineError::DuplicateAttachment`]
    /// rather than silently ignored.
    pub fn insert(&mut self, position: P) -> Result<usize, EngineError> {
        if self.sites.contains_key(&position) {
            return Err(EngineError::DuplicateAttachment(position.to_string()));
        }
        let order = self.next_order;
        self.sites.insert(position, order);
        self.next_order += 1;
        Ok(order)
    }

    /// Count of attached particles, excluding seeds.
    pub fn attached(&self) -> usize {
        self.sites.len() - self.seed_count
    }

    /// Total occupied sites, seeds included.
    pub fn total_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn clear(&mut self) {
        self.sites.clear();
        self.seed_count = 0;
        self.next_order = 0;
    }
}
