use crate::point::Coord;

/// Number of bounding-radius samples recorded over a bounded run.
pub const RADIUS_SAMPLE_POINTS: usize = 50;

/// Consistent view of the run metrics, captured under one critical section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot<P: Coord> {
    /// Attached particles, seeds excluded.
    pub attached: usize,
    /// Cumulative failed-stickiness collision events.
    pub misses: u64,
    /// Largest squared distance from the attractor origin seen so far.
    pub max_radius_sq: f64,
    /// Scaling-law fractal dimension estimate; NaN while the aggregate is
    /// too small to take a logarithm meaningfully.
    pub fractal_dimension: f64,
    /// Most recently attached coordinate, if any.
    pub most_recent: Option<P>,
}

/// Running aggregate metrics, updated incrementally on each attachment.
///
/// Size, radius, and miss count are monotonically non-decreasing within a
/// run and reset to zero on clear. Updates happen under the same critical
/// section as the aggregate insert so consumers never observe a torn state.
#[derive(Debug)]
pub struct MetricsTracker<P: Coord> {
    attached: usize,
    total_sites: usize,
    max_radius_sq: f64,
    misses: u64,
    most_recent: Option<P>,
    radius_samples: Vec<(usize, f64)>,
    sample_interval: usize,
}

impl<P: Coord> MetricsTracker<P> {
    pub fn new() -> Self {
        Self {
            attached: 0,
            total_sites: 0,
            max_radius_sq: 0.0,
            misses: 0,
            most_recent: None,
            radius_samples: Vec::new(),
            sample_interval: 0,
        }
    }

    /// Prime the tracker with the attractor seed's site count and span.
    pub fn seed(&mut self, seed_sites: usize, seed_radius_sq: f64) {
        self.total_sites = seed_sites;
        self.max_radius_sq = seed_radius_sq;
    }

    /// Record bounding-radius growth samples every `interval` attachments;
    /// 0 disables sampling (continuous mode).
    pub fn set_sample_interval(&mut self, interval: usize) {
        self.sample_interval = interval;
    }

    pub fn record_attachment(&mut self, position: P) {
        self.attached += 1;
        self.total_sites += 1;
        self.max_radius_sq = self.max_radius_sq.max(position.radius_sq());
        self.most_recent = Some(position);
        if self.sample_interval > 0 && self.attached % self.sample_interval == 0 {
            self.radius_samples.push((self.total_sites, self.radius()));
        }
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn attached(&self) -> usize {
        self.attached
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn max_radius_sq(&self) -> f64 {
        self.max_radius_sq
    }

    /// Spanning radius: the largest Euclidean distance from the attractor
    /// origin among occupied sites.
    pub fn radius(&self) -> f64 {
        self.max_radius_sq.sqrt()
    }

    pub fn most_recent(&self) -> Option<P> {
        self.most_recent
    }

    /// Scaling-law estimate `ln(sites) / ln(radius)` relating aggregate size
    /// to its spanning radius. Returns NaN when the site count or radius is
    /// at most 1, where the logarithm ratio is undefined or degenerate.
    pub fn fractal_dimension(&self) -> f64 {
        if self.total_sites <= 1 || self.max_radius_sq <= 1.0 {
            return f64::NAN;
        }
        (self.total_sites as f64).ln() / self.radius().ln()
    }

    /// `(site count, radius)` pairs sampled at fixed attachment intervals
    /// over a bounded run.
    pub fn radius_samples(&self) -> &[(usize, f64)] {
        &self.radius_samples
    }

    pub fn snapshot(&self) -> MetricsSnapshot<P> {
        MetricsSnapshot {
            attached: self.attached,
            misses: self.misses,
            max_radius_sq: self.max_radius_sq,
            fractal_dimension: self.fractal_dimension(),
            most_recent: self.most_recent,
        }
    }

    pub fn reset(&mut self) {
        *self = MetricsTracker::new();
    }
}

impl<P: Coord> Default for MetricsTracker<P> {
    fn default() -> Self {
        Self::new()
    }
}
