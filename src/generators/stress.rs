use rand::Rng;

use super::{grid, rotate, DEGREES_TO_RADIANS, GRID_ROTATION_DEGREES};
use crate::{unique_points, HarnessError, Point2, TestCase};

/// The approximation of π the stress grid rotation was drawn with.
pub const STRESS_PI: f64 = 3.14159265;

/// The two alternating stress distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StressKind {
    /// Integer, slightly rotated and continuous points mixed on a small square. Produces
    /// many duplicates, nearly coincident and nearly colinear points.
    Scatter,
    /// An integer grid rotated by a random angle.
    Grid,
}

impl StressKind {
    /// Even iterations scatter, odd iterations rotate a grid.
    pub fn for_iteration(iteration: u64) -> Self {
        if iteration % 2 == 0 {
            StressKind::Scatter
        } else {
            StressKind::Grid
        }
    }
}

/// Shape of the stress distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct StressParameters {
    scatter_points: usize,
    scatter_range: i32,
    grid_size: usize,
}

impl Default for StressParameters {
    fn default() -> Self {
        Self {
            scatter_points: 200,
            scatter_range: 30,
            grid_size: 14,
        }
    }
}

impl StressParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many points a scatter case draws before deduplication. Defaults to 200.
    pub fn with_scatter_points(mut self, count: usize) -> Self {
        self.scatter_points = count;
        self
    }

    /// Sets the side length of the scatter square. Defaults to 30.
    pub fn with_scatter_range(mut self, range: i32) -> Self {
        self.scatter_range = range;
        self
    }

    /// Sets the number of grid points per side. Defaults to 14.
    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.grid_size = size;
        self
    }
}

/// Produces the randomized inputs of the stress runner.
///
/// The generator does not own a random number generator; the runner seeds one once and
/// passes it into every call so the whole sequence of cases follows from that seed.
#[derive(Debug, Clone, Default)]
pub struct StressGenerator {
    parameters: StressParameters,
}

impl StressGenerator {
    pub fn new(parameters: StressParameters) -> Self {
        Self { parameters }
    }

    /// Generates the deduplicated points of one stress iteration.
    pub fn generate<R: Rng>(
        &self,
        rng: &mut R,
        kind: StressKind,
        name: impl Into<String>,
    ) -> Result<TestCase, HarnessError> {
        let points = match kind {
            StressKind::Scatter => self.scatter(rng),
            StressKind::Grid => self.rotated_grid(rng),
        };
        TestCase::new(name, unique_points(points), Vec::new())
    }

    fn scatter<R: Rng>(&self, rng: &mut R) -> Vec<Point2> {
        let range = self.parameters.scatter_range;
        let mut points = Vec::with_capacity(self.parameters.scatter_points);
        for _ in 0..self.parameters.scatter_points {
            let subtype = rng.gen_range(0..=3);
            let mut point = Point2::new(
                rng.gen_range(0..=range) as f64,
                rng.gen_range(0..=range) as f64,
            );
            match subtype {
                1 => point = rotate(point, GRID_ROTATION_DEGREES * DEGREES_TO_RADIANS),
                2 => {
                    point = Point2::new(
                        rng.gen::<f64>() * range as f64,
                        rng.gen::<f64>() * range as f64,
                    )
                }
                // 0 and 3 keep the integer point, so half of all points land on the
                // lattice and repeat often.
                _ => {}
            }
            points.push(point);
        }
        points
    }

    fn rotated_grid<R: Rng>(&self, rng: &mut R) -> Vec<Point2> {
        let radians = rng.gen::<f64>() * 2.0 * STRESS_PI;
        grid(self.parameters.grid_size, radians).collect()
    }
}

/// `count` uniformly distributed points in the unit square, deduplicated.
pub fn timing_cloud<R: Rng>(
    rng: &mut R,
    count: usize,
    name: impl Into<String>,
) -> Result<TestCase, HarnessError> {
    let points = (0..count).map(|_| Point2::new(rng.gen::<f64>(), rng.gen::<f64>()));
    TestCase::new(name, unique_points(points), Vec::new())
}
