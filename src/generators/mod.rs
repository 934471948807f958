//! Point distributions fed into the triangulators.
//!
//! The thirteen [Scenario]s are fixed regression fixtures: each one reseeds its random
//! number generator, so it produces the same points on every run. The stress and timing
//! generators ([StressGenerator], [timing_cloud]) draw from a generator owned by their
//! runner instead.
//!
//! Several constants below look arbitrary (an exponent of 20, π rounded to 3.1415). They
//! define the fixtures and are kept as-is in [GeneratorParameters].

mod stress;

pub use stress::{timing_cloud, StressGenerator, StressKind, StressParameters};

use std::fmt::{self, Display, Formatter};

use cgmath::{Basis2, Rad, Rotation, Rotation2};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{unique_points, Edge, HarnessError, Point2, TestCase};

/// Seed used by every scenario that does not pick its own.
pub const SCENARIO_SEED: u64 = 0;
/// Seed used by `randomTest` and `circleTest`.
pub const RESEED: u64 = 42;
/// Power applied to a uniform sample to cluster points near zero.
pub const CLUSTERING_EXPONENT: f64 = 20.0;
/// Odd power applied to a symmetric sample to cluster points around the center line.
pub const CENTERED_CLUSTERING_EXPONENT: f64 = 19.0;
/// The approximation of π the scenario fixtures were generated with.
pub const SCENARIO_PI: f64 = 3.1415;
/// The degree to radian factor the rotated fixtures were generated with.
pub const DEGREES_TO_RADIANS: f64 = 0.0174532925;
/// Rotation of `rotatedGridTest` and of the rotated stress points, in degrees.
pub const GRID_ROTATION_DEGREES: f64 = 3.0;

/// Tunable constants of the scenario generators.
///
/// The defaults reproduce the regression fixtures. Changing any of them produces different
/// test cases, which invalidates previously recorded results.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParameters {
    scenario_seed: u64,
    reseed: u64,
    clustering_exponent: f64,
    centered_clustering_exponent: f64,
    pi: f64,
    degrees_to_radians: f64,
    grid_rotation_degrees: f64,
    constrained_samples: usize,
    cloud_samples: usize,
}

impl Default for GeneratorParameters {
    fn default() -> Self {
        Self {
            scenario_seed: SCENARIO_SEED,
            reseed: RESEED,
            clustering_exponent: CLUSTERING_EXPONENT,
            centered_clustering_exponent: CENTERED_CLUSTERING_EXPONENT,
            pi: SCENARIO_PI,
            degrees_to_radians: DEGREES_TO_RADIANS,
            grid_rotation_degrees: GRID_ROTATION_DEGREES,
            constrained_samples: 300,
            cloud_samples: 350,
        }
    }
}

impl GeneratorParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed shared by all scenarios that do not reseed themselves.
    pub fn with_scenario_seed(mut self, seed: u64) -> Self {
        self.scenario_seed = seed;
        self
    }

    /// Sets the seed of `randomTest` and `circleTest`.
    pub fn with_reseed(mut self, seed: u64) -> Self {
        self.reseed = seed;
        self
    }

    /// Sets the exponent of `exponentialTest` and `skewedExponentialTest`. Defaults to 20.
    pub fn with_clustering_exponent(mut self, exponent: f64) -> Self {
        self.clustering_exponent = exponent;
        self
    }

    /// Sets the exponent of `centeredExponentialTest`. Defaults to 19.
    ///
    /// Must be an odd integer, otherwise the lower half of the distribution folds onto the
    /// upper half or turns into NaN.
    pub fn with_centered_clustering_exponent(mut self, exponent: f64) -> Self {
        self.centered_clustering_exponent = exponent;
        self
    }

    /// Sets the value used for π. Defaults to 3.1415.
    pub fn with_pi(mut self, pi: f64) -> Self {
        self.pi = pi;
        self
    }

    /// Sets the rotation of `rotatedGridTest` in degrees. Defaults to 3.
    pub fn with_grid_rotation_degrees(mut self, degrees: f64) -> Self {
        self.grid_rotation_degrees = degrees;
        self
    }

    /// Sets how many random points the constrained scenarios draw. Defaults to 300.
    pub fn with_constrained_samples(mut self, samples: usize) -> Self {
        self.constrained_samples = samples;
        self
    }

    /// Sets how many random points the cluster and exponential scenarios draw.
    /// Defaults to 350.
    pub fn with_cloud_samples(mut self, samples: usize) -> Self {
        self.cloud_samples = samples;
        self
    }

    fn radians(&self, degrees: f64) -> f64 {
        degrees * self.degrees_to_radians
    }

    fn pi_radians(&self, degrees: f64) -> f64 {
        degrees * self.pi / 180.0
    }
}

/// The fixed regression scenarios for the point triangulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scenario {
    ConstrainedHole,
    Constrained,
    Cluster,
    SkewedExponential,
    CenteredExponential,
    Exponential,
    Spiral,
    AlignedGrid,
    RotatedGrid,
    Random,
    Wheel,
    Circle,
    Binary,
}

impl Scenario {
    /// All scenarios in the order the regression run visits them.
    pub const ALL: [Scenario; 13] = [
        Scenario::ConstrainedHole,
        Scenario::Constrained,
        Scenario::Cluster,
        Scenario::SkewedExponential,
        Scenario::CenteredExponential,
        Scenario::Exponential,
        Scenario::Spiral,
        Scenario::AlignedGrid,
        Scenario::RotatedGrid,
        Scenario::Random,
        Scenario::Wheel,
        Scenario::Circle,
        Scenario::Binary,
    ];

    /// The fixture name, used for scratch and output file names.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ConstrainedHole => "constrainedHoleTest",
            Scenario::Constrained => "constrainedTest",
            Scenario::Cluster => "clusterTest",
            Scenario::SkewedExponential => "skewedExponentialTest",
            Scenario::CenteredExponential => "centeredExponentialTest",
            Scenario::Exponential => "exponentialTest",
            Scenario::Spiral => "spiralTest",
            Scenario::AlignedGrid => "alignedGridTest",
            Scenario::RotatedGrid => "rotatedGridTest",
            Scenario::Random => "randomTest",
            Scenario::Wheel => "wheelTest",
            Scenario::Circle => "circleTest",
            Scenario::Binary => "binaryTest",
        }
    }

    pub fn from_name(name: &str) -> Option<Scenario> {
        Self::ALL.into_iter().find(|scenario| scenario.name() == name)
    }

    fn seed(&self, parameters: &GeneratorParameters) -> u64 {
        match self {
            Scenario::Random | Scenario::Circle => parameters.reseed,
            _ => parameters.scenario_seed,
        }
    }

    /// Builds the scenario's test case.
    pub fn generate(&self, parameters: &GeneratorParameters) -> Result<TestCase, HarnessError> {
        let mut rng = StdRng::seed_from_u64(self.seed(parameters));
        let mut points = Vec::new();
        let mut edges = Vec::new();
        let p = parameters;

        match self {
            Scenario::ConstrainedHole => {
                constrained_square(&mut points, &mut edges);
                for _ in 0..p.constrained_samples {
                    let point = uniform_point(&mut rng, 100.0);
                    if inside_inner_square(point) {
                        continue;
                    }
                    points.push(point);
                }
            }
            Scenario::Constrained => {
                constrained_square(&mut points, &mut edges);
                for _ in 0..p.constrained_samples {
                    let point = uniform_point(&mut rng, 100.0);
                    if on_inner_square_lines(point) {
                        continue;
                    }
                    points.push(point);
                }
            }
            Scenario::Cluster => {
                points.extend(corners([100.0, 100.0]));
                for _ in 0..p.cloud_samples {
                    let point = loop {
                        let x = 2.0 * rng.gen::<f64>() - 1.0;
                        let y = 2.0 * rng.gen::<f64>() - 1.0;
                        if x * x + y * y < 1.0 {
                            break Point2::new(x, y);
                        }
                    };
                    points.push(point.scale(10.0).translate(50.0, 50.0));
                }
            }
            Scenario::SkewedExponential => {
                points.extend([
                    Point2::new(0.0, 0.0),
                    Point2::new(0.0, 100.0),
                    Point2::new(100.0, 50.0),
                    Point2::new(100.0, 100.0),
                ]);
                for _ in 0..p.cloud_samples {
                    let x = rng.gen::<f64>() * 100.0;
                    let raw = rng.gen::<f64>().powf(p.clustering_exponent) * 100.0;
                    let y = (raw / 100.0 * (1.0 - x / 200.0) + x / 100.0 * 0.5) * 100.0;
                    points.push(Point2::new(x, y));
                }
            }
            Scenario::CenteredExponential => {
                points.extend(corners([100.0, 100.0]));
                for _ in 0..p.cloud_samples {
                    let x = rng.gen::<f64>() * 100.0;
                    let y = (2.0 * rng.gen::<f64>() - 1.0).powf(p.centered_clustering_exponent)
                        * 50.0
                        + 50.0;
                    points.push(Point2::new(x, y));
                }
            }
            Scenario::Exponential => {
                points.extend(corners([100.0, 100.0]));
                for _ in 0..p.cloud_samples {
                    let x = rng.gen::<f64>() * 100.0;
                    let y = rng.gen::<f64>().powf(p.clustering_exponent) * 100.0;
                    points.push(Point2::new(x, y));
                }
            }
            Scenario::Spiral => {
                let mut angle = 0.0;
                for index in 10..150 {
                    let radius = index as f64;
                    angle += p.pi_radians(300.0) / radius;
                    points.push(polar(radius, angle));
                }
            }
            Scenario::AlignedGrid => points.extend(grid(10, 0.0)),
            Scenario::RotatedGrid => {
                points.extend(grid(10, p.radians(p.grid_rotation_degrees)));
            }
            Scenario::Random => {
                for _ in 0..100 {
                    let x = rng.gen_range(0..=100);
                    let y = rng.gen_range(0..=100);
                    points.push(Point2::new(x as f64, y as f64));
                }
            }
            Scenario::Wheel => {
                const RADIUS: f64 = 100.0;
                points.push(Point2::new(0.0, 0.0));
                for index in 0..90 {
                    let angle = p.pi_radians(4.0 * index as f64);
                    points.push(polar(RADIUS, angle));
                    points.push(polar(RADIUS * 0.9, angle + p.pi_radians(2.0)));
                    points.push(polar(RADIUS * 0.8, angle));
                }
            }
            Scenario::Circle => {
                const RING_COUNT: usize = 10;
                points.push(Point2::new(0.0, 0.0));
                for ring in 1..RING_COUNT {
                    let samples = (ring as f64 * p.pi * 2.0) as usize;
                    let step = 2.0 * p.pi / samples as f64;
                    let ring_rotation = 2.0 * p.pi * rng.gen::<f64>();
                    for index in 0..samples {
                        let mut angle = step * index as f64 + ring_rotation;
                        angle += rng.gen::<f64>() * step * 0.25;
                        let mut radius = ring as f64;
                        if ring < RING_COUNT - 1 {
                            radius += rng.gen::<f64>() * 0.25 - 0.125;
                        }
                        points.push(polar(radius, angle));
                    }
                }
            }
            Scenario::Binary => {
                const ROWS: u32 = 8;
                const WIDTH: u64 = 256;
                let mut y = 0;
                let mut y_increment = 128;
                for row in 1..ROWS {
                    let columns = 2u64.pow(row);
                    for column in 0..=columns {
                        let x = WIDTH / columns * column;
                        points.push(Point2::new(x as f64, (WIDTH - y) as f64));
                    }
                    y += y_increment;
                    y_increment /= 2;
                }
            }
        }

        TestCase::new(self.name(), unique_points(points), edges)
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inner square with a closed loop of constraint edges, followed by the unconstrained
/// outer square.
fn constrained_square(points: &mut Vec<Point2>, edges: &mut Vec<Edge>) {
    points.extend([
        Point2::new(20.0, 20.0),
        Point2::new(20.0, 80.0),
        Point2::new(80.0, 80.0),
        Point2::new(80.0, 20.0),
    ]);
    edges.extend([[0, 1], [1, 2], [2, 3], [3, 0]]);
    points.extend([
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 100.0),
        Point2::new(100.0, 100.0),
        Point2::new(100.0, 0.0),
    ]);
}

fn inside_inner_square(point: Point2) -> bool {
    (20.0..=80.0).contains(&point.x) && (20.0..=80.0).contains(&point.y)
}

fn on_inner_square_lines(point: Point2) -> bool {
    point.x == 20.0 || point.x == 80.0 || point.y == 20.0 || point.y == 80.0
}

fn corners([width, height]: [f64; 2]) -> [Point2; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, height),
        Point2::new(width, 0.0),
        Point2::new(width, height),
    ]
}

fn uniform_point<R: Rng>(rng: &mut R, range: f64) -> Point2 {
    let x = rng.gen::<f64>() * range;
    let y = rng.gen::<f64>() * range;
    Point2::new(x, y)
}

fn polar(radius: f64, angle: f64) -> Point2 {
    Point2::new(angle.cos() * radius, angle.sin() * radius)
}

pub(crate) fn rotate(point: Point2, radians: f64) -> Point2 {
    let rotation: Basis2<f64> = Rotation2::from_angle(Rad(radians));
    rotation.rotate_point(point.into()).into()
}

/// Integer grid of `size` × `size` points, rotated around the origin.
pub(crate) fn grid(size: usize, radians: f64) -> impl Iterator<Item = Point2> {
    (0..size).flat_map(move |x| {
        (0..size).map(move |y| {
            let point = Point2::new(x as f64, y as f64);
            if radians == 0.0 {
                point
            } else {
                rotate(point, radians)
            }
        })
    })
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::{GeneratorParameters, Scenario};
    use crate::{unique::OrderedUniqueSet, Point2};

    fn generate(scenario: Scenario) -> crate::TestCase {
        scenario.generate(&GeneratorParameters::default()).unwrap()
    }

    #[test]
    fn test_all_scenarios_are_unique_and_valid() {
        for scenario in Scenario::ALL {
            let test_case = generate(scenario);
            let set: OrderedUniqueSet<Point2> = test_case.points().iter().copied().collect();
            assert_eq!(set.len(), test_case.points().len(), "{scenario}");
            for edge in test_case.edges() {
                assert!(edge[0] < test_case.points().len());
                assert!(edge[1] < test_case.points().len());
            }
            assert_eq!(test_case.name(), scenario.name());
        }
    }

    #[test]
    fn test_scenarios_are_reproducible() {
        for scenario in Scenario::ALL {
            assert_eq!(generate(scenario), generate(scenario), "{scenario}");
        }
    }

    #[test]
    fn test_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::from_name(scenario.name()), Some(scenario));
        }
        assert_eq!(Scenario::from_name("noSuchTest"), None);
    }

    #[test]
    fn test_aligned_grid() {
        let test_case = generate(Scenario::AlignedGrid);
        assert_eq!(test_case.points().len(), 100);
        assert!(test_case.edges().is_empty());
        for point in test_case.points() {
            assert_eq!(point.x.fract(), 0.0);
            assert_eq!(point.y.fract(), 0.0);
            assert!((0.0..=9.0).contains(&point.x));
            assert!((0.0..=9.0).contains(&point.y));
        }
        assert_eq!(test_case.points()[1], Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_rotated_grid_preserves_distances() {
        let test_case = generate(Scenario::RotatedGrid);
        assert_eq!(test_case.points().len(), 100);
        let far_corner = test_case.points()[99];
        assert_relative_eq!(
            (far_corner.x * far_corner.x + far_corner.y * far_corner.y).sqrt(),
            (162.0f64).sqrt(),
            epsilon = 1.0e-9
        );
        assert!(far_corner.x < 9.0);
        assert!(far_corner.y > 9.0);
    }

    #[test]
    fn test_constrained_hole() {
        let test_case = generate(Scenario::ConstrainedHole);
        let points = test_case.points();
        assert!(points.len() > 8 && points.len() <= 308);
        assert_eq!(test_case.edges(), &[[0, 1], [1, 2], [2, 3], [3, 0]]);
        assert_eq!(points[0], Point2::new(20.0, 20.0));
        assert_eq!(points[7], Point2::new(100.0, 0.0));
        for point in &points[8..] {
            let inside = (20.0..=80.0).contains(&point.x) && (20.0..=80.0).contains(&point.y);
            assert!(!inside, "{point:?} lies in the hole");
        }
    }

    #[test]
    fn test_constrained_keeps_interior_points() {
        let test_case = generate(Scenario::Constrained);
        let points = test_case.points();
        assert_eq!(test_case.edges().len(), 4);
        assert!(points[8..]
            .iter()
            .any(|p| p.x > 20.0 && p.x < 80.0 && p.y > 20.0 && p.y < 80.0));
        assert!(points[8..]
            .iter()
            .all(|p| p.x != 20.0 && p.x != 80.0 && p.y != 20.0 && p.y != 80.0));
    }

    #[test]
    fn test_cluster_stays_in_disk() {
        let test_case = generate(Scenario::Cluster);
        assert_eq!(test_case.points().len(), 354);
        for point in &test_case.points()[4..] {
            let dx = point.x - 50.0;
            let dy = point.y - 50.0;
            assert!(dx * dx + dy * dy < 100.0 + 1.0e-9);
        }
    }

    #[test]
    fn test_exponential_distributions_cluster() {
        let exponential = generate(Scenario::Exponential);
        let near_bottom = exponential.points()[4..]
            .iter()
            .filter(|p| p.y < 1.0)
            .count();
        assert!(near_bottom > 200);

        let centered = generate(Scenario::CenteredExponential);
        for point in &centered.points()[4..] {
            assert!((0.0..=100.0).contains(&point.y));
        }
        let near_center = centered.points()[4..]
            .iter()
            .filter(|p| (p.y - 50.0).abs() < 1.0)
            .count();
        assert!(near_center > 200);

        let skewed = generate(Scenario::SkewedExponential);
        assert_eq!(skewed.points()[2], Point2::new(100.0, 50.0));
        for point in &skewed.points()[4..] {
            // The skew lifts every sample onto or above the line y = x / 2.
            assert!(point.y >= point.x * 0.5 - 1.0e-9);
        }
    }

    #[test]
    fn test_spiral() {
        let test_case = generate(Scenario::Spiral);
        assert_eq!(test_case.points().len(), 140);
        let first = test_case.points()[0];
        assert_relative_eq!(first.x.hypot(first.y), 10.0, epsilon = 1.0e-9);
        let last = test_case.points()[139];
        assert_relative_eq!(last.x.hypot(last.y), 149.0, epsilon = 1.0e-9);
    }

    #[test]
    fn test_random_uses_integers() {
        let test_case = generate(Scenario::Random);
        assert!(test_case.points().len() <= 100);
        assert!(test_case.points().len() > 90);
        for point in test_case.points() {
            assert_eq!(point.x.fract(), 0.0);
            assert!((0.0..=100.0).contains(&point.x));
            assert!((0.0..=100.0).contains(&point.y));
        }
    }

    #[test]
    fn test_random_ignores_scenario_seed() {
        let other = GeneratorParameters::new().with_scenario_seed(99);
        assert_eq!(
            Scenario::Random.generate(&other).unwrap(),
            generate(Scenario::Random)
        );
        assert_ne!(
            Scenario::Cluster.generate(&other).unwrap(),
            generate(Scenario::Cluster)
        );
    }

    #[test]
    fn test_wheel() {
        let test_case = generate(Scenario::Wheel);
        assert_eq!(test_case.points().len(), 1 + 90 * 3);
        assert_eq!(test_case.points()[0], Point2::new(0.0, 0.0));
        assert_relative_eq!(test_case.points()[1].x, 100.0);
        let radii = test_case.points()[1..4]
            .iter()
            .map(|p| p.x.hypot(p.y))
            .collect::<Vec<_>>();
        assert_relative_eq!(radii[0], 100.0, epsilon = 1.0e-9);
        assert_relative_eq!(radii[1], 90.0, epsilon = 1.0e-9);
        assert_relative_eq!(radii[2], 80.0, epsilon = 1.0e-9);
    }

    #[test]
    fn test_circle_rings() {
        let test_case = generate(Scenario::Circle);
        let expected: usize = 1 + (1..10)
            .map(|ring| (ring as f64 * 3.1415 * 2.0) as usize)
            .sum::<usize>();
        assert_eq!(test_case.points().len(), expected);
        // The outermost ring has no radial jitter.
        for point in &test_case.points()[expected - 56..] {
            assert_relative_eq!(point.x.hypot(point.y), 9.0, epsilon = 1.0e-9);
        }
        for point in &test_case.points()[1..7] {
            let radius = point.x.hypot(point.y);
            assert!((0.875..=1.125).contains(&radius));
        }
    }

    #[test]
    fn test_binary_rows() {
        let test_case = generate(Scenario::Binary);
        let points = test_case.points();
        let expected: usize = (1..8).map(|row| (1usize << row) + 1).sum();
        assert_eq!(points.len(), expected);
        assert_eq!(points[0], Point2::new(0.0, 256.0));
        assert_eq!(points[1], Point2::new(128.0, 256.0));
        assert_eq!(points[2], Point2::new(256.0, 256.0));
        assert_eq!(points[3], Point2::new(0.0, 128.0));
        assert_eq!(points[expected - 1], Point2::new(256.0, 4.0));
    }

    #[test]
    fn test_changed_exponent_changes_points() {
        let flatter = GeneratorParameters::new().with_clustering_exponent(2.0);
        assert_ne!(
            Scenario::Exponential.generate(&flatter).unwrap(),
            generate(Scenario::Exponential)
        );
    }
}
