#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A constraint edge, given as two indices into a point list.
pub type Edge = [usize; 2];

/// A two dimensional point.
///
/// This is the coordinate type written to the point files that are fed into the
/// triangulation tools.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct Point2 {
    /// The point's x coordinate
    pub x: f64,
    /// The point's y coordinate
    pub y: f64,
}

impl Point2 {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point2 { x, y }
    }

    /// Returns a key that identifies this point by its exact coordinate values.
    ///
    /// Two points share a key if and only if their coordinates compare equal, which means
    /// `0.0` and `-0.0` map to the same key.
    #[inline]
    pub fn key(&self) -> PointKey {
        PointKey(coordinate_bits(self.x), coordinate_bits(self.y))
    }

    pub(crate) fn scale(&self, factor: f64) -> Self {
        Point2::new(self.x * factor, self.y * factor)
    }

    pub(crate) fn translate(&self, dx: f64, dy: f64) -> Self {
        Point2::new(self.x + dx, self.y + dy)
    }

    /// Formats the point as a row of a point CSV file (`x, y`).
    pub fn to_csv_row(&self) -> String {
        format!("{}, {}", format_coordinate(self.x), format_coordinate(self.y))
    }
}

impl From<[f64; 2]> for Point2 {
    #[inline]
    fn from(source: [f64; 2]) -> Self {
        Self::new(source[0], source[1])
    }
}

impl From<(f64, f64)> for Point2 {
    #[inline]
    fn from(source: (f64, f64)) -> Self {
        Self::new(source.0, source.1)
    }
}

impl From<Point2> for [f64; 2] {
    #[inline]
    fn from(point: Point2) -> Self {
        [point.x, point.y]
    }
}

impl From<cgmath::Point2<f64>> for Point2 {
    #[inline]
    fn from(point: cgmath::Point2<f64>) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<Point2> for cgmath::Point2<f64> {
    #[inline]
    fn from(point: Point2) -> Self {
        cgmath::Point2::new(point.x, point.y)
    }
}

/// Exact identity of a [Point2], usable as a hash key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(u64, u64);

fn coordinate_bits(value: f64) -> u64 {
    // -0.0 == 0.0, so both must hash identically
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Formats a coordinate with the shortest representation that reads back to the same value.
///
/// Whole numbers keep a trailing `.0` and very large or very small magnitudes switch to
/// exponent notation, which every CSV reader of the tools understands.
pub fn format_coordinate(value: f64) -> String {
    format!("{:?}", value)
}

/// Formats an edge as a row of an edge CSV file (`i, j`).
pub fn edge_to_csv_row(edge: &Edge) -> String {
    format!("{}, {}", edge[0], edge[1])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signed_zero_shares_key() {
        assert_eq!(Point2::new(0.0, 1.0).key(), Point2::new(-0.0, 1.0).key());
        assert_eq!(Point2::new(2.0, -0.0).key(), Point2::new(2.0, 0.0).key());
        assert_ne!(Point2::new(1.0, 2.0).key(), Point2::new(2.0, 1.0).key());
    }

    #[test]
    fn test_csv_rows() {
        assert_eq!(Point2::new(20.0, 80.0).to_csv_row(), "20.0, 80.0");
        assert_eq!(Point2::new(0.5, -1.25).to_csv_row(), "0.5, -1.25");
        assert_eq!(edge_to_csv_row(&[3, 0]), "3, 0");
    }

    #[test]
    fn test_format_coordinate_round_trips() {
        for value in [1.0e-40, 0.1 + 0.2, 123456.789, -7.0e20, 3.0] {
            let text = format_coordinate(value);
            assert_eq!(text.parse::<f64>().unwrap(), value);
        }
    }
}
