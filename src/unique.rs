//! Order preserving deduplication.
//!
//! Coincident input points are degenerate input for the triangulation tools, so every
//! generated point cloud passes through an [OrderedUniqueSet] before it is written out.

use core::hash::Hash;

use hashbrown::HashSet;

use crate::{Edge, Point2, PointKey};

/// Maps an element onto the value that decides whether two elements are duplicates.
pub trait UniqueKey {
    /// The hashable identity of an element.
    type Key: Hash + Eq;

    /// Returns the identity of this element.
    fn unique_key(&self) -> Self::Key;
}

impl UniqueKey for Point2 {
    type Key = PointKey;

    fn unique_key(&self) -> PointKey {
        self.key()
    }
}

impl UniqueKey for Edge {
    type Key = Edge;

    fn unique_key(&self) -> Edge {
        *self
    }
}

/// A set that remembers the order in which its elements were first inserted.
///
/// Inserting an element whose key is already present is a no-op; the first occurrence
/// wins. Membership tests run in constant time.
#[derive(Debug, Clone)]
pub struct OrderedUniqueSet<T: UniqueKey> {
    items: Vec<T>,
    seen: HashSet<T::Key>,
}

impl<T: UniqueKey> Default for OrderedUniqueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: UniqueKey> OrderedUniqueSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Creates an empty set with space for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Inserts an element unless an equal one was inserted before.
    ///
    /// Returns `true` if the element was added.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.insert(item.unique_key()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    /// Returns `true` if an element with the same key has been inserted.
    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(&item.unique_key())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the elements in first-seen order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: UniqueKey> Extend<T> for OrderedUniqueSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T: UniqueKey> FromIterator<T> for OrderedUniqueSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut result = Self::with_capacity(iter.size_hint().0);
        result.extend(iter);
        result
    }
}

impl<T: UniqueKey> IntoIterator for OrderedUniqueSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T: UniqueKey> IntoIterator for &'a OrderedUniqueSet<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Removes duplicate points while keeping the first occurrence of each coordinate pair.
pub fn unique_points<I: IntoIterator<Item = Point2>>(points: I) -> Vec<Point2> {
    points.into_iter().collect::<OrderedUniqueSet<_>>().into_vec()
}

#[cfg(test)]
mod test {
    use float_next_after::NextAfter;
    use rand::{seq::SliceRandom, Rng, SeedableRng};

    use super::{unique_points, OrderedUniqueSet};
    use crate::Point2;

    #[test]
    fn test_first_occurrence_wins() {
        let points = vec![
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 0.0),
        ];
        assert_eq!(
            unique_points(points),
            vec![
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_signed_zero_is_a_duplicate() {
        let result = unique_points([Point2::new(-0.0, 5.0), Point2::new(0.0, 5.0)]);
        assert_eq!(result.len(), 1);
        assert!(result[0].x.is_sign_negative());
    }

    #[test]
    fn test_adjacent_floats_are_distinct() {
        let x = 3.0f64;
        let next = x.next_after(f64::INFINITY);
        let result = unique_points([
            Point2::new(x, x),
            Point2::new(next, x),
            Point2::new(x, next),
            Point2::new(x, x),
        ]);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut set = OrderedUniqueSet::new();
        assert!(set.insert([0, 1]));
        assert!(set.insert([1, 0]));
        assert!(!set.insert([0, 1]));
        assert!(set.contains(&[1, 0]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_order_matches_quadratic_reference() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut points: Vec<_> = (0..500)
            .map(|_| Point2::new(rng.gen_range(0..10) as f64, rng.gen_range(0..10) as f64))
            .collect();
        points.shuffle(&mut rng);

        let mut reference: Vec<Point2> = Vec::new();
        for point in &points {
            if !reference.contains(point) {
                reference.push(*point);
            }
        }

        assert_eq!(unique_points(points), reference);
    }
}
