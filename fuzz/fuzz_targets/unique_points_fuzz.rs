#![no_main]
mod fuzz_shared;
use fuzz_shared::FuzzPoint;
use libfuzzer_sys::fuzz_target;
use tri_harness::{unique_points, Point2};

fuzz_target!(|data: Vec<FuzzPoint>| {
    let points: Vec<Point2> = data.iter().copied().map(Point2::from).collect();
    let unique = unique_points(points.iter().copied());

    // No two emitted points share a key, and the first occurrence keeps its position.
    for (index, point) in unique.iter().enumerate() {
        assert!(unique[..index].iter().all(|other| other.key() != point.key()));
    }
    let firsts: Vec<_> = points
        .iter()
        .enumerate()
        .filter(|(index, point)| points[..*index].iter().all(|other| other.key() != point.key()))
        .map(|(_, point)| point.key())
        .collect();
    let emitted: Vec<_> = unique.iter().map(Point2::key).collect();
    assert_eq!(firsts, emitted);
});
