#![no_main]
use libfuzzer_sys::fuzz_target;
use tri_harness::svg_adapter::parse_polygons;

fuzz_target!(|text: &str| {
    if let Ok(polygons) = parse_polygons(text) {
        let mut expected = 0;
        for indices in polygons.loops() {
            for index in indices {
                assert_eq!(*index, expected);
                expected += 1;
            }
        }
        assert_eq!(expected, polygons.points().len());
    }
});
