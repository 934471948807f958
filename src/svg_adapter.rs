//! Conversion of polygon drawings into the point and edge files of the polygon
//! triangulator.
//!
//! Only `<polygon>` elements are read. Drawings exported from illustration programs often
//! define fill patterns up front; polygons inside a `<pattern>` element, and everything
//! before the last pattern, are not part of the drawing and are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use svg::node::element::tag;
use svg::parser::Event;

use crate::test_case::write_rows;
use crate::{HarnessError, Point2};

/// The polygons of a drawing.
///
/// `loops` holds one list of point indices per polygon. Indices run over all polygons, so
/// the first point of the second polygon follows the last point of the first one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    points: Vec<Point2>,
    loops: Vec<Vec<usize>>,
}

impl PolygonSet {
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn loops(&self) -> &[Vec<usize>] {
        &self.loops
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    fn push_polygon(&mut self, vertices: Vec<Point2>) {
        let first = self.points.len();
        self.loops.push((first..first + vertices.len()).collect());
        self.points.extend(vertices);
    }

    /// Writes the points as `x, y` rows and one `i, j, k, ...` row per polygon.
    pub fn write_csv(&self, points_path: &Path, edges_path: &Path) -> Result<(), HarnessError> {
        write_rows(points_path, self.points.iter().map(Point2::to_csv_row))?;
        write_rows(
            edges_path,
            self.loops.iter().map(|indices| {
                indices
                    .iter()
                    .map(|index| index.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            }),
        )
    }
}

/// Extracts the polygons of an SVG document.
pub fn parse_polygons(text: &str) -> Result<PolygonSet, HarnessError> {
    parse_at(text, Path::new("<memory>"))
}

/// Reads `svg_path` and writes its polygons to the two CSV files.
pub fn convert_file(
    svg_path: &Path,
    points_path: &Path,
    edges_path: &Path,
) -> Result<PolygonSet, HarnessError> {
    let text = fs::read_to_string(svg_path).map_err(|err| HarnessError::io(svg_path, err))?;
    let polygons = parse_at(&text, svg_path)?;
    if polygons.is_empty() {
        tracing::warn!(path = ?svg_path, "drawing contains no polygons");
    }
    polygons.write_csv(points_path, edges_path)?;
    Ok(polygons)
}

fn parse_at(text: &str, path: &Path) -> Result<PolygonSet, HarnessError> {
    let svg_error = |reason: String| HarnessError::Svg {
        path: PathBuf::from(path),
        reason,
    };

    let parser = svg::read(text).map_err(|err| svg_error(err.to_string()))?;
    let mut polygons = PolygonSet::default();
    let mut pattern_depth = 0usize;

    for event in parser {
        match event {
            Event::Error(error) => return Err(svg_error(error.to_string())),
            Event::Tag(name, kind, _) if name == tag::Pattern => match kind {
                tag::Type::Start => pattern_depth += 1,
                tag::Type::End => {
                    pattern_depth = pattern_depth.saturating_sub(1);
                    if pattern_depth == 0 {
                        polygons = PolygonSet::default();
                    }
                }
                tag::Type::Empty => {}
            },
            Event::Tag(name, tag::Type::Start | tag::Type::Empty, attributes)
                if name == tag::Polygon && pattern_depth == 0 =>
            {
                let Some(points) = attributes.get("points") else {
                    continue;
                };
                let vertices = parse_point_list(&points.to_string()).map_err(svg_error)?;
                polygons.push_polygon(vertices);
            }
            _ => {}
        }
    }
    Ok(polygons)
}

/// Parses a `points` attribute. The y axis of the drawing points down and is flipped.
fn parse_point_list(text: &str) -> Result<Vec<Point2>, String> {
    text.split(|c: char| !is_coordinate_char(c))
        .filter(|token| !token.is_empty())
        .map(|token| -> Result<Point2, String> {
            let mut parts = token.split(',');
            let x = parts.next().unwrap_or_default();
            let y = parts
                .next()
                .ok_or_else(|| format!("point `{}` has no y coordinate", token))?;
            Ok(Point2::new(parse_coordinate(x)?, -parse_coordinate(y)?))
        })
        .collect()
}

fn is_coordinate_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | ',')
}

fn parse_coordinate(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("`{}` is not a coordinate", text))
}

#[cfg(test)]
mod test {
    use std::fs;

    use svg::node::element::{Pattern, Polygon};
    use svg::Document;

    use super::{convert_file, parse_polygons};
    use crate::{HarnessError, Point2};

    fn drawing(document: Document) -> String {
        document.to_string()
    }

    #[test]
    fn test_polygons_are_flipped_and_indexed() {
        let text = drawing(
            Document::new()
                .add(Polygon::new().set("points", "0,0 10,0 10,10"))
                .add(Polygon::new().set("points", "20,5 30,5 30,15 20,15")),
        );
        let polygons = parse_polygons(&text).unwrap();

        assert_eq!(polygons.points().len(), 7);
        assert_eq!(polygons.points()[2], Point2::new(10.0, -10.0));
        assert_eq!(polygons.points()[3], Point2::new(20.0, -5.0));
        assert_eq!(polygons.loops(), &[vec![0, 1, 2], vec![3, 4, 5, 6]]);
    }

    #[test]
    fn test_only_polygons_after_patterns_are_kept() {
        let text = drawing(
            Document::new()
                .add(Polygon::new().set("points", "100,100 110,100 110,110"))
                .add(
                    Pattern::new()
                        .set("id", "hatch")
                        .add(Polygon::new().set("points", "1,1 2,1 2,2")),
                )
                .add(Polygon::new().set("points", "0,0 4,0 4,4")),
        );
        let polygons = parse_polygons(&text).unwrap();
        assert_eq!(polygons.loops(), &[vec![0, 1, 2]]);
        assert_eq!(polygons.points()[1], Point2::new(4.0, 0.0));
    }

    #[test]
    fn test_illustrator_spacing_and_exponents() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg">
<polygon fill="none" points="1.5,-2	3e2,4.25
    -7,1e-1 "/>
</svg>"#;
        let polygons = parse_polygons(text).unwrap();
        assert_eq!(
            polygons.points(),
            &[
                Point2::new(1.5, 2.0),
                Point2::new(300.0, -4.25),
                Point2::new(-7.0, -0.1),
            ]
        );
    }

    #[test]
    fn test_malformed_point_is_rejected() {
        let text = drawing(Document::new().add(Polygon::new().set("points", "0,0 5")));
        assert!(matches!(
            parse_polygons(&text),
            Err(HarnessError::Svg { .. })
        ));
    }

    #[test]
    fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let svg_path = dir.path().join("square.svg");
        let points_path = dir.path().join("points.csv");
        let edges_path = dir.path().join("edges.csv");
        fs::write(
            &svg_path,
            drawing(
                Document::new()
                    .add(Polygon::new().set("points", "0,0 2,0 2,2 0,2"))
                    .add(Polygon::new().set("points", "0.5,0.5 1,0.5 1,1")),
            ),
        )
        .unwrap();

        convert_file(&svg_path, &points_path, &edges_path).unwrap();
        assert_eq!(
            fs::read_to_string(&points_path).unwrap(),
            "0.0, -0.0\n2.0, -0.0\n2.0, -2.0\n0.0, -2.0\n0.5, -0.5\n1.0, -0.5\n1.0, -1.0\n"
        );
        assert_eq!(
            fs::read_to_string(&edges_path).unwrap(),
            "0, 1, 2, 3\n4, 5, 6\n"
        );
    }
}
