use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::point::edge_to_csv_row;
use crate::{Edge, HarnessError, Point2};

/// A named point cloud plus optional constraint edges.
///
/// Test cases are immutable once built; [TestCase::new] checks that every edge refers to an
/// existing point.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    name: String,
    points: Vec<Point2>,
    edges: Vec<Edge>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        points: Vec<Point2>,
        edges: Vec<Edge>,
    ) -> Result<Self, HarnessError> {
        let name = name.into();
        let point_count = points.len();
        if let Some(edge) = edges
            .iter()
            .find(|edge| edge[0] >= point_count || edge[1] >= point_count)
        {
            return Err(HarnessError::InvalidEdge {
                case: name,
                edge: *edge,
                point_count,
            });
        }
        Ok(TestCase {
            name,
            points,
            edges,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    /// Writes the points as `x, y` rows.
    pub fn write_points(&self, path: &Path) -> Result<(), HarnessError> {
        write_rows(path, self.points.iter().map(Point2::to_csv_row))
    }

    /// Writes the edges as `i, j` rows.
    pub fn write_edges(&self, path: &Path) -> Result<(), HarnessError> {
        write_rows(path, self.edges.iter().map(edge_to_csv_row))
    }
}

/// Writes one line per row, creating missing parent directories.
pub(crate) fn write_rows<I>(path: &Path, rows: I) -> Result<(), HarnessError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| HarnessError::io(parent, err))?;
        }
    }
    let file = fs::File::create(path).map_err(|err| HarnessError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}", row.as_ref()).map_err(|err| HarnessError::io(path, err))?;
    }
    writer.flush().map_err(|err| HarnessError::io(path, err))
}

/// Scratch files that exist for the duration of one tool run.
///
/// Files registered with the guard are removed when it is dropped. Dropping happens on
/// every exit path, including a crash that unwinds the runner through `?`.
#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the points of `test_case` to `points_path` and, if it has edges, the edges to
    /// `edges_path`.
    ///
    /// Returns the guard together with the edge file path, if one was written.
    pub fn write_test_case(
        test_case: &TestCase,
        points_path: impl Into<PathBuf>,
        edges_path: impl Into<PathBuf>,
    ) -> Result<(Self, Option<PathBuf>), HarnessError> {
        let mut guard = Self::new();
        let points_path = guard.register(points_path);
        test_case.write_points(&points_path)?;

        if !test_case.has_edges() {
            return Ok((guard, None));
        }
        let edges_path = guard.register(edges_path);
        test_case.write_edges(&edges_path)?;
        Ok((guard, Some(edges_path)))
    }

    /// Adds a file to the guard and returns its path.
    pub fn register(&mut self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        self.paths.push(path.clone());
        path
    }

    /// Stops tracking `path`, e.g. after it was moved somewhere else.
    pub fn forget(&mut self, path: &Path) {
        self.paths.retain(|registered| registered != path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => tracing::warn!(?path, %err, "could not remove scratch file"),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::{ScratchFiles, TestCase};
    use crate::{HarnessError, Point2};

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ]
    }

    #[test]
    fn test_out_of_range_edge_is_rejected() {
        let result = TestCase::new("square", square(), vec![[0, 1], [3, 4]]);
        match result {
            Err(HarnessError::InvalidEdge {
                edge, point_count, ..
            }) => {
                assert_eq!(edge, [3, 4]);
                assert_eq!(point_count, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_scratch_files_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let test_case = TestCase::new("square", square(), vec![[0, 1], [1, 2]]).unwrap();
        let points_path = dir.path().join("input/square.points.csv");
        let edges_path = dir.path().join("input/square.edges.csv");

        {
            let (guard, edges) =
                ScratchFiles::write_test_case(&test_case, &points_path, &edges_path).unwrap();
            assert_eq!(edges.as_deref(), Some(edges_path.as_path()));
            assert_eq!(guard.paths().len(), 2);
            assert_eq!(
                fs::read_to_string(&points_path).unwrap(),
                "0.0, 0.0\n0.0, 1.0\n1.0, 1.0\n1.0, 0.0\n"
            );
            assert_eq!(fs::read_to_string(&edges_path).unwrap(), "0, 1\n1, 2\n");
        }

        assert!(!points_path.exists());
        assert!(!edges_path.exists());
    }

    #[test]
    fn test_no_edge_file_without_edges() {
        let dir = tempfile::tempdir().unwrap();
        let test_case = TestCase::new("square", square(), vec![]).unwrap();
        let points_path = dir.path().join("points.csv");
        let edges_path = dir.path().join("edges.csv");

        let (guard, edges) =
            ScratchFiles::write_test_case(&test_case, &points_path, &edges_path).unwrap();
        assert!(edges.is_none());
        assert_eq!(guard.paths(), &[points_path.clone()]);
        assert!(points_path.exists());
        assert!(!edges_path.exists());

        drop(guard);
        assert!(!points_path.exists());
    }

    #[test]
    fn test_forgotten_files_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.csv");
        fs::write(&path, "1, 2\n").unwrap();

        let mut guard = ScratchFiles::new();
        guard.register(&path);
        guard.forget(&path);
        drop(guard);
        assert!(path.exists());
    }
}
