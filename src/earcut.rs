use num_traits::Float;

use crate::math;
use crate::{Point2, Polygon, Scalar, TessellationError};

/// A triangular decomposition of a simple polygon.
///
/// The triangles draw their corners from the polygon's (cleaned) boundary and
/// cover its interior exactly once, without overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleFan<S> {
    vertices: Vec<Point2<S>>,
    triangles: Vec<[usize; 3]>,
}

impl<S: Scalar + Float> TriangleFan<S> {
    /// The boundary vertices the triangle indices refer to.
    pub fn vertices(&self) -> &[Point2<S>] {
        &self.vertices
    }

    /// The triangles as counter clockwise index triples.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the vertex positions of the given triangle.
    pub fn positions(&self, triangle: usize) -> [Point2<S>; 3] {
        let [a, b, c] = self.triangles[triangle];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Returns the summed area of all triangles.
    pub fn area(&self) -> S {
        (0..self.triangles.len())
            .map(|triangle| math::triangle_area(self.positions(triangle)))
            .fold(S::zero(), |sum, area| sum + area)
    }
}

/// Decomposes a simple polygon into non-overlapping triangles by ear clipping.
///
/// Near-duplicate and collinear-redundant vertices are removed first. Fails
/// with [TessellationError::DegeneratePolygon] if fewer than 3 distinct
/// vertices remain and with [TessellationError::NonSimplePolygon] if the
/// boundary intersects itself.
///
/// Ear clipping handles any simple polygon, not only the convex cells
/// produced by the clipping stage.
pub fn triangulate_polygon<S: Scalar + Float>(
    polygon: &Polygon<S>,
    epsilon: S,
) -> Result<TriangleFan<S>, TessellationError> {
    let cleaned = polygon.clone().dedup(epsilon).into_ccw();
    let vertices = remove_collinear(cleaned.vertices().to_vec(), epsilon);

    if vertices.len() < 3 {
        return Err(TessellationError::DegeneratePolygon);
    }
    let cleaned = Polygon::new(vertices);
    if !cleaned.is_simple() {
        return Err(TessellationError::NonSimplePolygon);
    }
    // A self-intersecting boundary can also have near-zero net area, so this
    // check must come second.
    if cleaned.area() <= epsilon {
        return Err(TessellationError::DegeneratePolygon);
    }

    let vertices = cleaned.vertices().to_vec();
    let mut remaining: Vec<usize> = (0..vertices.len()).collect();
    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(vertices.len() - 2);

    // A strict ear test can starve on exactly cocircular cell geometry where a
    // vertex falls onto an ear's boundary; the tolerant pass only rejects ears
    // with a vertex strictly inside.
    let mut allow_boundary_contact = false;

    while remaining.len() > 3 {
        let ear = find_ear(&vertices, &remaining, allow_boundary_contact);
        match ear {
            Some(index) => {
                let m = remaining.len();
                let previous = remaining[(index + m - 1) % m];
                let current = remaining[index];
                let next = remaining[(index + 1) % m];
                triangles.push([previous, current, next]);
                remaining.remove(index);
                allow_boundary_contact = false;
            }
            None if !allow_boundary_contact => allow_boundary_contact = true,
            None => {
                // A simple polygon always has an ear (two ears theorem), so the
                // precondition must have been violated.
                return Err(TessellationError::NonSimplePolygon);
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    Ok(TriangleFan {
        vertices,
        triangles,
    })
}

/// Drops every vertex whose neighbors span a triangle of area below
/// `epsilon²`, repeating until the boundary is stable.
fn remove_collinear<S: Scalar + Float>(
    mut vertices: Vec<Point2<S>>,
    epsilon: S,
) -> Vec<Point2<S>> {
    let epsilon_2 = epsilon * epsilon;
    loop {
        let n = vertices.len();
        if n < 3 {
            return vertices;
        }
        let redundant = (0..n).find(|&index| {
            let previous = vertices[(index + n - 1) % n];
            let current = vertices[index];
            let next = vertices[(index + 1) % n];
            math::triangle_area([previous, current, next]) <= epsilon_2
        });
        match redundant {
            Some(index) => {
                vertices.remove(index);
            }
            None => return vertices,
        }
    }
}

fn find_ear<S: Scalar + Float>(
    vertices: &[Point2<S>],
    remaining: &[usize],
    allow_boundary_contact: bool,
) -> Option<usize> {
    let m = remaining.len();
    for index in 0..m {
        let previous = vertices[remaining[(index + m - 1) % m]];
        let current = vertices[remaining[index]];
        let next = vertices[remaining[(index + 1) % m]];

        // Only convex corners can be ears
        if !math::side_query(previous, current, next).is_on_left_side() {
            continue;
        }

        let corner_indices = [
            remaining[(index + m - 1) % m],
            remaining[index],
            remaining[(index + 1) % m],
        ];
        let blocked = remaining
            .iter()
            .filter(|candidate| !corner_indices.contains(candidate))
            .any(|&candidate| {
                let point = vertices[candidate];
                if allow_boundary_contact {
                    strictly_in_triangle(previous, current, next, point)
                } else {
                    in_triangle_or_on_boundary(previous, current, next, point)
                }
            });

        if !blocked {
            return Some(index);
        }
    }
    None
}

fn strictly_in_triangle<S: Scalar>(
    a: Point2<S>,
    b: Point2<S>,
    c: Point2<S>,
    point: Point2<S>,
) -> bool {
    math::side_query(a, b, point).is_on_left_side()
        && math::side_query(b, c, point).is_on_left_side()
        && math::side_query(c, a, point).is_on_left_side()
}

fn in_triangle_or_on_boundary<S: Scalar>(
    a: Point2<S>,
    b: Point2<S>,
    c: Point2<S>,
    point: Point2<S>,
) -> bool {
    math::side_query(a, b, point).is_on_left_side_or_on_line()
        && math::side_query(b, c, point).is_on_left_side_or_on_line()
        && math::side_query(c, a, point).is_on_left_side_or_on_line()
}

#[cfg(test)]
mod test {
    use super::triangulate_polygon;
    use crate::test_utilities::{random_points_with_seed, SEED2};
    use crate::{
        build_dual, cell_polygons, triangulate, BoundingRect, Point2, PointSet, Polygon,
        TessellationError,
    };
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1.0e-6;

    fn polygon(vertices: &[(f64, f64)]) -> Polygon<f64> {
        Polygon::new(vertices.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    #[test]
    fn test_square() {
        let square = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let fan = triangulate_polygon(&square, EPSILON).unwrap();

        assert_eq!(fan.num_triangles(), 2);
        assert_relative_eq!(fan.area(), 1.0);
    }

    #[test]
    fn test_pentagon() {
        let pentagon = polygon(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.5, 1.5),
            (1.0, 2.5),
            (-0.5, 1.5),
        ]);
        let fan = triangulate_polygon(&pentagon, EPSILON).unwrap();

        assert_eq!(fan.num_triangles(), 3);
        assert_relative_eq!(fan.area(), pentagon.area(), epsilon = 1.0e-9);
    }

    #[test]
    fn test_concave_l_shape() {
        let l_shape = polygon(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let fan = triangulate_polygon(&l_shape, EPSILON).unwrap();

        assert_eq!(fan.num_triangles(), 4);
        assert_relative_eq!(fan.area(), 3.0, epsilon = 1.0e-9);
    }

    #[test]
    fn test_clockwise_input_is_normalized() {
        let clockwise = polygon(&[(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        let fan = triangulate_polygon(&clockwise, EPSILON).unwrap();
        assert_relative_eq!(fan.area(), 1.0);

        // Every emitted triangle is counter clockwise
        for triangle in 0..fan.num_triangles() {
            let [a, b, c] = fan.positions(triangle);
            assert!(crate::math::side_query(a, b, c).is_on_left_side());
        }
    }

    #[test]
    fn test_collinear_redundant_vertices() {
        let with_midpoints = polygon(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let fan = triangulate_polygon(&with_midpoints, EPSILON).unwrap();

        // The midpoints are removed, leaving a plain square
        assert_eq!(fan.num_triangles(), 2);
        assert_relative_eq!(fan.area(), 4.0);
    }

    #[test]
    fn test_degenerate_polygon() {
        let too_few = polygon(&[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(
            triangulate_polygon(&too_few, EPSILON).err(),
            Some(TessellationError::DegeneratePolygon)
        );

        let collinear = polygon(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(
            triangulate_polygon(&collinear, EPSILON).err(),
            Some(TessellationError::DegeneratePolygon)
        );

        let duplicates = polygon(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert_eq!(
            triangulate_polygon(&duplicates, EPSILON).err(),
            Some(TessellationError::DegeneratePolygon)
        );
    }

    #[test]
    fn test_non_simple_polygon() {
        let bowtie = polygon(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert_eq!(
            triangulate_polygon(&bowtie, EPSILON).err(),
            Some(TessellationError::NonSimplePolygon)
        );
    }

    #[test]
    fn test_fan_area_matches_shoelace_for_cells() {
        let rect = BoundingRect::default();
        let points: PointSet<f64> = random_points_with_seed(25, SEED2).into_iter().collect();
        let mesh = triangulate(&points, EPSILON).unwrap();
        let diagram = build_dual(&mesh, EPSILON).unwrap();
        let cells = cell_polygons(&diagram, &rect, EPSILON);

        for (_, cell_polygon) in cells.iter() {
            let fan = triangulate_polygon(cell_polygon, EPSILON).unwrap();
            assert_relative_eq!(fan.area(), cell_polygon.area(), epsilon = 1.0e-6);
            assert_eq!(fan.num_triangles(), fan.vertices().len() - 2);
        }
    }
}
