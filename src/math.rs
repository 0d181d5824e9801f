use num_traits::Float;
use thiserror::Error;

use crate::{Point2, Scalar};

/// The error type used for validating input coordinates.
///
/// Errors can only originate from an invalid site position. Positions can
/// be checked for validity by using [validate_point].
#[derive(Error, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Debug, Hash)]
pub enum CoordinateError {
    /// A coordinate value was too small.
    ///
    /// The absolute value of any coordinate must either be zero or greater
    /// than or equal to [MIN_ALLOWED_VALUE].
    #[error("coordinate value is too small")]
    TooSmall,

    /// A coordinate value was too large.
    ///
    /// The absolute value of any coordinate must be less than or equal to
    /// [MAX_ALLOWED_VALUE].
    #[error("coordinate value is too large")]
    TooLarge,

    /// A coordinate value was NaN.
    #[error("coordinate value is NaN")]
    NAN,
}

/// The smallest allowed coordinate value greater than zero. This value is equal
/// to 2<sup>-142</sup>.
///
/// The *absolute value* of any input coordinate must be either zero or greater
/// than or equal to this value.
/// This is a requirement for preventing floating point underflow when calculating
/// exact geometric predicates.

// Implementation note: These numbers come from the paper of Jonathan Richard Shewchuk:
// "The four predicates implemented for this report will not overflow nor underflow if
// their inputs have exponents in the range -[142, 201] and IEEE-745 double precision
// arithmetic is used."
// Source: Adaptive Precision Floating-Point Arithmetic and Fast Robust Geometric Predicates
pub const MIN_ALLOWED_VALUE: f64 = 1.793662034335766e-43; // 1.0 * 2^-142

/// The largest allowed coordinate value. This value is equal to 2<sup>201</sup>.
///
/// The *absolute value* of any input coordinate must be either smaller than or
/// equal to this value.
/// This is a requirement for preventing floating point overflow when calculating
/// exact geometric predicates.
pub const MAX_ALLOWED_VALUE: f64 = 3.2138760885179806e60; // 1.0 * 2^201

/// Checks if a coordinate value is suitable for the tessellation pipeline.
///
/// Will return an error if and only if
///  - The absolute value of the coordinate is too small (See [MIN_ALLOWED_VALUE])
///  - The absolute value of the coordinate is too large (See [MAX_ALLOWED_VALUE])
///  - The coordinate is NaN (not a number)
///
/// Passing in any non-finite floating point number (e.g. `f32::NEG_INFINITY`) will
/// result in `Err(CoordinateError::TooLarge)`.
pub fn validate_coordinate<S: Scalar>(value: S) -> Result<(), CoordinateError> {
    let as_f64: f64 = value.into();
    if as_f64.is_nan() {
        Err(CoordinateError::NAN)
    } else if as_f64.abs() < MIN_ALLOWED_VALUE && as_f64 != 0.0 {
        Err(CoordinateError::TooSmall)
    } else if as_f64.abs() > MAX_ALLOWED_VALUE {
        Err(CoordinateError::TooLarge)
    } else {
        Ok(())
    }
}

/// Checks if a point is suitable for the tessellation pipeline.
///
/// A point is considered suitable if both of its coordinates are valid. See
/// [validate_coordinate] for more information.
pub fn validate_point<S: Scalar>(point: Point2<S>) -> Result<(), CoordinateError> {
    validate_coordinate(point.x)?;
    validate_coordinate(point.y)?;
    Ok(())
}

/// Prevents underflow issues of a position by setting any coordinate that is too
/// small to zero.
///
/// A point with a position returned by this function will never cause
/// [CoordinateError::TooSmall]. Note that this method will _always_ round towards
/// zero, even if rounding to ±[MIN_ALLOWED_VALUE] would result in a smaller
/// rounding error.
///
/// This function might be useful if the positions come from an uncontrollable
/// source like user input.
pub fn mitigate_underflow(position: Point2<f64>) -> Point2<f64> {
    Point2::new(
        mitigate_underflow_for_coordinate(position.x),
        mitigate_underflow_for_coordinate(position.y),
    )
}

fn mitigate_underflow_for_coordinate<S: Scalar>(coordinate: S) -> S {
    if coordinate != S::zero() && coordinate.abs().into() < MIN_ALLOWED_VALUE {
        S::zero()
    } else {
        coordinate
    }
}

/// Describes on which side of a line a point lies.
///
/// Returned by [side_query].
#[derive(Debug, Clone, Copy)]
pub struct LineSideInfo {
    signed_side: f64,
}

impl PartialEq for LineSideInfo {
    fn eq(&self, other: &LineSideInfo) -> bool {
        if self.is_on_line() || other.is_on_line() {
            self.is_on_line() && other.is_on_line()
        } else {
            self.is_on_right_side() == other.is_on_right_side()
        }
    }
}

impl LineSideInfo {
    #[inline]
    pub(crate) fn from_determinant(s: f64) -> LineSideInfo {
        LineSideInfo { signed_side: s }
    }

    /// Returns `true` if a point lies on the left side of a line.
    ///
    /// This method returns `false` if the point lies exactly on the line.
    pub fn is_on_left_side(&self) -> bool {
        self.signed_side > 0.0
    }

    /// Returns `true` if a point lies on the right side of a line.
    ///
    /// This method returns `false` if the point lies exactly on the line.
    pub fn is_on_right_side(&self) -> bool {
        self.signed_side < 0.0
    }

    /// Returns `true` if a point lies on the left side of a line or is on the
    /// line itself.
    pub fn is_on_left_side_or_on_line(&self) -> bool {
        self.signed_side >= 0.0
    }

    /// Returns `true` if a point lies on the right side of a line or is on the
    /// line itself.
    pub fn is_on_right_side_or_on_line(self) -> bool {
        self.signed_side <= 0.0
    }

    /// Returns `true` if a point lies exactly on this line.
    #[inline]
    pub fn is_on_line(self) -> bool {
        self.signed_side.abs() == 0.0
    }

    /// Returns the opposite of this `LineSideInfo`.
    pub fn reversed(self) -> LineSideInfo {
        LineSideInfo {
            signed_side: -self.signed_side,
        }
    }
}

fn to_robust_coord<S: Scalar>(point: Point2<S>) -> robust::Coord<S> {
    robust::Coord {
        x: point.x,
        y: point.y,
    }
}

/// Returns `true` if `p` lies strictly inside the circle through `v1`, `v2` and `v3`.
///
/// The vertices are expected to be ordered counter clockwise.
pub fn contained_in_circumference<S>(
    v1: Point2<S>,
    v2: Point2<S>,
    v3: Point2<S>,
    p: Point2<S>,
) -> bool
where
    S: Scalar,
{
    let v1 = to_robust_coord(v1);
    let v2 = to_robust_coord(v2);
    let v3 = to_robust_coord(v3);
    let p = to_robust_coord(p);

    // incircle expects all vertices to be ordered CW for right handed systems.
    // For consistency, the public interface of this method will expect the points to be
    // ordered ccw.
    robust::incircle(v3, v2, v1, p) < 0.0
}

/// Determines on which side of the line through `p1` and `p2` the query point lies.
///
/// Uses an exact predicate - the result is reliable even for nearly collinear
/// inputs.
pub fn side_query<S>(p1: Point2<S>, p2: Point2<S>, query_point: Point2<S>) -> LineSideInfo
where
    S: Scalar,
{
    let p1 = to_robust_coord(p1);
    let p2 = to_robust_coord(p2);
    let query_point = to_robust_coord(query_point);

    let result = robust::orient2d(p1, p2, query_point);
    LineSideInfo::from_determinant(result)
}

/// Computes the circumcenter of three points together with the squared
/// circumradius.
///
/// The result is only meaningful for non-degenerate (non collinear) input.
pub fn circumcenter<S>(positions: [Point2<S>; 3]) -> (Point2<S>, S)
where
    S: Scalar + Float,
{
    let [v0, v1, v2] = positions;
    let b = v1.sub(v0);
    let c = v2.sub(v0);

    let one = S::one();
    let two = one + one;
    let d = two * (b.x * c.y - c.x * b.y);
    let len_b = b.dot(b);
    let len_c = c.dot(c);
    let d_inv: S = one / d;

    let x = (len_b * c.y - len_c * b.y) * d_inv;
    let y = (-len_b * c.x + len_c * b.x) * d_inv;
    let result = Point2::new(x, y);
    (result.add(v0), x * x + y * y)
}

/// Returns the (unsigned) area of the triangle spanned by the three positions.
pub fn triangle_area<S>(positions: [Point2<S>; 3]) -> S
where
    S: Scalar,
{
    let [v0, v1, v2] = positions;
    let b = v1.sub(v0);
    let c = v2.sub(v0);
    (b.x * c.y - b.y * c.x).abs() * 0.5.into()
}

/// Checks whether the segments `from0 -> to0` and `from1 -> to1` intersect in a
/// single point that is not a shared endpoint.
///
/// Touching endpoints do not count as an intersection; collinear overlapping
/// segments do.
pub(crate) fn segments_properly_intersect<S>(
    from0: Point2<S>,
    to0: Point2<S>,
    from1: Point2<S>,
    to1: Point2<S>,
) -> bool
where
    S: Scalar,
{
    let other_from = side_query(from0, to0, from1);
    let other_to = side_query(from0, to0, to1);
    let self_from = side_query(from1, to1, from0);
    let self_to = side_query(from1, to1, to0);

    if [&other_from, &other_to, &self_from, &self_to]
        .iter()
        .all(|q| q.is_on_line())
    {
        // All four endpoints on a common line. The segments intersect iff their
        // projections onto that line overlap in more than a single point.
        let dir = to0.sub(from0);
        let (a0, a1) = sorted_pair(from0.dot(dir), to0.dot(dir));
        let (b0, b1) = sorted_pair(from1.dot(dir), to1.dot(dir));
        return a0 < b1 && b0 < a1;
    }

    if other_from.is_on_line() || other_to.is_on_line() || self_from.is_on_line() || self_to.is_on_line()
    {
        // An endpoint of one segment touches the other segment's interior.
        return endpoint_touches_interior(from0, to0, from1)
            || endpoint_touches_interior(from0, to0, to1)
            || endpoint_touches_interior(from1, to1, from0)
            || endpoint_touches_interior(from1, to1, to0);
    }

    other_from != other_to && self_from != self_to
}

fn endpoint_touches_interior<S>(from: Point2<S>, to: Point2<S>, query: Point2<S>) -> bool
where
    S: Scalar,
{
    if !side_query(from, to, query).is_on_line() {
        return false;
    }
    if query == from || query == to {
        return false;
    }
    let dir = to.sub(from);
    let factor = query.sub(from).dot(dir);
    factor > S::zero() && factor < dir.length2()
}

fn sorted_pair<S: Scalar>(a: S, b: S) -> (S, S) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod test {
    use super::validate_coordinate;
    use crate::{CoordinateError, Point2};
    use approx::assert_relative_eq;

    #[test]
    fn test_validate_coordinate() {
        use super::CoordinateError::*;
        assert_eq!(validate_coordinate(f64::NAN), Err(NAN));
        let max_value = super::MAX_ALLOWED_VALUE;

        assert_eq!(validate_coordinate(f64::INFINITY), Err(TooLarge));
        assert_eq!(validate_coordinate(f64::NEG_INFINITY), Err(TooLarge));
        assert_eq!(validate_coordinate(max_value * 2.0), Err(TooLarge));

        let min_value = super::MIN_ALLOWED_VALUE;
        assert_eq!(validate_coordinate(min_value / 2.0), Err(TooSmall));

        let tiny_float = f32::MIN_POSITIVE;
        assert_eq!(validate_coordinate(tiny_float), Ok(()));

        let big_float = f32::MAX;
        assert_eq!(validate_coordinate(big_float), Ok(()));

        assert_eq!(validate_coordinate(min_value), Ok(()));
        assert_eq!(validate_coordinate(0.0), Ok(()));
    }

    #[test]
    fn test_mitigate_underflow() {
        for number_under_test in [
            super::MIN_ALLOWED_VALUE * 0.5,
            super::MIN_ALLOWED_VALUE * -0.5,
            f64::MIN_POSITIVE,
            -f64::MIN_POSITIVE,
        ] {
            assert!(validate_coordinate(number_under_test).is_err());
            let mitigated = super::mitigate_underflow_for_coordinate(number_under_test);
            assert_ne!(mitigated, number_under_test);
            assert_eq!(mitigated, 0.0);
        }

        assert_eq!(
            validate_coordinate(super::mitigate_underflow_for_coordinate(f64::NAN)),
            Err(CoordinateError::NAN),
        );

        assert_eq!(
            validate_coordinate(super::mitigate_underflow_for_coordinate(f64::INFINITY)),
            Err(CoordinateError::TooLarge),
        );
    }

    #[test]
    fn check_min_value() {
        let mut expected = 1.0f64;
        for _ in 0..142 {
            expected *= 0.5;
        }

        assert_eq!(super::MIN_ALLOWED_VALUE, expected);
    }

    #[test]
    fn check_max_value() {
        let mut expected = 1.0f64;
        for _ in 0..201 {
            expected *= 2.0;
        }

        assert_eq!(super::MAX_ALLOWED_VALUE, expected);
    }

    #[test]
    fn test_edge_side() {
        use super::side_query;

        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(1.0, 1.0);

        assert!(side_query(p1, p2, Point2::new(1.0, 0.0)).is_on_right_side());
        assert!(side_query(p1, p2, Point2::new(0.0, 1.0)).is_on_left_side());
        assert!(side_query(p1, p2, Point2::new(0.5, 0.5)).is_on_line());
    }

    #[test]
    fn test_circumcenter() {
        let (center, _) = super::circumcenter([
            Point2::new(0.0f64, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        assert_relative_eq!(center.x, 0.5);
        assert_relative_eq!(center.y, 0.5);

        // Equidistance to all three vertices
        let vertices = [
            Point2::new(2.0f64, 1.0),
            Point2::new(4.5, 2.5),
            Point2::new(1.5, 4.0),
        ];
        let (center, radius_2) = super::circumcenter(vertices);
        for vertex in vertices {
            assert_relative_eq!(center.distance_2(vertex), radius_2, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn test_triangle_area() {
        let area = super::triangle_area([
            Point2::new(0.0f64, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ]);
        assert_relative_eq!(area, 2.0);

        let collinear = super::triangle_area([
            Point2::new(0.0f64, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 3.0),
        ]);
        assert_relative_eq!(collinear, 0.0);
    }

    #[test]
    fn test_contained_in_circumference() {
        use super::contained_in_circumference;

        let (a1, a2, a3) = (3f64, 2f64, 1f64);
        let offset = Point2::new(0.5, 0.7);
        let v1 = Point2::new(a1.sin(), a1.cos()).mul(2.).add(offset);
        let v2 = Point2::new(a2.sin(), a2.cos()).mul(2.).add(offset);
        let v3 = Point2::new(a3.sin(), a3.cos()).mul(2.).add(offset);
        assert!(super::side_query(v1, v2, v3).is_on_left_side());
        assert!(contained_in_circumference(v1, v2, v3, offset));
        let shrunk = (v1.sub(offset)).mul(0.9).add(offset);
        assert!(contained_in_circumference(v1, v2, v3, shrunk));
        let expanded = (v1.sub(offset)).mul(1.1).add(offset);
        assert!(!contained_in_circumference(v1, v2, v3, expanded));
        assert!(!contained_in_circumference(
            v1,
            v2,
            v3,
            Point2::new(2.0 + offset.x, 2.0 + offset.y)
        ));
        assert!(contained_in_circumference(
            Point2::new(0f64, 0f64),
            Point2::new(0f64, -1f64),
            Point2::new(1f64, 0f64),
            Point2::new(0f64, -0.5f64)
        ));
    }

    #[test]
    fn test_segments_properly_intersect() {
        use super::segments_properly_intersect;

        let (f0, t0) = (Point2::new(0., 0.), Point2::new(5., 5.0));
        let (f1, t1) = (Point2::new(-1.5, 1.), Point2::new(1.0, -1.5));
        let (f2, t2) = (Point2::new(0.5, 4.), Point2::new(0.5, -4.));

        assert!(!segments_properly_intersect(f0, t0, f1, t1));
        assert!(!segments_properly_intersect(f1, t1, f0, t0));
        assert!(segments_properly_intersect(f0, t0, f2, t2));
        assert!(segments_properly_intersect(f2, t2, f0, t0));
        assert!(segments_properly_intersect(f1, t1, f2, t2));
        assert!(segments_properly_intersect(f2, t2, f1, t1));
    }

    #[test]
    fn test_segments_touching_endpoints() {
        use super::segments_properly_intersect;

        // Sharing an endpoint is not an intersection
        let shared = Point2::new(1.0, 1.0);
        assert!(!segments_properly_intersect(
            Point2::new(0.0, 0.0),
            shared,
            shared,
            Point2::new(2.0, 0.0),
        ));

        // One endpoint in the other segment's interior is
        assert!(segments_properly_intersect(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 2.0),
        ));
    }

    #[test]
    fn test_segments_collinear() {
        use super::segments_properly_intersect;

        // Collinear with overlap
        assert!(segments_properly_intersect(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 3.0),
        ));

        // Collinear without overlap
        assert!(!segments_properly_intersect(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ));
    }
}
