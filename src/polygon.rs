use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math;
use crate::{Point2, Scalar};

/// A simple closed polygon.
///
/// The boundary is stored as an open vertex sequence - the first vertex is not
/// repeated at the end, the closing edge is implicit. Polygons produced by the
/// pipeline are counter clockwise and free of repeated consecutive vertices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct Polygon<S> {
    vertices: Vec<Point2<S>>,
}

impl<S: Scalar + Float> Polygon<S> {
    /// Creates a polygon from a vertex sequence.
    pub fn new(vertices: Vec<Point2<S>>) -> Self {
        Self { vertices }
    }

    /// Returns the boundary vertices. The closing edge back to the first
    /// vertex is implicit.
    pub fn vertices(&self) -> &[Point2<S>] {
        &self.vertices
    }

    /// Returns the number of boundary vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the signed area by the shoelace formula. Positive for counter
    /// clockwise boundaries.
    pub fn signed_area(&self) -> S {
        let n = self.vertices.len();
        if n < 3 {
            return S::zero();
        }
        let mut sum = S::zero();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum = sum + (a.x * b.y - b.x * a.y);
        }
        sum / (S::one() + S::one())
    }

    /// Returns the enclosed area.
    pub fn area(&self) -> S {
        self.signed_area().abs()
    }

    /// Returns `true` if the boundary is counter clockwise.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() >= S::zero()
    }

    /// Reverses the boundary if necessary so that it runs counter clockwise.
    pub fn into_ccw(mut self) -> Self {
        if !self.is_ccw() {
            self.vertices.reverse();
        }
        self
    }

    /// Removes consecutive vertices closer together than `epsilon`, including
    /// the pair wrapping around the end of the sequence.
    pub fn dedup(mut self, epsilon: S) -> Self {
        let epsilon_2 = epsilon * epsilon;
        let mut deduped: Vec<Point2<S>> = Vec::with_capacity(self.vertices.len());
        for vertex in self.vertices.drain(..) {
            if deduped
                .last()
                .is_some_and(|last| last.distance_2(vertex) <= epsilon_2)
            {
                continue;
            }
            deduped.push(vertex);
        }
        while deduped.len() > 1 {
            let first = deduped[0];
            let last = *deduped.last().unwrap();
            if first.distance_2(last) <= epsilon_2 {
                deduped.pop();
            } else {
                break;
            }
        }
        Self { vertices: deduped }
    }

    /// Checks that no two non-adjacent boundary edges intersect.
    ///
    /// Adjacent edges naturally share a vertex; any other contact, including
    /// collinear overlap, makes the polygon non-simple. O(n²).
    pub fn is_simple(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            let (a0, a1) = (self.vertices[i], self.vertices[(i + 1) % n]);
            for j in i + 1..n {
                // Skip the edge itself and the two adjacent edges
                if j == i || (j + 1) % n == i || (i + 1) % n == j {
                    continue;
                }
                let (b0, b1) = (self.vertices[j], self.vertices[(j + 1) % n]);
                if math::segments_properly_intersect(a0, a1, b0, b1) {
                    return false;
                }
            }
        }
        true
    }
}

/// An axis aligned rectangle used as the clipping region for Voronoi cells.
///
/// The default covers `[0, 10] × [0, 10]`, the canvas scale this crate's
/// typical inputs live on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct BoundingRect<S> {
    min: Point2<S>,
    max: Point2<S>,
}

impl<S: Scalar + Float> BoundingRect<S> {
    /// Creates a rectangle from two opposite corners, in any order.
    pub fn new(a: Point2<S>, b: Point2<S>) -> Self {
        Self {
            min: Point2::new(Float::min(a.x, b.x), Float::min(a.y, b.y)),
            max: Point2::new(Float::max(a.x, b.x), Float::max(a.y, b.y)),
        }
    }

    /// The corner with the smallest coordinates.
    pub fn min(&self) -> Point2<S> {
        self.min
    }

    /// The corner with the largest coordinates.
    pub fn max(&self) -> Point2<S> {
        self.max
    }

    /// The rectangle's center.
    pub fn center(&self) -> Point2<S> {
        let two = S::one() + S::one();
        Point2::new((self.min.x + self.max.x) / two, (self.min.y + self.max.y) / two)
    }

    /// The length of the rectangle's diagonal.
    pub fn diameter(&self) -> S {
        self.max.sub(self.min).length2().sqrt()
    }

    /// The rectangle's area.
    pub fn area(&self) -> S {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }

    /// The four corners in counter clockwise order, starting at `min`.
    pub fn corners(&self) -> [Point2<S>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// Returns `true` if the point lies inside the rectangle or within
    /// `epsilon` of its boundary.
    pub fn contains(&self, point: Point2<S>, epsilon: S) -> bool {
        point.x >= self.min.x - epsilon
            && point.x <= self.max.x + epsilon
            && point.y >= self.min.y - epsilon
            && point.y <= self.max.y + epsilon
    }
}

impl<S: Scalar + Float> Default for BoundingRect<S> {
    fn default() -> Self {
        let zero = S::zero();
        let ten: S = 10.0f32.into();
        Self {
            min: Point2::new(zero, zero),
            max: Point2::new(ten, ten),
        }
    }
}
