use log::debug;
use smallvec::SmallVec;

use crate::{Point2, Scalar};

/// An ordered collection of input sites.
///
/// Insertion order is preserved so that sites can be addressed by a stable
/// index. No uniqueness is enforced structurally - near-duplicate sites are
/// merged later, during triangulation (see [SiteMerge]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet<S> {
    points: Vec<Point2<S>>,
}

impl<S: Scalar> PointSet<S> {
    /// Creates an empty point set.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Appends a site and returns the new number of sites.
    pub fn add(&mut self, x: S, y: S) -> usize {
        self.points.push(Point2::new(x, y));
        self.points.len()
    }

    /// Appends a site given as a point.
    pub fn push(&mut self, point: Point2<S>) {
        self.points.push(point);
    }

    /// Removes all sites.
    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Returns the number of sites.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the set contains no sites.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the sites in insertion order.
    pub fn points(&self) -> &[Point2<S>] {
        &self.points
    }

    /// Returns an iterator over the sites in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point2<S>> {
        self.points.iter()
    }

    /// Collapses sites that lie within `epsilon` of an earlier site.
    ///
    /// Every original index remains addressable through the returned mapping.
    pub fn merge_sites(&self, epsilon: S) -> SiteMerge<S> {
        let epsilon_2 = epsilon * epsilon;
        let mut sites: Vec<Point2<S>> = Vec::with_capacity(self.points.len());
        let mut merged_of = Vec::with_capacity(self.points.len());
        let mut sources: Vec<SmallVec<[usize; 1]>> = Vec::new();

        for (index, &point) in self.points.iter().enumerate() {
            let existing = sites
                .iter()
                .position(|site| site.distance_2(point) <= epsilon_2);
            match existing {
                Some(merged_index) => {
                    merged_of.push(merged_index);
                    sources[merged_index].push(index);
                }
                None => {
                    merged_of.push(sites.len());
                    sources.push(SmallVec::from_slice(&[index]));
                    sites.push(point);
                }
            }
        }

        if sites.len() != self.points.len() {
            debug!(
                "merged {} near-duplicate sites, {} distinct sites remain",
                self.points.len() - sites.len(),
                sites.len()
            );
        }

        SiteMerge {
            sites,
            merged_of,
            sources,
        }
    }
}

impl<S: Scalar> From<Vec<Point2<S>>> for PointSet<S> {
    fn from(points: Vec<Point2<S>>) -> Self {
        Self { points }
    }
}

impl<S: Scalar> FromIterator<Point2<S>> for PointSet<S> {
    fn from_iter<T: IntoIterator<Item = Point2<S>>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<S> std::ops::Index<usize> for PointSet<S> {
    type Output = Point2<S>;

    fn index(&self, index: usize) -> &Point2<S> {
        &self.points[index]
    }
}

/// The result of collapsing near-duplicate sites.
///
/// `sites` holds one representative per distinct position, in order of first
/// occurrence. `merged_of` maps every original index to its representative,
/// `sources` lists the original indices behind each representative. All
/// per-site pipeline outputs are keyed by representative index and can be
/// resolved back to original indices through this mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMerge<S> {
    /// The distinct sites, ordered by first occurrence.
    pub sites: Vec<Point2<S>>,
    /// Maps each original index to its index in `sites`.
    pub merged_of: Vec<usize>,
    /// Maps each index in `sites` to the original indices it represents.
    pub sources: Vec<SmallVec<[usize; 1]>>,
}
