use hashbrown::HashMap;
use log::debug;
use num_traits::Float;
use smallvec::SmallVec;

use crate::math;
use crate::{Point2, PointSet, Scalar, SiteMerge, TessellationError};

/// A single triangle of a [Mesh].
///
/// Vertices are indices into the mesh's site list, stored in counter clockwise
/// order. `neighbors[i]` is the triangle across the edge from `vertices[i]` to
/// `vertices[(i + 1) % 3]`; `None` marks a convex hull edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTriangle {
    vertices: [usize; 3],
    neighbors: [Option<usize>; 3],
}

impl MeshTriangle {
    /// The three site indices in counter clockwise order.
    #[inline]
    pub fn vertices(&self) -> [usize; 3] {
        self.vertices
    }

    /// The neighboring triangle indices, one per edge.
    #[inline]
    pub fn neighbors(&self) -> [Option<usize>; 3] {
        self.neighbors
    }

    /// The three directed edges in counter clockwise order.
    #[inline]
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Returns `true` if `site` is one of this triangle's vertices.
    #[inline]
    pub fn contains_vertex(&self, site: usize) -> bool {
        self.vertices.contains(&site)
    }
}

/// A Delaunay triangulation over a set of distinct sites.
///
/// The mesh satisfies the empty circumcircle property: no site lies strictly
/// inside the circumcircle of any triangle. The union of all triangles is the
/// convex hull of the sites.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<S> {
    merge: SiteMerge<S>,
    triangles: Vec<MeshTriangle>,
}

impl<S: Scalar + Float> Mesh<S> {
    pub(crate) fn from_parts(merge: SiteMerge<S>, triangles: Vec<MeshTriangle>) -> Self {
        Mesh { merge, triangles }
    }

    /// Returns the distinct sites the mesh was built over.
    pub fn sites(&self) -> &[Point2<S>] {
        &self.merge.sites
    }

    /// Returns the triangles of the mesh.
    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the site merge record mapping original point indices to the
    /// distinct sites of this mesh.
    pub fn site_merge(&self) -> &SiteMerge<S> {
        &self.merge
    }

    /// Returns the vertex positions of the given triangle.
    pub fn positions(&self, triangle: usize) -> [Point2<S>; 3] {
        let [a, b, c] = self.triangles[triangle].vertices;
        [self.merge.sites[a], self.merge.sites[b], self.merge.sites[c]]
    }

    /// Returns the circumcenter of the given triangle.
    pub fn circumcenter(&self, triangle: usize) -> Point2<S> {
        math::circumcenter(self.positions(triangle)).0
    }

    /// Returns the number of convex hull edges, which equals the number of
    /// convex hull vertices.
    pub fn convex_hull_len(&self) -> usize {
        self.triangles
            .iter()
            .flat_map(|triangle| triangle.neighbors)
            .filter(|neighbor| neighbor.is_none())
            .count()
    }
}

/// Triangulates a point set after merging sites closer together than `epsilon`.
///
/// Fails with [TessellationError::InsufficientSites] if fewer than 3 distinct
/// sites remain after merging, and with [TessellationError::DegenerateSites]
/// if all distinct sites are collinear within `epsilon` (no triangle has an
/// area above `epsilon²`). Coordinates are validated up front, see
/// [validate_coordinate](crate::validate_coordinate).
///
/// Uses incremental Bowyer-Watson insertion over a far away enclosing
/// triangle. The in-circumcircle decision is exact, so the result is reliable
/// even for nearly cocircular sites. Expected O(n log n) for well distributed
/// sites, O(n²) worst case.
pub fn triangulate<S: Scalar + Float>(
    points: &PointSet<S>,
    epsilon: S,
) -> Result<Mesh<S>, TessellationError> {
    for &point in points.iter() {
        math::validate_point(point)?;
    }

    let merge = points.merge_sites(epsilon);
    let sites = &merge.sites;
    if sites.len() < 3 {
        return Err(TessellationError::InsufficientSites {
            actual: sites.len(),
        });
    }
    if all_collinear(sites, epsilon) {
        return Err(TessellationError::DegenerateSites { count: sites.len() });
    }

    let triangles = bowyer_watson(sites);
    debug!(
        "triangulated {} sites into {} triangles",
        sites.len(),
        triangles.len()
    );

    let triangles = link_neighbors(triangles);
    Ok(Mesh { merge, triangles })
}

/// Checks whether every site lies within `epsilon` of the line through the two
/// most distant sites of a baseline scan.
fn all_collinear<S: Scalar + Float>(sites: &[Point2<S>], epsilon: S) -> bool {
    let epsilon_2 = epsilon * epsilon;
    let first = sites[0];
    let farthest = sites
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| {
            let da = first.distance_2(**a);
            let db = first.distance_2(**b);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(index, _)| index);

    let Some(farthest) = farthest else {
        return true;
    };

    let baseline = sites[farthest];
    sites
        .iter()
        .all(|&site| math::triangle_area([first, baseline, site]) <= epsilon_2)
}

fn bowyer_watson<S: Scalar + Float>(sites: &[Point2<S>]) -> Vec<[usize; 3]> {
    let n = sites.len();

    let mut min = sites[0];
    let mut max = sites[0];
    for site in &sites[1..] {
        min = Point2::new(Float::min(min.x, site.x), Float::min(min.y, site.y));
        max = Point2::new(Float::max(max.x, site.x), Float::max(max.y, site.y));
    }

    let span = Float::max(Float::max(max.x - min.x, max.y - min.y), S::one());
    let two = S::one() + S::one();
    let mid = Point2::new((min.x + max.x) / two, (min.y + max.y) / two);

    // The enclosing triangle must be far enough away that its vertices never end
    // up inside the circumcircle of any final triangle.
    let margin: S = 20.0f32.into();
    let all_points: Vec<Point2<S>> = sites
        .iter()
        .copied()
        .chain([
            Point2::new(mid.x - margin * span, mid.y - span),
            Point2::new(mid.x + margin * span, mid.y - span),
            Point2::new(mid.x, mid.y + margin * span),
        ])
        .collect();

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for index in 0..n {
        let point = all_points[index];

        // The cavity: all triangles whose circumcircle contains the new site.
        let mut cavity: SmallVec<[usize; 16]> = SmallVec::new();
        for (triangle_index, triangle) in triangles.iter().enumerate() {
            let [a, b, c] = *triangle;
            if math::contained_in_circumference(
                all_points[a],
                all_points[b],
                all_points[c],
                point,
            ) {
                cavity.push(triangle_index);
            }
        }

        // A directed edge bounds the cavity iff its reversal is not part of any
        // cavity triangle. The cavity is star shaped around the new site, so the
        // directed boundary edges are already counter clockwise as seen from it.
        let mut cavity_edges: SmallVec<[(usize, usize); 32]> = SmallVec::new();
        for &triangle_index in &cavity {
            let [a, b, c] = triangles[triangle_index];
            cavity_edges.extend([(a, b), (b, c), (c, a)]);
        }

        let mut boundary: SmallVec<[(usize, usize); 32]> = SmallVec::new();
        for &(from, to) in &cavity_edges {
            if !cavity_edges.contains(&(to, from)) {
                boundary.push((from, to));
            }
        }

        for &triangle_index in cavity.iter().rev() {
            triangles.swap_remove(triangle_index);
        }

        for (from, to) in boundary {
            triangles.push([from, to, index]);
        }
    }

    // Strip everything attached to the enclosing triangle.
    triangles.retain(|triangle| triangle.iter().all(|&vertex| vertex < n));
    triangles
}

/// Rebuilds the neighbor links from an undirected edge map.
fn link_neighbors(triangles: Vec<[usize; 3]>) -> Vec<MeshTriangle> {
    let mut edge_map: HashMap<(usize, usize), SmallVec<[(usize, usize); 2]>> =
        HashMap::with_capacity(triangles.len() * 2);

    for (triangle_index, triangle) in triangles.iter().enumerate() {
        let [a, b, c] = *triangle;
        for (slot, (from, to)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
            let key = if from < to { (from, to) } else { (to, from) };
            edge_map.entry(key).or_default().push((triangle_index, slot));
        }
    }

    let mut linked: Vec<MeshTriangle> = triangles
        .into_iter()
        .map(|vertices| MeshTriangle {
            vertices,
            neighbors: [None; 3],
        })
        .collect();

    for entry in edge_map.values() {
        if let [(first, first_slot), (second, second_slot)] = entry.as_slice() {
            linked[*first].neighbors[*first_slot] = Some(*second);
            linked[*second].neighbors[*second_slot] = Some(*first);
        }
    }

    linked
}
