use log::debug;
use num_traits::Float;
use smallvec::SmallVec;

use crate::{Mesh, Point2, Scalar, SiteMerge, TessellationError};

/// An edge of the Voronoi diagram.
///
/// Every edge is dual to one Delaunay mesh edge and lies on the perpendicular
/// bisector of the two sites it separates. Edges dual to an interior mesh edge
/// connect two Voronoi vertices; edges dual to a convex hull edge extend to
/// infinity as a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoronoiEdge<S> {
    /// A bounded edge between two Voronoi vertices.
    Segment {
        /// Index of the first Voronoi vertex.
        from: usize,
        /// Index of the second Voronoi vertex.
        to: usize,
        /// The two sites separated by this edge.
        sites: [usize; 2],
    },
    /// An unbounded edge, starting at a Voronoi vertex and extending along the
    /// outward normal of its dual convex hull edge.
    Ray {
        /// Index of the Voronoi vertex the ray starts at.
        origin: usize,
        /// Unit direction of the ray, pointing away from the triangulation.
        direction: Point2<S>,
        /// The two sites separated by this edge.
        sites: [usize; 2],
    },
}

impl<S> VoronoiEdge<S> {
    /// The two sites whose perpendicular bisector this edge lies on.
    pub fn sites(&self) -> [usize; 2] {
        match self {
            VoronoiEdge::Segment { sites, .. } | VoronoiEdge::Ray { sites, .. } => *sites,
        }
    }

    /// Returns `true` for unbounded edges.
    pub fn is_ray(&self) -> bool {
        matches!(self, VoronoiEdge::Ray { .. })
    }
}

/// The Voronoi cell of a single site.
///
/// The cell's edges are stored as indices into the diagram's edge list,
/// ordered counter clockwise by the angle of the neighboring site around the
/// cell's own site. This yields a consistent cyclic boundary sequence that the
/// polygonization stage walks directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoronoiCell {
    site: usize,
    edges: Vec<usize>,
    unbounded: bool,
}

impl VoronoiCell {
    /// The site this cell belongs to.
    pub fn site(&self) -> usize {
        self.site
    }

    /// The cell's edge indices in counter clockwise order.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Returns `true` if any of the cell's edges is a ray.
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }
}

/// The dual graph of a Delaunay [Mesh].
///
/// Vertices are triangle circumcenters (coinciding circumcenters are merged
/// into a single shared vertex), edges are dual to mesh edges and cells group
/// the edges of each site into an ordered boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiDiagram<S> {
    merge: SiteMerge<S>,
    vertices: Vec<Point2<S>>,
    edges: Vec<VoronoiEdge<S>>,
    cells: Vec<VoronoiCell>,
}

impl<S: Scalar + Float> VoronoiDiagram<S> {
    /// Returns the distinct sites of the underlying mesh.
    pub fn sites(&self) -> &[Point2<S>] {
        &self.merge.sites
    }

    /// Returns the Voronoi vertices (deduplicated circumcenters).
    pub fn vertices(&self) -> &[Point2<S>] {
        &self.vertices
    }

    /// Returns all edges of the diagram.
    pub fn edges(&self) -> &[VoronoiEdge<S>] {
        &self.edges
    }

    /// Returns one cell per distinct site, indexed by site.
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    /// Returns the site merge record inherited from the mesh.
    pub fn site_merge(&self) -> &SiteMerge<S> {
        &self.merge
    }
}

/// Derives the Voronoi diagram from a Delaunay mesh.
///
/// Circumcenters closer together than `epsilon` are merged into a single
/// Voronoi vertex; dual edges whose endpoints merge are dropped as degenerate.
/// Fails with [TessellationError::EmptyMesh] if the mesh contains no
/// triangles, which cannot happen for meshes produced by
/// [triangulate](crate::triangulate).
pub fn build_dual<S: Scalar + Float>(
    mesh: &Mesh<S>,
    epsilon: S,
) -> Result<VoronoiDiagram<S>, TessellationError> {
    if mesh.num_triangles() == 0 {
        return Err(TessellationError::EmptyMesh);
    }

    let epsilon_2 = epsilon * epsilon;
    let mut vertices: Vec<Point2<S>> = Vec::with_capacity(mesh.num_triangles());
    let mut vertex_of: Vec<usize> = Vec::with_capacity(mesh.num_triangles());

    for triangle in 0..mesh.num_triangles() {
        let circumcenter = mesh.circumcenter(triangle);
        let existing = vertices
            .iter()
            .position(|vertex| vertex.distance_2(circumcenter) <= epsilon_2);
        match existing {
            Some(vertex) => vertex_of.push(vertex),
            None => {
                vertex_of.push(vertices.len());
                vertices.push(circumcenter);
            }
        }
    }

    let sites = mesh.sites();
    let mut edges: Vec<VoronoiEdge<S>> = Vec::new();

    for (triangle_index, triangle) in mesh.triangles().iter().enumerate() {
        for (slot, (from, to)) in triangle.edges().into_iter().enumerate() {
            match triangle.neighbors()[slot] {
                Some(neighbor) => {
                    // Emit interior edges once, from the lower triangle index.
                    if triangle_index > neighbor {
                        continue;
                    }
                    let v0 = vertex_of[triangle_index];
                    let v1 = vertex_of[neighbor];
                    if v0 == v1 {
                        // Cocircular site groups collapse the dual edge.
                        continue;
                    }
                    edges.push(VoronoiEdge::Segment {
                        from: v0,
                        to: v1,
                        sites: [from, to],
                    });
                }
                None => {
                    // Convex hull edge. The triangle is counter clockwise, so the
                    // interior lies left of `from -> to` and the outward normal is
                    // the right normal.
                    let delta = sites[to].sub(sites[from]);
                    let length = delta.length2().sqrt();
                    let direction = Point2::new(delta.y / length, -delta.x / length);
                    edges.push(VoronoiEdge::Ray {
                        origin: vertex_of[triangle_index],
                        direction,
                        sites: [from, to],
                    });
                }
            }
        }
    }

    let mut cell_edges: Vec<SmallVec<[usize; 8]>> = vec![SmallVec::new(); sites.len()];
    for (edge_index, edge) in edges.iter().enumerate() {
        for site in edge.sites() {
            cell_edges[site].push(edge_index);
        }
    }

    let cells: Vec<VoronoiCell> = cell_edges
        .into_iter()
        .enumerate()
        .map(|(site, mut edge_indices)| {
            let center = sites[site];
            edge_indices.sort_by(|&a, &b| {
                let angle_a = neighbor_angle(&edges[a], site, sites, center);
                let angle_b = neighbor_angle(&edges[b], site, sites, center);
                angle_a
                    .partial_cmp(&angle_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let unbounded = edge_indices.iter().any(|&edge| edges[edge].is_ray());
            VoronoiCell {
                site,
                edges: edge_indices.into_vec(),
                unbounded,
            }
        })
        .collect();

    debug!(
        "dual diagram: {} vertices, {} edges, {} cells",
        vertices.len(),
        edges.len(),
        cells.len()
    );

    Ok(VoronoiDiagram {
        merge: mesh.site_merge().clone(),
        vertices,
        edges,
        cells,
    })
}

/// The angle of the site on the far side of `edge`, as seen from `center`.
fn neighbor_angle<S: Scalar + Float>(
    edge: &VoronoiEdge<S>,
    site: usize,
    sites: &[Point2<S>],
    center: Point2<S>,
) -> S {
    let [a, b] = edge.sites();
    let other = if a == site { b } else { a };
    let delta = sites[other].sub(center);
    delta.y.atan2(delta.x)
}
