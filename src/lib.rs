//! # Thiessen
//!
//! Thiessen computes [Delaunay triangulations](https://en.wikipedia.org/wiki/Delaunay_triangulation),
//! their dual [Voronoi diagrams](https://en.wikipedia.org/wiki/Voronoi_diagram) and the
//! diagrams' cells as closed polygons clipped to a bounding rectangle, together
//! with a triangular decomposition of every cell polygon.
//!
//! The crate targets small planar point sets (tens to low hundreds of sites), e.g.
//! sites entered interactively on a canvas. All orientation and in-circumcircle
//! decisions are made with exact predicates, so the results are reliable even for
//! nearly collinear or nearly cocircular inputs; coincidence handling uses a
//! configurable tolerance.
//!
//! # Usage
//!
//! The usual entry point is [Tessellation], which owns the input sites and runs
//! the pipeline on demand:
//!
//! ```
//! use thiessen::{Tessellation, TessellationError};
//!
//! fn main() -> Result<(), TessellationError> {
//!     let mut tessellation = Tessellation::<f64>::new();
//!     tessellation.add_point(1.0, 1.0);
//!     tessellation.add_point(5.0, 5.0);
//!     tessellation.add_point(9.0, 1.0);
//!
//!     // The Delaunay triangulation of the sites...
//!     let mesh = tessellation.delaunay()?;
//!     assert_eq!(mesh.num_triangles(), 1);
//!
//!     // ...its dual Voronoi diagram...
//!     let diagram = tessellation.voronoi_diagram()?;
//!     assert_eq!(diagram.cells().len(), 3);
//!
//!     // ...and the cells as polygons, clipped to the 10×10 default bounds.
//!     let bounds = tessellation.options().bounds;
//!     let cells = tessellation.cell_polygons(&bounds)?;
//!     let covered: f64 = cells.iter().map(|(_, polygon)| polygon.area()).sum();
//!     assert!((covered - 100.0).abs() < 1.0e-6);
//!     Ok(())
//! }
//! ```
//!
//! The individual stages are also available as free functions for callers that
//! want to reuse intermediate results: [triangulate], [build_dual],
//! [cell_polygons] and [triangulate_polygon].
//!
//! # Pipeline
//!
//! Every query recomputes its pipeline prefix from scratch:
//!
//! 1. Sites within the configured tolerance of each other are merged
//!    ([PointSet::merge_sites]); the merge record maps results back to the
//!    original indices.
//! 2. [triangulate] builds the Delaunay [Mesh] by incremental Bowyer-Watson
//!    insertion.
//! 3. [build_dual] derives the [VoronoiDiagram]: triangle circumcenters become
//!    vertices, mesh edge adjacency becomes bounded edges, convex hull edges
//!    become outward rays.
//! 4. [cell_polygons] clips every cell to a [BoundingRect], closing unbounded
//!    cells along the rectangle border.
//! 5. [triangulate_polygon] decomposes each cell polygon into a [TriangleFan]
//!    by ear clipping.
//!
//! # Determinism
//!
//! All stages are pure functions of their input. Calling any query twice
//! without modifying the point set yields bit-identical results.
//!
//! # Features
//!
//! * `serde`: Enables serialization of [Point2], [Polygon] and [BoundingRect].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clip;
mod delaunay;
mod earcut;
mod error;
mod math;
mod point;
mod point_set;
mod polygon;
mod tessellation;
mod voronoi;

#[cfg(test)]
mod test_utilities;

pub use crate::clip::{cell_polygons, CellPolygons};
pub use crate::delaunay::{triangulate, Mesh, MeshTriangle};
pub use crate::earcut::{triangulate_polygon, TriangleFan};
pub use crate::error::TessellationError;
pub use crate::math::{
    circumcenter, contained_in_circumference, mitigate_underflow, side_query, triangle_area,
    validate_coordinate, validate_point, CoordinateError, LineSideInfo, MAX_ALLOWED_VALUE,
    MIN_ALLOWED_VALUE,
};
pub use crate::point::{Point2, Scalar};
pub use crate::point_set::{PointSet, SiteMerge};
pub use crate::polygon::{BoundingRect, Polygon};
pub use crate::tessellation::{CellTriangulations, Tessellation, TessellationOptions};
pub use crate::voronoi::{build_dual, VoronoiCell, VoronoiDiagram, VoronoiEdge};
