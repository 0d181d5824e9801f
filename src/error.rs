use thiserror::Error;

use crate::CoordinateError;

/// The error type shared by all tessellation stages.
///
/// Each stage fails fast and surfaces its error to the caller - no stage ever
/// substitutes default geometry for a failed computation. Per-cell degeneracies
/// during cell polygonization are the one exception: a cell whose clipped
/// polygon collapses to zero area is omitted from the output instead of failing
/// the whole diagram.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TessellationError {
    /// Fewer than 3 distinct sites are available.
    ///
    /// Sites closer together than the configured epsilon are merged before
    /// triangulation, so this can also occur for point sets with 3 or more
    /// entries that collapse onto fewer distinct positions.
    #[error("triangulation requires at least 3 distinct sites, got {actual}")]
    InsufficientSites {
        /// The number of distinct sites after merging near-duplicates.
        actual: usize,
    },

    /// All sites lie on a common line within the configured epsilon.
    #[error("all {count} sites are collinear, no triangle can be formed")]
    DegenerateSites {
        /// The number of distinct sites after merging near-duplicates.
        count: usize,
    },

    /// The mesh passed to the Voronoi builder contains no triangles.
    ///
    /// This is unreachable through [Tessellation](crate::Tessellation) since
    /// the triangulation stage already rejects inputs that would produce an
    /// empty mesh. It is kept as a defensive invariant check.
    #[error("mesh contains no triangles")]
    EmptyMesh,

    /// The polygon handed to the triangulator intersects itself.
    ///
    /// Clipped Voronoi cells are always simple, so hitting this indicates a
    /// violated precondition in the caller.
    #[error("polygon boundary intersects itself")]
    NonSimplePolygon,

    /// Fewer than 3 distinct vertices remain after removing duplicate and
    /// collinear-redundant polygon vertices.
    #[error("polygon has fewer than 3 distinct vertices")]
    DegeneratePolygon,

    /// An input coordinate was NaN or outside the representable range.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
}
