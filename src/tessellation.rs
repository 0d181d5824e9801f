use log::trace;
use num_traits::Float;

use crate::{
    build_dual, triangulate, triangulate_polygon, BoundingRect, CellPolygons, Mesh, Point2,
    PointSet, Polygon, Scalar, SiteMerge, TessellationError, TriangleFan, VoronoiDiagram,
};

/// Configuration for the tessellation pipeline.
///
/// `epsilon` is the coincidence and collinearity tolerance used by every
/// stage; `bounds` is the clip rectangle unbounded Voronoi cells are closed
/// against. The defaults match the 10×10 canvas this crate's typical inputs
/// live on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationOptions<S> {
    /// Distance below which two sites (or two circumcenters) are considered
    /// coincident, and area tolerance `epsilon²` for collinearity.
    pub epsilon: S,
    /// The default clip rectangle for cell polygon queries.
    pub bounds: BoundingRect<S>,
}

impl<S: Scalar + Float> TessellationOptions<S> {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coincidence tolerance.
    pub fn with_epsilon(mut self, epsilon: S) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the default clip rectangle.
    pub fn with_bounds(mut self, bounds: BoundingRect<S>) -> Self {
        self.bounds = bounds;
        self
    }
}

impl<S: Scalar + Float> Default for TessellationOptions<S> {
    fn default() -> Self {
        Self {
            epsilon: 1.0e-6f32.into(),
            bounds: BoundingRect::default(),
        }
    }
}

/// The per-site triangle fans of all clipped Voronoi cells.
///
/// Mirrors [CellPolygons]: cells dropped during clipping stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTriangulations<S> {
    merge: SiteMerge<S>,
    fans: Vec<Option<TriangleFan<S>>>,
}

impl<S: Scalar + Float> CellTriangulations<S> {
    /// Returns the fans indexed by distinct site.
    pub fn fans(&self) -> &[Option<TriangleFan<S>>] {
        &self.fans
    }

    /// Returns the fan of the given distinct site, if its cell survived
    /// clipping.
    pub fn get(&self, site: usize) -> Option<&TriangleFan<S>> {
        self.fans.get(site).and_then(|fan| fan.as_ref())
    }

    /// Resolves an original point index through the site merge.
    pub fn fan_for_input(&self, original_index: usize) -> Option<&TriangleFan<S>> {
        let site = *self.merge.merged_of.get(original_index)?;
        self.get(site)
    }

    /// Iterates over all surviving `(site, fan)` pairs in site order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TriangleFan<S>)> {
        self.fans
            .iter()
            .enumerate()
            .filter_map(|(site, fan)| fan.as_ref().map(|fan| (site, fan)))
    }
}

/// The tessellation pipeline over an owned point set.
///
/// Holds the input sites and the configured tolerance; every query recomputes
/// the required pipeline prefix from scratch and leaves the point set
/// untouched. There is no cached derived state - results are owned by the
/// caller and valid for the point set at the time of the query.
///
/// # Example
/// ```
/// use thiessen::{Tessellation, TessellationError};
///
/// fn main() -> Result<(), TessellationError> {
///     let mut tessellation = Tessellation::<f64>::new();
///     tessellation.add_point(1.0, 1.0);
///     tessellation.add_point(5.0, 5.0);
///     tessellation.add_point(9.0, 1.0);
///
///     let mesh = tessellation.delaunay()?;
///     assert_eq!(mesh.num_triangles(), 1);
///
///     let bounds = tessellation.options().bounds;
///     let cells = tessellation.cell_polygons(&bounds)?;
///     assert_eq!(cells.iter().count(), 3);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tessellation<S> {
    points: PointSet<S>,
    options: TessellationOptions<S>,
}

impl<S: Scalar + Float> Default for Tessellation<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar + Float> Tessellation<S> {
    /// Creates an empty tessellation with default options.
    pub fn new() -> Self {
        Self::with_options(TessellationOptions::default())
    }

    /// Creates an empty tessellation with the given options.
    pub fn with_options(options: TessellationOptions<S>) -> Self {
        Self {
            points: PointSet::new(),
            options,
        }
    }

    /// Returns the configured options.
    pub fn options(&self) -> &TessellationOptions<S> {
        &self.options
    }

    /// Returns the input sites.
    pub fn points(&self) -> &PointSet<S> {
        &self.points
    }

    /// Appends a site and returns the new number of sites.
    ///
    /// No geometry is recomputed until a query is issued.
    pub fn add_point(&mut self, x: S, y: S) -> usize {
        self.points.add(x, y)
    }

    /// Appends a site given as a point.
    pub fn push(&mut self, point: Point2<S>) {
        self.points.push(point);
    }

    /// Clears the point set, invalidating all previously derived results.
    pub fn reset(&mut self) {
        self.points.reset();
    }

    /// Computes the Delaunay triangulation of the current point set.
    pub fn delaunay(&self) -> Result<Mesh<S>, TessellationError> {
        triangulate(&self.points, self.options.epsilon)
    }

    /// Computes the Voronoi diagram of the current point set.
    pub fn voronoi_diagram(&self) -> Result<VoronoiDiagram<S>, TessellationError> {
        let mesh = self.delaunay()?;
        build_dual(&mesh, self.options.epsilon)
    }

    /// Computes the Voronoi cell polygons, clipped to `bounds`.
    pub fn cell_polygons(
        &self,
        bounds: &BoundingRect<S>,
    ) -> Result<CellPolygons<S>, TessellationError> {
        let diagram = self.voronoi_diagram()?;
        Ok(crate::clip::cell_polygons(&diagram, bounds, self.options.epsilon))
    }

    /// Computes a triangle fan for every clipped Voronoi cell polygon.
    pub fn cell_triangulations(
        &self,
        bounds: &BoundingRect<S>,
    ) -> Result<CellTriangulations<S>, TessellationError> {
        let polygons = self.cell_polygons(bounds)?;
        trace!("triangulating {} cell polygons", polygons.iter().count());

        let (merge, polygons) = polygons.into_parts();
        let fans = polygons
            .into_iter()
            .map(|polygon| {
                polygon
                    .as_ref()
                    .map(|polygon: &Polygon<S>| triangulate_polygon(polygon, self.options.epsilon))
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CellTriangulations { merge, fans })
    }
}

#[cfg(test)]
mod test {
    use super::{Tessellation, TessellationOptions};
    use crate::{BoundingRect, Point2, TessellationError};
    use approx::assert_relative_eq;

    fn three_sites() -> Tessellation<f64> {
        let mut tessellation = Tessellation::new();
        tessellation.add_point(1.0, 1.0);
        tessellation.add_point(5.0, 5.0);
        tessellation.add_point(9.0, 1.0);
        tessellation
    }

    #[test]
    fn test_add_and_reset() {
        let mut tessellation = Tessellation::<f64>::new();
        assert_eq!(tessellation.add_point(1.0, 2.0), 1);
        assert_eq!(tessellation.add_point(3.0, 4.0), 2);
        assert_eq!(tessellation.points().len(), 2);

        tessellation.reset();
        assert!(tessellation.points().is_empty());
        assert_eq!(
            tessellation.delaunay().err(),
            Some(TessellationError::InsufficientSites { actual: 0 })
        );
    }

    #[test]
    fn test_errors_propagate_through_all_queries() {
        let mut tessellation = Tessellation::<f64>::new();
        tessellation.add_point(1.0, 1.0);
        tessellation.add_point(5.0, 5.0);

        let bounds = tessellation.options().bounds;
        let expected = TessellationError::InsufficientSites { actual: 2 };
        assert_eq!(tessellation.delaunay().err(), Some(expected));
        assert_eq!(tessellation.voronoi_diagram().err(), Some(expected));
        assert_eq!(tessellation.cell_polygons(&bounds).err(), Some(expected));
        assert_eq!(
            tessellation.cell_triangulations(&bounds).err(),
            Some(expected)
        );
    }

    #[test]
    fn test_queries_leave_points_untouched() {
        let tessellation = three_sites();
        let before = tessellation.points().clone();

        let bounds = tessellation.options().bounds;
        tessellation.delaunay().unwrap();
        tessellation.voronoi_diagram().unwrap();
        tessellation.cell_polygons(&bounds).unwrap();
        tessellation.cell_triangulations(&bounds).unwrap();

        assert_eq!(tessellation.points(), &before);
    }

    #[test]
    fn test_idempotence() {
        let tessellation = three_sites();
        let bounds = tessellation.options().bounds;

        assert_eq!(
            tessellation.delaunay().unwrap(),
            tessellation.delaunay().unwrap()
        );
        assert_eq!(
            tessellation.voronoi_diagram().unwrap(),
            tessellation.voronoi_diagram().unwrap()
        );
        assert_eq!(
            tessellation.cell_polygons(&bounds).unwrap(),
            tessellation.cell_polygons(&bounds).unwrap()
        );
        assert_eq!(
            tessellation.cell_triangulations(&bounds).unwrap(),
            tessellation.cell_triangulations(&bounds).unwrap()
        );
    }

    #[test]
    fn test_full_pipeline_three_sites() {
        let tessellation = three_sites();
        let bounds = tessellation.options().bounds;

        let mesh = tessellation.delaunay().unwrap();
        assert_eq!(mesh.num_triangles(), 1);

        let diagram = tessellation.voronoi_diagram().unwrap();
        assert!(diagram.cells().iter().all(|cell| cell.is_unbounded()));

        let fans = tessellation.cell_triangulations(&bounds).unwrap();
        let total: f64 = fans.iter().map(|(_, fan)| fan.area()).sum();
        assert_relative_eq!(total, 100.0, epsilon = 1.0e-6);
    }

    #[test]
    fn test_custom_options() {
        let options = TessellationOptions::default()
            .with_epsilon(1.0e-4)
            .with_bounds(BoundingRect::new(
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
            ));
        let mut tessellation = Tessellation::with_options(options);

        // Near-duplicates merge below the configured tolerance
        tessellation.add_point(2.0, 2.0);
        tessellation.add_point(2.0, 2.0000001);
        tessellation.add_point(7.0, 3.0);
        assert_eq!(
            tessellation.delaunay().err(),
            Some(TessellationError::InsufficientSites { actual: 2 })
        );

        tessellation.add_point(4.0, 8.0);
        let mesh = tessellation.delaunay().unwrap();
        assert_eq!(mesh.sites().len(), 3);

        // The custom bounds are available for the polygon queries
        let bounds = tessellation.options().bounds;
        let cells = tessellation.cell_polygons(&bounds).unwrap();
        let total: f64 = cells.iter().map(|(_, polygon)| polygon.area()).sum();
        assert_relative_eq!(total, bounds.area(), epsilon = 1.0e-6);
    }

    #[test]
    fn test_fan_for_input_resolves_merged_sites() {
        let options = TessellationOptions::default().with_epsilon(1.0e-4);
        let mut tessellation = Tessellation::with_options(options);
        tessellation.add_point(2.0, 2.0);
        tessellation.add_point(2.0, 2.0000001);
        tessellation.add_point(7.0, 3.0);
        tessellation.add_point(4.0, 8.0);

        let bounds = tessellation.options().bounds;
        let fans = tessellation.cell_triangulations(&bounds).unwrap();
        assert_eq!(fans.fan_for_input(0), fans.fan_for_input(1));
        assert!(fans.fan_for_input(0).is_some());
    }
}
