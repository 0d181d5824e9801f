use log::debug;
use num_traits::Float;

use crate::{
    BoundingRect, Point2, Polygon, Scalar, SiteMerge, VoronoiDiagram, VoronoiEdge,
};

/// The clipped cell polygons of a Voronoi diagram, one per distinct site.
///
/// Cells whose clipped polygon collapses to (near) zero area are stored as
/// `None` - this happens for sites whose cell lies entirely outside the
/// clipping rectangle and is a local recovery, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygons<S> {
    merge: SiteMerge<S>,
    polygons: Vec<Option<Polygon<S>>>,
}

impl<S: Scalar + Float> CellPolygons<S> {
    /// Returns the polygons indexed by distinct site.
    pub fn polygons(&self) -> &[Option<Polygon<S>>] {
        &self.polygons
    }

    /// Returns the polygon of the given distinct site, if it survived
    /// clipping.
    pub fn get(&self, site: usize) -> Option<&Polygon<S>> {
        self.polygons.get(site).and_then(|polygon| polygon.as_ref())
    }

    /// Resolves an original point index through the site merge and returns the
    /// polygon of the site it was merged into.
    pub fn polygon_for_input(&self, original_index: usize) -> Option<&Polygon<S>> {
        let site = *self.merge.merged_of.get(original_index)?;
        self.get(site)
    }

    /// Iterates over all surviving `(site, polygon)` pairs in site order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Polygon<S>)> {
        self.polygons
            .iter()
            .enumerate()
            .filter_map(|(site, polygon)| polygon.as_ref().map(|polygon| (site, polygon)))
    }

    /// Returns the site merge record inherited from the diagram.
    pub fn site_merge(&self) -> &SiteMerge<S> {
        &self.merge
    }

    pub(crate) fn into_parts(self) -> (SiteMerge<S>, Vec<Option<Polygon<S>>>) {
        (self.merge, self.polygons)
    }
}

/// Clips every Voronoi cell to `rect`, producing one simple closed polygon per
/// surviving site.
///
/// Bounded cells are clipped directly. For unbounded cells the two rays are
/// extended to points far outside the rectangle, together with a third far
/// point along the outward bisector of the ray directions so that the far
/// chord cannot cut into the rectangle; the half-plane clipping then produces
/// the rectangle border segments between the ray exit points.
pub fn cell_polygons<S: Scalar + Float>(
    diagram: &VoronoiDiagram<S>,
    rect: &BoundingRect<S>,
    epsilon: S,
) -> CellPolygons<S> {
    let mut polygons = Vec::with_capacity(diagram.cells().len());
    let mut dropped = 0usize;

    for cell in diagram.cells() {
        let polygon = clip_cell(diagram, cell.site(), cell.edges(), rect, epsilon);
        if polygon.is_none() {
            dropped += 1;
        }
        polygons.push(polygon);
    }

    if dropped > 0 {
        debug!("dropped {} degenerate cells during clipping", dropped);
    }

    CellPolygons {
        merge: diagram.site_merge().clone(),
        polygons,
    }
}

fn clip_cell<S: Scalar + Float>(
    diagram: &VoronoiDiagram<S>,
    site: usize,
    edge_indices: &[usize],
    rect: &BoundingRect<S>,
    epsilon: S,
) -> Option<Polygon<S>> {
    let site_position = diagram.sites()[site];
    let epsilon_2 = epsilon * epsilon;

    let mut boundary: Vec<Point2<S>> = Vec::new();
    let push_unique = |boundary: &mut Vec<Point2<S>>, candidate: Point2<S>| {
        if !boundary
            .iter()
            .any(|existing| existing.distance_2(candidate) <= epsilon_2)
        {
            boundary.push(candidate);
        }
    };

    let mut rays: Vec<(Point2<S>, Point2<S>)> = Vec::new();
    for &edge_index in edge_indices {
        match diagram.edges()[edge_index] {
            VoronoiEdge::Segment { from, to, .. } => {
                push_unique(&mut boundary, diagram.vertices()[from]);
                push_unique(&mut boundary, diagram.vertices()[to]);
            }
            VoronoiEdge::Ray {
                origin, direction, ..
            } => {
                let origin = diagram.vertices()[origin];
                push_unique(&mut boundary, origin);
                rays.push((origin, direction));
            }
        }
    }

    if !rays.is_empty() {
        // Far enough that every far point and the chords between them stay
        // outside the clip rectangle.
        let reach = boundary
            .iter()
            .map(|vertex| vertex.sub(site_position).length2())
            .fold(S::zero(), Float::max)
            .sqrt();
        let four: S = 4.0f32.into();
        let center_distance = site_position.sub(rect.center()).length2().sqrt();
        let radius = four * (rect.diameter() + reach + center_distance + S::one());

        for &(origin, direction) in &rays {
            boundary.push(origin.add(direction.mul(radius)));
        }

        if let [(first_origin, first_direction), (_, second_direction)] = rays.as_slice() {
            let bisector = outward_bisector(
                *first_direction,
                *second_direction,
                site_position,
                *first_origin,
            );
            boundary.push(site_position.add(bisector.mul(radius)));
        }
    }

    // The cell is convex and contains its site, so sorting by angle around the
    // site recovers the boundary cycle.
    boundary.sort_by(|a, b| {
        let delta_a = a.sub(site_position);
        let delta_b = b.sub(site_position);
        let angle_a = delta_a.y.atan2(delta_a.x);
        let angle_b = delta_b.y.atan2(delta_b.x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let clipped = clip_to_rect(&boundary, rect);
    let polygon = Polygon::new(clipped).dedup(epsilon).into_ccw();
    if polygon.len() < 3 || polygon.area() <= epsilon {
        return None;
    }
    Some(polygon)
}

/// The direction bisecting the recession cone spanned by two ray directions.
///
/// Falls back to the normal of the first direction for (nearly) antiparallel
/// rays, oriented away from the cell's bounded part.
fn outward_bisector<S: Scalar + Float>(
    first: Point2<S>,
    second: Point2<S>,
    site: Point2<S>,
    ray_origin: Point2<S>,
) -> Point2<S> {
    let sum = first.add(second);
    let length_2 = sum.length2();
    let threshold: S = 1.0e-6f32.into();
    if length_2 > threshold {
        return sum.mul(S::one() / length_2.sqrt());
    }

    // Antiparallel rays: the cell is a half plane. Its interior contains the
    // site, and the unbounded side is the one the site lies on relative to the
    // ray line.
    let normal = Point2::new(-first.y, first.x);
    if normal.dot(site.sub(ray_origin)) >= S::zero() {
        normal
    } else {
        normal.mul(-S::one())
    }
}

/// Sutherland-Hodgman clipping of a closed vertex cycle against the four half
/// planes of an axis aligned rectangle.
pub(crate) fn clip_to_rect<S: Scalar + Float>(
    subject: &[Point2<S>],
    rect: &BoundingRect<S>,
) -> Vec<Point2<S>> {
    let corners = rect.corners();
    let mut output = subject.to_vec();

    for i in 0..4 {
        if output.is_empty() {
            break;
        }
        let clip_from = corners[i];
        let clip_to = corners[(i + 1) % 4];

        let input = std::mem::take(&mut output);
        let mut previous = *input.last().unwrap();

        for &current in &input {
            if is_inside(current, clip_from, clip_to) {
                if !is_inside(previous, clip_from, clip_to) {
                    if let Some(intersection) =
                        line_intersection(previous, current, clip_from, clip_to)
                    {
                        output.push(intersection);
                    }
                }
                output.push(current);
            } else if is_inside(previous, clip_from, clip_to) {
                if let Some(intersection) =
                    line_intersection(previous, current, clip_from, clip_to)
                {
                    output.push(intersection);
                }
            }
            previous = current;
        }
    }

    output
}

/// The clip rectangle is counter clockwise, so inside is the left side.
fn is_inside<S: Scalar + Float>(point: Point2<S>, from: Point2<S>, to: Point2<S>) -> bool {
    let edge = to.sub(from);
    let offset = point.sub(from);
    edge.x * offset.y - edge.y * offset.x >= S::zero()
}

fn line_intersection<S: Scalar + Float>(
    from: Point2<S>,
    to: Point2<S>,
    clip_from: Point2<S>,
    clip_to: Point2<S>,
) -> Option<Point2<S>> {
    let segment = to.sub(from);
    let clip_edge = clip_to.sub(clip_from);
    let denominator = segment.x * clip_edge.y - segment.y * clip_edge.x;
    if denominator == S::zero() {
        return None;
    }
    let offset = clip_from.sub(from);
    let t = (offset.x * clip_edge.y - offset.y * clip_edge.x) / denominator;
    Some(from.add(segment.mul(t)))
}
