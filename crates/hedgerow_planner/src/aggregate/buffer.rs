//! Convex hull and disk buffer for point groups.
use std::f64::consts::TAU;

use geo::{Area, ConvexHull, MultiPoint, Point, Polygon};
use glam::DVec2;

/// Convex hull of `points`, grown by `distance`.
///
/// The result is the hull of every hull vertex offset by `4 * quadrant_segments`
/// points on a circle of radius `distance`: a Minkowski sum with an inscribed
/// regular polygon. Works for one or two points and for collinear input.
pub(crate) fn buffered_hull(points: &[DVec2], distance: f64, quadrant_segments: usize) -> Polygon<f64> {
    let hull = convex_hull(points);
    let steps = 4 * quadrant_segments.max(1);
    let circle: Vec<DVec2> = (0..steps)
        .map(|k| {
            let angle = TAU * k as f64 / steps as f64;
            DVec2::new(angle.cos(), angle.sin()) * distance
        })
        .collect();

    let expanded: MultiPoint<f64> = hull
        .exterior()
        .coords()
        .flat_map(|c| {
            let vertex = DVec2::new(c.x, c.y);
            circle.iter().map(move |offset| {
                let p = vertex + *offset;
                Point::new(p.x, p.y)
            })
        })
        .collect();
    expanded.convex_hull()
}

pub(crate) fn convex_hull(points: &[DVec2]) -> Polygon<f64> {
    let multi: MultiPoint<f64> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
    multi.convex_hull()
}

/// Fewer than three distinct points, or all of them on one line.
pub(crate) fn is_degenerate(points: &[DVec2]) -> bool {
    let mut distinct: Vec<DVec2> = Vec::with_capacity(3);
    for p in points {
        if distinct.iter().all(|q| !q.abs_diff_eq(*p, 1e-9)) {
            distinct.push(*p);
            if distinct.len() >= 3 {
                break;
            }
        }
    }
    if distinct.len() < 3 {
        return true;
    }
    convex_hull(points).unsigned_area() <= f64::EPSILON
}
