//! Outline geometry for boxes drawn on the sphere.
//!
//! A straight line between two corners would cut a chord through the sphere's
//! interior, so each edge is subdivided and every step is projected back onto
//! the surface. The result is meant to be drawn as a closed line loop.

use crate::bounds::GeoBounds;
use crate::coords::{GeoCoordinate, Vec3, to_sphere_position};

/// Default number of subdivisions per box edge.
pub const DEFAULT_SEGMENTS_PER_EDGE: usize = 20;

/// Number of points [`generate_box_outline`] emits for `segments_per_edge`.
///
/// Each edge contributes `segments` points; shared corners are emitted once.
pub fn outline_point_count(segments_per_edge: usize) -> usize {
    4 * segments_per_edge.max(1)
}

/// Trace the four edges of `bounds` on a sphere of `radius`.
///
/// Points run clockwise as seen on the texture, starting at the top-left
/// corner: top edge (max altitude) left to right, right edge downward,
/// bottom edge right to left, then the left edge upward. The closing segment
/// back to the first point is implied, so the first and last points are
/// neighbours on the left edge.
pub fn generate_box_outline(
    bounds: &GeoBounds,
    segments_per_edge: usize,
    radius: f64,
) -> Vec<[f32; 3]> {
    let mut points = Vec::with_capacity(outline_point_count(segments_per_edge));
    generate_box_outline_into(&mut points, bounds, segments_per_edge, radius);
    points
}

/// Same as [`generate_box_outline`], refilling a caller-owned buffer.
///
/// Meant for the per-pointer-move path during draw and resize, where the
/// buffer is reused across frames.
pub fn generate_box_outline_into(
    out: &mut Vec<[f32; 3]>,
    bounds: &GeoBounds,
    segments_per_edge: usize,
    radius: f64,
) {
    let segments = segments_per_edge.max(1);
    out.clear();
    out.reserve(outline_point_count(segments));

    let GeoBounds { min, max } = *bounds;
    let width = max.azimuth - min.azimuth;
    let height = max.altitude - min.altitude;
    let step = |i: usize| i as f64 / segments as f64;
    let mut push = |azimuth: f64, altitude: f64| {
        let p = to_sphere_position(GeoCoordinate::new(azimuth, altitude), radius);
        out.push(p.to_f32_array());
    };

    // Top edge, both corners included
    for i in 0..=segments {
        push(min.azimuth + width * step(i), max.altitude);
    }

    // Right edge, down to the bottom-right corner
    for i in 1..=segments {
        push(max.azimuth, max.altitude - height * step(i));
    }

    // Bottom edge, back to the bottom-left corner
    for i in 1..=segments {
        push(max.azimuth - width * step(i), min.altitude);
    }

    // Left edge, stopping short of the top-left corner
    for i in 1..segments {
        push(min.azimuth, min.altitude + height * step(i));
    }
}

/// Scene positions of the four corners, in handle order:
/// top-left, top-right, bottom-left, bottom-right.
pub fn corner_positions(bounds: &GeoBounds, radius: f64) -> [Vec3; 4] {
    [
        to_sphere_position(bounds.top_left(), radius),
        to_sphere_position(bounds.top_right(), radius),
        to_sphere_position(bounds.bottom_left(), radius),
        to_sphere_position(bounds.bottom_right(), radius),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{SPHERE_RADIUS, sphere_position_to_geo};

    fn to_vec3(p: [f32; 3]) -> Vec3 {
        Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    fn distance(a: [f32; 3], b: [f32; 3]) -> f64 {
        let (a, b) = (to_vec3(a), to_vec3(b));
        Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z).length()
    }

    fn sample_bounds() -> GeoBounds {
        GeoBounds::from_edges(30.0, 10.0, 45.0, 20.0)
    }

    #[test]
    fn test_point_count() {
        for segments in [1, 2, 5, 20] {
            let points = generate_box_outline(&sample_bounds(), segments, SPHERE_RADIUS);
            assert_eq!(points.len(), 4 * segments);
            assert_eq!(points.len(), outline_point_count(segments));
        }
    }

    #[test]
    fn test_zero_segments_treated_as_one() {
        let points = generate_box_outline(&sample_bounds(), 0, SPHERE_RADIUS);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_points_lie_on_sphere() {
        let points = generate_box_outline(&sample_bounds(), 20, SPHERE_RADIUS);
        for p in points {
            assert!((to_vec3(p).length() - SPHERE_RADIUS).abs() < 1e-2);
        }
    }

    #[test]
    fn test_starts_at_top_left_and_closes_on_left_edge() {
        let bounds = sample_bounds();
        let segments = 20;
        let points = generate_box_outline(&bounds, segments, SPHERE_RADIUS);

        let first = sphere_position_to_geo(to_vec3(points[0]));
        assert!((first.azimuth - 30.0).abs() < 1e-3);
        assert!((first.altitude - 20.0).abs() < 1e-3);

        let last = sphere_position_to_geo(to_vec3(*points.last().unwrap()));
        assert!((last.azimuth - 30.0).abs() < 1e-3);
        let expected_alt = 10.0 + 10.0 * (segments as f64 - 1.0) / segments as f64;
        assert!((last.altitude - expected_alt).abs() < 1e-3);
    }

    #[test]
    fn test_loop_has_no_long_jumps() {
        // Consecutive points, including last -> first, are one step apart at most.
        let points = generate_box_outline(&sample_bounds(), 20, SPHERE_RADIUS);
        let mut max_step = 0.0_f64;
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            max_step = max_step.max(distance(points[i], next));
        }
        // One 0.75 degree step on a 500 radius sphere is ~6.5 units
        assert!(max_step < 7.0, "max step {max_step}");
    }

    #[test]
    fn test_clockwise_corner_order() {
        let bounds = sample_bounds();
        let segments = 4;
        let points = generate_box_outline(&bounds, segments, SPHERE_RADIUS);
        let corners = corner_positions(&bounds, SPHERE_RADIUS);

        // top-left, top-right, bottom-right, bottom-left along the loop
        assert!(distance(points[0], corners[0].to_f32_array()) < 1e-3);
        assert!(distance(points[segments], corners[1].to_f32_array()) < 1e-3);
        assert!(distance(points[2 * segments], corners[3].to_f32_array()) < 1e-3);
        assert!(distance(points[3 * segments], corners[2].to_f32_array()) < 1e-3);
    }

    #[test]
    fn test_into_reuses_buffer() {
        let mut buffer = generate_box_outline(&sample_bounds(), 20, SPHERE_RADIUS);
        let capacity = buffer.capacity();
        let smaller = GeoBounds::from_edges(100.0, -20.0, 110.0, -10.0);
        generate_box_outline_into(&mut buffer, &smaller, 20, SPHERE_RADIUS);
        assert_eq!(buffer.len(), 80);
        assert_eq!(buffer.capacity(), capacity);
    }
}
