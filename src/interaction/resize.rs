//! Corner handles and the resize rules behind them.

use serde::{Deserialize, Serialize};
use sphere_geo::coords::{AZIMUTH_RANGE, MAX_ALTITUDE, MIN_ALTITUDE};
use sphere_geo::{GeoBounds, GeoCoordinate};

use super::InteractionLimits;
use crate::model::BoxId;

/// A draggable corner of a selected box.
///
/// Named as seen on the texture: "top" is the higher altitude, "left" the
/// smaller azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// All handles, in outline corner order.
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    /// Position of this handle on `bounds`.
    pub fn corner(&self, bounds: &GeoBounds) -> GeoCoordinate {
        match self {
            ResizeHandle::TopLeft => bounds.top_left(),
            ResizeHandle::TopRight => bounds.top_right(),
            ResizeHandle::BottomLeft => bounds.bottom_left(),
            ResizeHandle::BottomRight => bounds.bottom_right(),
        }
    }

    /// The corner that stays put while this handle is dragged.
    pub fn opposite(&self) -> ResizeHandle {
        match self {
            ResizeHandle::TopLeft => ResizeHandle::BottomRight,
            ResizeHandle::TopRight => ResizeHandle::BottomLeft,
            ResizeHandle::BottomLeft => ResizeHandle::TopRight,
            ResizeHandle::BottomRight => ResizeHandle::TopLeft,
        }
    }

    fn moves_left_edge(&self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::BottomLeft)
    }

    fn moves_top_edge(&self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::TopRight)
    }
}

/// An active resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeState {
    pub box_id: BoxId,
    pub handle: ResizeHandle,
    /// Bounds before the drag started, for cancel.
    pub original: GeoBounds,
}

/// Move the two edges `handle` controls toward `point`.
///
/// The point is clamped to the valid domain. Moving edges stop
/// `min_width`/`min_height` short of the opposite edges, and the azimuth span
/// is capped at `max_width` by holding the moving edge back. Moving edges
/// never leave the domain, so a box against the domain boundary can end up
/// below the minimum size there.
pub fn resize_bounds(
    handle: ResizeHandle,
    point: GeoCoordinate,
    current: &GeoBounds,
    limits: &InteractionLimits,
) -> GeoBounds {
    let point = point.clamped();
    let mut min = current.min;
    let mut max = current.max;

    if handle.moves_left_edge() {
        min.azimuth = point.azimuth.min(max.azimuth - limits.min_width);
        if max.azimuth - min.azimuth > limits.max_width {
            min.azimuth = max.azimuth - limits.max_width;
        }
    } else {
        max.azimuth = point.azimuth.max(min.azimuth + limits.min_width);
        if max.azimuth - min.azimuth > limits.max_width {
            max.azimuth = min.azimuth + limits.max_width;
        }
    }

    if handle.moves_top_edge() {
        max.altitude = point.altitude.max(min.altitude + limits.min_height);
    } else {
        min.altitude = point.altitude.min(max.altitude - limits.min_height);
    }

    if handle.moves_left_edge() {
        min.azimuth = min.azimuth.clamp(0.0, AZIMUTH_RANGE);
    } else {
        max.azimuth = max.azimuth.clamp(0.0, AZIMUTH_RANGE);
    }
    if handle.moves_top_edge() {
        max.altitude = max.altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    } else {
        min.altitude = min.altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    }

    GeoBounds { min, max }
}

/// The handle of `bounds` under `point`, if any lies within `radius` degrees.
///
/// When several handles are in reach (tiny boxes), the nearest wins.
pub fn handle_at(point: GeoCoordinate, bounds: &GeoBounds, radius: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .iter()
        .map(|handle| {
            let corner = handle.corner(bounds);
            let d_az = corner.azimuth - point.azimuth;
            let d_alt = corner.altitude - point.altitude;
            (*handle, (d_az * d_az + d_alt * d_alt).sqrt())
        })
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GeoBounds {
        GeoBounds::from_edges(100.0, 0.0, 140.0, 30.0)
    }

    #[test]
    fn test_each_handle_moves_its_edges() {
        let limits = InteractionLimits::default();
        let b = sample();
        let p = GeoCoordinate::new(90.0, 40.0);
        assert_eq!(
            resize_bounds(ResizeHandle::TopLeft, p, &b, &limits),
            GeoBounds::from_edges(90.0, 0.0, 140.0, 40.0)
        );

        let p = GeoCoordinate::new(150.0, 40.0);
        assert_eq!(
            resize_bounds(ResizeHandle::TopRight, p, &b, &limits),
            GeoBounds::from_edges(100.0, 0.0, 150.0, 40.0)
        );

        let p = GeoCoordinate::new(90.0, -10.0);
        assert_eq!(
            resize_bounds(ResizeHandle::BottomLeft, p, &b, &limits),
            GeoBounds::from_edges(90.0, -10.0, 140.0, 30.0)
        );

        let p = GeoCoordinate::new(150.0, -10.0);
        assert_eq!(
            resize_bounds(ResizeHandle::BottomRight, p, &b, &limits),
            GeoBounds::from_edges(100.0, -10.0, 150.0, 30.0)
        );
    }

    #[test]
    fn test_opposite_corner_is_fixed() {
        let limits = InteractionLimits::default();
        let b = sample();
        for handle in ResizeHandle::ALL {
            let fixed = handle.opposite().corner(&b);
            for p in [
                GeoCoordinate::new(0.0, -90.0),
                GeoCoordinate::new(360.0, 90.0),
                GeoCoordinate::new(120.0, 15.0),
                GeoCoordinate::new(-50.0, 200.0),
            ] {
                let resized = resize_bounds(handle, p, &b, &limits);
                assert_eq!(handle.opposite().corner(&resized), fixed, "{:?}", handle);
            }
        }
    }

    #[test]
    fn test_cannot_cross_opposite_edge() {
        let limits = InteractionLimits::default();
        let b = sample();
        // Drag the top-left handle far past the bottom-right corner
        let resized = resize_bounds(ResizeHandle::TopLeft, GeoCoordinate::new(300.0, -80.0), &b, &limits);
        assert!((resized.width() - limits.min_width).abs() < 1e-9);
        assert!((resized.height() - limits.min_height).abs() < 1e-9);
        assert_eq!(resized.max.azimuth, 140.0);
        assert_eq!(resized.min.altitude, 0.0);
    }

    #[test]
    fn test_width_capped() {
        let limits = InteractionLimits::default();
        let b = sample();
        let resized = resize_bounds(ResizeHandle::BottomRight, GeoCoordinate::new(350.0, 0.0), &b, &limits);
        assert_eq!(resized.max.azimuth, 280.0);
        assert_eq!(resized.min.azimuth, 100.0);
    }

    #[test]
    fn test_point_clamped_to_domain() {
        let limits = InteractionLimits::default();
        let b = GeoBounds::from_edges(10.0, 60.0, 40.0, 80.0);
        let resized = resize_bounds(ResizeHandle::TopLeft, GeoCoordinate::new(-30.0, 120.0), &b, &limits);
        assert_eq!(resized.min.azimuth, 0.0);
        assert_eq!(resized.max.altitude, 90.0);
    }

    #[test]
    fn test_min_size_does_not_push_edges_out_of_domain() {
        let limits = InteractionLimits::default();
        let b = GeoBounds::from_edges(0.0, 88.0, 5.0, 90.0);
        let resized = resize_bounds(ResizeHandle::TopLeft, GeoCoordinate::new(0.0, 90.0), &b, &limits);
        assert_eq!(resized.min.azimuth, 0.0);
        assert_eq!(resized.max.altitude, 90.0);
        assert_eq!(resized.bottom_right(), b.bottom_right());

        let b = GeoBounds::from_edges(355.0, -90.0, 360.0, -88.0);
        let resized = resize_bounds(ResizeHandle::BottomRight, GeoCoordinate::new(360.0, -90.0), &b, &limits);
        assert_eq!(resized.max.azimuth, 360.0);
        assert_eq!(resized.min.altitude, -90.0);
        assert_eq!(resized.top_left(), b.top_left());
    }

    #[test]
    fn test_handle_at() {
        let b = sample();
        assert_eq!(
            handle_at(GeoCoordinate::new(100.5, 29.5), &b, 2.0),
            Some(ResizeHandle::TopLeft)
        );
        assert_eq!(
            handle_at(GeoCoordinate::new(141.0, -1.0), &b, 2.0),
            Some(ResizeHandle::BottomRight)
        );
        assert_eq!(handle_at(GeoCoordinate::new(120.0, 15.0), &b, 2.0), None);
    }
}
