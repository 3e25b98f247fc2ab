//! Rubber-band drawing of new boxes.

use sphere_geo::{GeoBounds, GeoCoordinate};
use thiserror::Error;

use super::InteractionLimits;

/// In-progress box drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// Dragging out a box from `anchor` toward `current`.
    Drawing {
        anchor: GeoCoordinate,
        current: GeoCoordinate,
    },
}

impl DrawState {
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawState::Drawing { .. })
    }

    /// The rectangle spanned so far, if drawing.
    pub fn bounds(&self) -> Option<GeoBounds> {
        match self {
            DrawState::Idle => None,
            DrawState::Drawing { anchor, current } => Some(GeoBounds::from_corners(*anchor, *current)),
        }
    }
}

/// Why a finished drawing was turned down, for display to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawRejection {
    /// The box would span more than half the panorama and cross the seam.
    #[error(
        "Bounding boxes cannot wrap around the panorama edge ({width:.1}° wide). Please draw boxes within the visible area."
    )]
    WrapsSeam {
        /// Azimuth span of the rejected box in degrees
        width: f64,
    },
}

/// Constrain a drawing sample against its anchor.
///
/// The sample is clamped to the valid domain, then its azimuth is pulled
/// toward the anchor so the span never exceeds `limits.max_width`.
pub fn constrain_draw_point(
    anchor: GeoCoordinate,
    point: GeoCoordinate,
    limits: &InteractionLimits,
) -> GeoCoordinate {
    let mut point = point.clamped();
    let delta = point.azimuth - anchor.azimuth;
    if delta.abs() > limits.max_width {
        point.azimuth = anchor.azimuth + delta.signum() * limits.max_width;
    }
    point
}

/// Outcome of committing a drawing.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum DrawCommit {
    Accepted(GeoBounds),
    TooSmall(GeoBounds),
    Rejected(DrawRejection),
}

/// Decide what a finished drawing becomes.
pub(super) fn commit_bounds(bounds: GeoBounds, limits: &InteractionLimits) -> DrawCommit {
    if bounds.width() > limits.max_width {
        return DrawCommit::Rejected(DrawRejection::WrapsSeam {
            width: bounds.width(),
        });
    }
    if bounds.width() < limits.min_width || bounds.height() < limits.min_height {
        return DrawCommit::TooSmall(bounds);
    }
    DrawCommit::Accepted(bounds)
}
