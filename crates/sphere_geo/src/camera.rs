//! Focus-on-box camera math.
//!
//! The camera sits at the sphere center. Focusing a box means turning toward
//! its center and narrowing the field of view to roughly fit its size.

use crate::bounds::GeoBounds;
use crate::coords::{Vec3, to_sphere_position};

/// Narrowest field of view the viewer allows, in degrees.
pub const MIN_FOV: f64 = 20.0;

/// Widest field of view the viewer allows, in degrees.
pub const MAX_FOV: f64 = 100.0;

/// Field of view the viewer opens with, in degrees.
pub const DEFAULT_FOV: f64 = 75.0;

/// Upper limit for a focus field of view, in degrees.
pub const FOCUS_MAX_FOV: f64 = 75.0;

/// Field of view per unit of average UV box size.
const FOV_PER_UV: f64 = 500.0;

/// Where to point the camera to frame a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFocus {
    /// Unit vector from the sphere center toward the box center.
    pub direction: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f64,
}

/// Compute the camera focus for `bounds`.
pub fn camera_focus(bounds: &GeoBounds) -> CameraFocus {
    let direction = to_sphere_position(bounds.center(), 1.0).normalized();

    let uv = bounds.to_uv();
    let average_size = (uv.width() + uv.height()) / 2.0;
    let fov = (average_size * FOV_PER_UV).clamp(MIN_FOV, FOCUS_MAX_FOV);

    CameraFocus { direction, fov }
}

/// Apply a wheel zoom step to a field of view, clamped to the viewer limits.
pub fn zoom_fov(fov: f64, wheel_delta: f64, speed: f64) -> f64 {
    (fov + wheel_delta * speed).clamp(MIN_FOV, MAX_FOV)
}
