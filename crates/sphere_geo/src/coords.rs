//! Coordinate spaces of the panorama sphere.
//!
//! Three representations describe the same surface point:
//! - [`GeoCoordinate`]: azimuth/altitude in degrees (canonical)
//! - [`UvCoordinate`]: normalized texture coordinates
//! - [`Vec3`]: a Cartesian point on the rendered sphere mesh
//!
//! All functions here are pure. Callers clamp inputs; the conversions do not.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Radius of the sphere mesh the panorama texture is mapped onto.
pub const SPHERE_RADIUS: f64 = 500.0;

/// Rotation of the sphere mesh about its vertical (Y) axis, in radians.
///
/// Must match the rotation the viewer applies to its sphere mesh. If the mesh
/// rotation changes, this constant changes with it or overlays drift off the
/// image content.
pub const MESH_ROTATION_Y: f64 = PI;

/// Offset subtracted from the texture longitude to line up with the texture seam.
pub const LONGITUDE_OFFSET: f64 = FRAC_PI_2;

/// Full azimuth range in degrees.
pub const AZIMUTH_RANGE: f64 = 360.0;

/// Maximum altitude (zenith) in degrees.
pub const MAX_ALTITUDE: f64 = 90.0;

/// Minimum altitude (nadir) in degrees.
pub const MIN_ALTITUDE: f64 = -90.0;

// ============================================================================
// Geographic Coordinates
// ============================================================================

/// A point on the sphere surface in degrees.
///
/// Azimuth 0 is north and wraps at 360. Altitude 0 is the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub azimuth: f64,
    pub altitude: f64,
}

impl GeoCoordinate {
    pub fn new(azimuth: f64, altitude: f64) -> Self {
        Self { azimuth, altitude }
    }

    /// Clamp to the valid domain: azimuth 0-360, altitude -90..90.
    pub fn clamped(&self) -> Self {
        Self {
            azimuth: self.azimuth.clamp(0.0, AZIMUTH_RANGE),
            altitude: self.altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE),
        }
    }

    /// Convert to normalized texture coordinates.
    pub fn to_uv(&self) -> UvCoordinate {
        UvCoordinate {
            u: self.azimuth / AZIMUTH_RANGE,
            v: (MAX_ALTITUDE - self.altitude) / 180.0,
        }
    }

    /// Project onto a sphere of the given radius, in mesh space.
    pub fn to_sphere_position(&self, radius: f64) -> Vec3 {
        to_sphere_position(*self, radius)
    }
}

// ============================================================================
// Texture Coordinates
// ============================================================================

/// Normalized texture coordinates, both axes in 0..1.
///
/// `v` grows downward: `v = 0` is the zenith, `v = 1` the nadir.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UvCoordinate {
    pub u: f64,
    pub v: f64,
}

impl UvCoordinate {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Clamp both axes to 0..1.
    pub fn clamped(&self) -> Self {
        Self {
            u: self.u.clamp(0.0, 1.0),
            v: self.v.clamp(0.0, 1.0),
        }
    }

    /// Convert to geographic degrees.
    pub fn to_geo(&self) -> GeoCoordinate {
        GeoCoordinate {
            azimuth: self.u * AZIMUTH_RANGE,
            altitude: MAX_ALTITUDE - self.v * 180.0,
        }
    }
}

impl From<UvCoordinate> for GeoCoordinate {
    fn from(uv: UvCoordinate) -> Self {
        uv.to_geo()
    }
}

impl From<GeoCoordinate> for UvCoordinate {
    fn from(geo: GeoCoordinate) -> Self {
        geo.to_uv()
    }
}

// ============================================================================
// Cartesian Points
// ============================================================================

/// A point in the viewer's 3D scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }

    /// Single-precision components for vertex buffers.
    pub fn to_f32_array(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

/// Map a surface coordinate to a 3D point on a sphere of `radius`.
///
/// The texture is wrapped with the longitude origin shifted by
/// [`LONGITUDE_OFFSET`] and the mesh rotated by [`MESH_ROTATION_Y`] about Y.
pub fn to_sphere_position(coord: GeoCoordinate, radius: f64) -> Vec3 {
    let uv = coord.to_uv();
    let phi = uv.u * TAU - LONGITUDE_OFFSET;
    let theta = uv.v * PI;

    // Position in the unrotated mesh frame
    let local_x = radius * theta.sin() * phi.sin();
    let local_y = radius * theta.cos();
    let local_z = radius * theta.sin() * phi.cos();

    let (sin_r, cos_r) = MESH_ROTATION_Y.sin_cos();
    Vec3::new(
        local_x * cos_r + local_z * sin_r,
        local_y,
        -local_x * sin_r + local_z * cos_r,
    )
}

/// Inverse of [`to_sphere_position`]: the surface coordinate under a scene point.
///
/// The radius of `point` is irrelevant; only its direction is used. At the
/// poles the azimuth is undefined and comes back as whatever `atan2` yields.
pub fn sphere_position_to_geo(point: Vec3) -> GeoCoordinate {
    let radius = point.length();
    if radius == 0.0 {
        return GeoCoordinate::default();
    }

    let (sin_r, cos_r) = MESH_ROTATION_Y.sin_cos();
    let local_x = point.x * cos_r - point.z * sin_r;
    let local_z = point.x * sin_r + point.z * cos_r;

    let theta = (point.y / radius).clamp(-1.0, 1.0).acos();
    let phi = local_x.atan2(local_z);

    let u = ((phi + LONGITUDE_OFFSET) / TAU).rem_euclid(1.0);
    let v = theta / PI;
    UvCoordinate::new(u, v).to_geo()
}
