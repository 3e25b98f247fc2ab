//! Angular rectangles on the sphere surface.

use serde::{Deserialize, Serialize};

use crate::coords::{GeoCoordinate, UvCoordinate};

/// An axis-aligned rectangle in azimuth/altitude space.
///
/// `min` holds the smaller azimuth and altitude, `max` the larger ones.
/// The constructors normalize their input, so the corners are never inverted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min: GeoCoordinate,
    pub max: GeoCoordinate,
}

impl GeoBounds {
    /// Create bounds from any two opposite corners.
    pub fn from_corners(a: GeoCoordinate, b: GeoCoordinate) -> Self {
        Self {
            min: GeoCoordinate::new(a.azimuth.min(b.azimuth), a.altitude.min(b.altitude)),
            max: GeoCoordinate::new(a.azimuth.max(b.azimuth), a.altitude.max(b.altitude)),
        }
    }

    /// Create bounds from raw edge values, normalizing swapped edges.
    pub fn from_edges(az_min: f64, alt_min: f64, az_max: f64, alt_max: f64) -> Self {
        Self::from_corners(
            GeoCoordinate::new(az_min, alt_min),
            GeoCoordinate::new(az_max, alt_max),
        )
    }

    /// Azimuth span in degrees.
    pub fn width(&self) -> f64 {
        self.max.azimuth - self.min.azimuth
    }

    /// Altitude span in degrees.
    pub fn height(&self) -> f64 {
        self.max.altitude - self.min.altitude
    }

    /// Center of the rectangle in angle space.
    pub fn center(&self) -> GeoCoordinate {
        GeoCoordinate::new(
            (self.min.azimuth + self.max.azimuth) / 2.0,
            (self.min.altitude + self.max.altitude) / 2.0,
        )
    }

    /// Componentwise containment test, edges inclusive.
    pub fn contains(&self, point: GeoCoordinate) -> bool {
        point.azimuth >= self.min.azimuth
            && point.azimuth <= self.max.azimuth
            && point.altitude >= self.min.altitude
            && point.altitude <= self.max.altitude
    }

    /// Upper-left corner as seen on the texture (min azimuth, max altitude).
    pub fn top_left(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.min.azimuth, self.max.altitude)
    }

    /// Upper-right corner (max azimuth, max altitude).
    pub fn top_right(&self) -> GeoCoordinate {
        self.max
    }

    /// Lower-left corner (min azimuth, min altitude).
    pub fn bottom_left(&self) -> GeoCoordinate {
        self.min
    }

    /// Lower-right corner (max azimuth, min altitude).
    pub fn bottom_right(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.max.azimuth, self.min.altitude)
    }

    /// The same rectangle in texture space.
    pub fn to_uv(&self) -> UvBounds {
        UvBounds::from_corners(self.min.to_uv(), self.max.to_uv())
    }
}

/// An axis-aligned rectangle in texture space.
///
/// Because `v` grows downward, `min.v` corresponds to the larger altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvBounds {
    pub min: UvCoordinate,
    pub max: UvCoordinate,
}

impl UvBounds {
    /// Create bounds from any two opposite corners.
    pub fn from_corners(a: UvCoordinate, b: UvCoordinate) -> Self {
        Self {
            min: UvCoordinate::new(a.u.min(b.u), a.v.min(b.v)),
            max: UvCoordinate::new(a.u.max(b.u), a.v.max(b.v)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.u - self.min.u
    }

    pub fn height(&self) -> f64 {
        self.max.v - self.min.v
    }

    /// The same rectangle in geographic space.
    pub fn to_geo(&self) -> GeoBounds {
        GeoBounds::from_corners(self.min.to_geo(), self.max.to_geo())
    }
}

impl From<UvBounds> for GeoBounds {
    fn from(uv: UvBounds) -> Self {
        uv.to_geo()
    }
}

impl From<GeoBounds> for UvBounds {
    fn from(geo: GeoBounds) -> Self {
        geo.to_uv()
    }
}
