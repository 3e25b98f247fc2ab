//! Global constants for the annotation core

use std::time::Duration;

/// Minimum box width in degrees of azimuth (2% of the texture width)
pub const MIN_BOX_WIDTH: f64 = 7.2;

/// Minimum box height in degrees of altitude (2% of the texture height)
pub const MIN_BOX_HEIGHT: f64 = 3.6;

/// Maximum box width in degrees of azimuth (half the sphere)
pub const MAX_BOX_WIDTH: f64 = 180.0;

/// Pointer distance in degrees within which a handle is grabbed
pub const HANDLE_HIT_RADIUS: f64 = 2.0;

/// Field of view change in degrees per unit of wheel delta
pub const ZOOM_SPEED: f64 = 0.05;

/// How long "Saved" / "Error saving" stays visible
pub const SAVE_STATUS_DISPLAY: Duration = Duration::from_secs(2);

/// Default annotation service location
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
