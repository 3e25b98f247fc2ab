//! Sphere geometry for panorama annotation overlays.
//!
//! Converts between texture UV, geographic angles and 3D positions on the
//! viewer's sphere mesh, and generates outline geometry that follows the
//! sphere's curvature.

pub mod bounds;
pub mod camera;
pub mod coords;
pub mod outline;

pub use bounds::{GeoBounds, UvBounds};
pub use camera::{CameraFocus, DEFAULT_FOV, camera_focus, zoom_fov};
pub use coords::{
    GeoCoordinate, LONGITUDE_OFFSET, MESH_ROTATION_Y, SPHERE_RADIUS, UvCoordinate, Vec3,
    sphere_position_to_geo, to_sphere_position,
};
pub use outline::{
    DEFAULT_SEGMENTS_PER_EDGE, corner_positions, generate_box_outline, generate_box_outline_into,
    outline_point_count,
};
