//! SphereMark - bounding box annotation on 360° panoramas
//!
//! Boxes live in azimuth/altitude space on the viewing sphere. This crate
//! holds the viewer-side logic: drawing and resizing boxes under pointer
//! input, keeping a local list of boxes in sync with the annotation service,
//! and producing the outline geometry a renderer draws. Sphere math lives in
//! the `sphere_geo` crate.

pub mod api;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod replay;
pub mod session;
pub mod store;

pub use config::SessionConfig;
pub use session::{AnnotationSession, RenderData, SessionEvent};
pub use store::{AnnotationStore, SaveStatus};
