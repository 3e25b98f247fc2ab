//! Pointer interaction state: drawing, resizing and hover.
//!
//! [`InteractionState`] owns the transient state of one viewer session and
//! never touches boxes itself. It turns pointer samples into proposed bounds
//! that the caller hands to the store. Rejections (too small, seam wrap,
//! no active interaction) are `None`, never errors.
//!
//! All entry points take `impl Into<GeoCoordinate>`, so texture-space samples
//! (`UvCoordinate`) can be passed directly.

mod draw;
mod resize;

pub use draw::{DrawRejection, DrawState, constrain_draw_point};
pub use resize::{ResizeHandle, ResizeState, handle_at, resize_bounds};

use serde::{Deserialize, Serialize};
use sphere_geo::{GeoBounds, GeoCoordinate};

use crate::constants::{MAX_BOX_WIDTH, MIN_BOX_HEIGHT, MIN_BOX_WIDTH};
use crate::model::{BoundingBox, BoxId, hit_test};
use draw::{DrawCommit, commit_bounds};

/// What the pointer does in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Orbit the camera; boxes can be selected.
    #[default]
    View,
    /// Drag out new boxes.
    Draw,
    /// Select boxes and drag their corner handles.
    Edit,
}

impl InteractionMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::View => "View",
            InteractionMode::Draw => "Draw",
            InteractionMode::Edit => "Edit",
        }
    }
}

/// Size limits for drawn and resized boxes, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionLimits {
    pub min_width: f64,
    pub min_height: f64,
    /// Widest azimuth span; wider boxes would wrap through the seam.
    pub max_width: f64,
}

impl Default for InteractionLimits {
    fn default() -> Self {
        Self {
            min_width: MIN_BOX_WIDTH,
            min_height: MIN_BOX_HEIGHT,
            max_width: MAX_BOX_WIDTH,
        }
    }
}

/// An interaction dropped because the camera started panning or the mode changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CancelledInteraction {
    Draw,
    /// The caller should put `original` back on `box_id`.
    Resize { box_id: BoxId, original: GeoBounds },
}

/// Transient interaction state of one viewer session.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    limits: InteractionLimits,
    draw: DrawState,
    resize: Option<ResizeState>,
    hovered: Option<BoxId>,
    /// Middle mouse held: the camera owns the pointer.
    camera_pan: bool,
    rejection: Option<DrawRejection>,
}

impl InteractionState {
    pub fn new(limits: InteractionLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> &InteractionLimits {
        &self.limits
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch mode, dropping any draw or resize in progress.
    pub fn set_mode(&mut self, mode: InteractionMode) -> Option<CancelledInteraction> {
        if mode != self.mode {
            log::debug!("Interaction mode {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
        self.cancel_active()
    }

    /// Whether the camera controls should respond to the pointer.
    pub fn controls_enabled(&self) -> bool {
        self.mode == InteractionMode::View && self.resize.is_none()
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_drawing()
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    pub fn draw_state(&self) -> &DrawState {
        &self.draw
    }

    /// Bounds of the box being drawn, for the preview outline.
    pub fn draw_preview(&self) -> Option<GeoBounds> {
        self.draw.bounds()
    }

    pub fn resize_state(&self) -> Option<&ResizeState> {
        self.resize.as_ref()
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Begin drawing at `point`.
    ///
    /// Refused while another interaction is active or the camera is panning.
    pub fn start_draw(&mut self, point: impl Into<GeoCoordinate>) -> bool {
        if self.draw.is_drawing() || self.resize.is_some() || self.camera_pan {
            return false;
        }
        let anchor = point.into().clamped();
        self.draw = DrawState::Drawing {
            anchor,
            current: anchor,
        };
        self.rejection = None;
        log::debug!("Draw started at {:?}", anchor);
        true
    }

    /// Move the free corner of the box being drawn.
    ///
    /// Returns the preview bounds, or `None` when not drawing.
    pub fn update_draw(&mut self, point: impl Into<GeoCoordinate>) -> Option<GeoBounds> {
        let DrawState::Drawing { anchor, .. } = self.draw else {
            return None;
        };
        let current = constrain_draw_point(anchor, point.into(), &self.limits);
        self.draw = DrawState::Drawing { anchor, current };
        self.draw.bounds()
    }

    /// Commit the drawing.
    ///
    /// Returns `None` for degenerate boxes and for boxes that would wrap the
    /// seam; the latter also leaves a rejection for [`Self::take_rejection`].
    pub fn finish_draw(&mut self) -> Option<GeoBounds> {
        let bounds = std::mem::take(&mut self.draw).bounds()?;
        match commit_bounds(bounds, &self.limits) {
            DrawCommit::Accepted(bounds) => {
                log::debug!("Draw finished: {:?}", bounds);
                Some(bounds)
            }
            DrawCommit::TooSmall(bounds) => {
                log::debug!(
                    "Discarding drawn box {:.1}x{:.1}, below minimum size",
                    bounds.width(),
                    bounds.height()
                );
                None
            }
            DrawCommit::Rejected(rejection) => {
                log::warn!("{}", rejection);
                self.rejection = Some(rejection);
                None
            }
        }
    }

    /// Drop the drawing without committing anything.
    pub fn cancel_draw(&mut self) {
        if self.draw.is_drawing() {
            log::debug!("Draw cancelled");
        }
        self.draw = DrawState::Idle;
    }

    /// The user-facing rejection of the last finished drawing, if any.
    pub fn take_rejection(&mut self) -> Option<DrawRejection> {
        self.rejection.take()
    }

    // ========================================================================
    // Resizing
    // ========================================================================

    /// Grab `handle` of `box_id`, remembering `original` for cancel.
    pub fn start_resize(&mut self, box_id: BoxId, handle: ResizeHandle, original: GeoBounds) -> bool {
        if self.draw.is_drawing() || self.resize.is_some() || self.camera_pan {
            return false;
        }
        log::debug!("Resize of {} started on {:?}", box_id, handle);
        self.resize = Some(ResizeState {
            box_id,
            handle,
            original,
        });
        true
    }

    /// New bounds for the box being resized with the handle at `point`.
    ///
    /// `current` is the box as it is now in the store. Returns `None` when no
    /// resize is active.
    pub fn update_resize(&mut self, point: impl Into<GeoCoordinate>, current: &GeoBounds) -> Option<GeoBounds> {
        let resize = self.resize.as_ref()?;
        Some(resize_bounds(resize.handle, point.into(), current, &self.limits))
    }

    /// End the resize, keeping whatever bounds were last applied.
    ///
    /// Returns the box that was being resized.
    pub fn finish_resize(&mut self) -> Option<BoxId> {
        let resize = self.resize.take()?;
        log::debug!("Resize of {} finished", resize.box_id);
        Some(resize.box_id)
    }

    /// End the resize and return the bounds the box had before it.
    pub fn cancel_resize(&mut self) -> Option<GeoBounds> {
        let resize = self.resize.take()?;
        log::debug!("Resize of {} cancelled", resize.box_id);
        Some(resize.original)
    }

    // ========================================================================
    // Hover and hit testing
    // ========================================================================

    pub fn set_hovered(&mut self, box_id: Option<BoxId>) {
        self.hovered = box_id;
    }

    pub fn hovered(&self) -> Option<BoxId> {
        self.hovered
    }

    /// The first box in `boxes` containing `point`.
    pub fn box_containing<'a>(
        &self,
        boxes: &'a [BoundingBox],
        point: impl Into<GeoCoordinate>,
    ) -> Option<&'a BoundingBox> {
        hit_test(boxes, point.into())
    }

    // ========================================================================
    // Camera pan lock
    // ========================================================================

    /// Set whether the camera is being panned.
    ///
    /// Starting a pan cancels (never finishes) an active draw or resize.
    pub fn set_camera_pan(&mut self, active: bool) -> Option<CancelledInteraction> {
        self.camera_pan = active;
        if active { self.cancel_active() } else { None }
    }

    pub fn camera_pan_active(&self) -> bool {
        self.camera_pan
    }

    /// Drop whichever interaction is active.
    fn cancel_active(&mut self) -> Option<CancelledInteraction> {
        if self.draw.is_drawing() {
            self.cancel_draw();
            return Some(CancelledInteraction::Draw);
        }
        let box_id = self.resize.as_ref()?.box_id;
        self.cancel_resize()
            .map(|original| CancelledInteraction::Resize { box_id, original })
    }
}
