//! Viewer glue: one open panorama with its boxes and pointer state.
//!
//! [`AnnotationSession`] routes pointer and keyboard input to the interaction
//! state machine, applies its results to the store, and produces the
//! geometry the renderer draws.

use serde::Serialize;
use sphere_geo::{
    CameraFocus, DEFAULT_FOV, GeoBounds, GeoCoordinate, camera_focus, corner_positions,
    generate_box_outline_into, zoom_fov,
};

use crate::api::SyncBackend;
use crate::color_utils::{DRAW_PREVIEW_COLOR, SELECTED_COLOR, to_rgb_f32};
use crate::config::SessionConfig;
use crate::interaction::{
    CancelledInteraction, InteractionMode, InteractionState, ResizeHandle, handle_at,
};
use crate::keybindings::{Key, KeyAction};
use crate::model::{BoxId, ImageId};
use crate::store::{AnnotationStore, DeleteOutcome, SaveStatusTracker, StoreError};

/// Something the host UI should react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A drawn box was committed to the store.
    Created { box_id: BoxId },
    /// The selection changed.
    Selected { box_id: Option<BoxId> },
    /// A drawing was turned down; `message` is for the user.
    DrawRejected { message: String },
    /// The user asked to edit the label of `box_id`.
    EditLabelRequested { box_id: BoxId },
    /// A delete was issued, deferred or applied locally.
    DeleteRequested { box_id: BoxId },
}

/// Outline of one box, ready for a line-loop draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxOutline {
    /// `None` for the draw preview.
    pub box_id: Option<BoxId>,
    pub points: Vec<[f32; 3]>,
    pub color: [f32; 3],
    pub selected: bool,
    pub hovered: bool,
}

impl BoxOutline {
    fn empty() -> Self {
        Self {
            box_id: None,
            points: Vec::new(),
            color: [1.0, 1.0, 1.0],
            selected: false,
            hovered: false,
        }
    }
}

/// A resize handle anchor in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleAnchor {
    pub handle: ResizeHandle,
    pub position: [f32; 3],
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderData {
    pub outlines: Vec<BoxOutline>,
    pub preview: Option<BoxOutline>,
    pub handles: Vec<HandleAnchor>,
}

/// One open image with its store and interaction state.
pub struct AnnotationSession<B: SyncBackend> {
    config: SessionConfig,
    store: AnnotationStore<B>,
    interaction: InteractionState,
    events: Vec<SessionEvent>,
    /// Vertical field of view in degrees.
    fov: f64,
}

impl<B: SyncBackend> AnnotationSession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        let tracker = SaveStatusTracker::new().with_display_duration(config.save_status_display());
        Self {
            store: AnnotationStore::new(backend).with_save_status(tracker),
            interaction: InteractionState::new(config.limits),
            config,
            events: Vec::new(),
            fov: DEFAULT_FOV,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &AnnotationStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore<B> {
        &mut self.store
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    /// Open an image, tearing down the state of the previous one.
    ///
    /// The interaction mode carries over; everything else starts fresh.
    pub fn open_image(&mut self, image_id: ImageId) {
        self.teardown();
        self.store.load(image_id);
    }

    /// Close the current image.
    pub fn close(&mut self) {
        self.teardown();
        self.store.unload();
    }

    fn teardown(&mut self) {
        let mode = self.interaction.mode();
        self.interaction = InteractionState::new(self.config.limits);
        self.interaction.set_mode(mode);
        self.events.clear();
    }

    /// Switch interaction mode, restoring a box whose resize was interrupted.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        let cancelled = self.interaction.set_mode(mode);
        self.restore_cancelled(cancelled);
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Primary button pressed at `point`.
    pub fn pointer_down(&mut self, point: impl Into<GeoCoordinate>) {
        let point = point.into();
        if self.interaction.camera_pan_active() {
            return;
        }

        match self.interaction.mode() {
            InteractionMode::Draw => {
                self.interaction.start_draw(point);
            }
            InteractionMode::Edit => {
                if !self.try_grab_handle(point) {
                    self.select_at(point);
                }
            }
            InteractionMode::View => self.select_at(point),
        }
    }

    /// Start a resize if `point` is on a handle of the selected box.
    fn try_grab_handle(&mut self, point: GeoCoordinate) -> bool {
        let Some(selected) = self.store.selected_box() else {
            return false;
        };
        let Some(handle) = handle_at(point, &selected.bounds, self.config.handle_hit_radius) else {
            return false;
        };
        let (box_id, bounds) = (selected.id, selected.bounds);
        self.interaction.start_resize(box_id, handle, bounds)
    }

    fn select_at(&mut self, point: GeoCoordinate) {
        let hit = self.store.box_at(point).map(|b| b.id);
        self.select(hit);
    }

    fn select(&mut self, box_id: Option<BoxId>) {
        if self.store.selected() != box_id && self.store.select(box_id) {
            self.events.push(SessionEvent::Selected { box_id });
        }
    }

    /// Pointer moved to `point`.
    pub fn pointer_move(&mut self, point: impl Into<GeoCoordinate>) {
        let point = point.into();
        let hovered = self.store.box_at(point).map(|b| b.id);
        self.interaction.set_hovered(hovered);

        if self.interaction.is_drawing() {
            self.interaction.update_draw(point);
            return;
        }

        let Some(box_id) = self.interaction.resize_state().map(|r| r.box_id) else {
            return;
        };
        let Some(current) = self.store.get(box_id).map(|b| b.bounds) else {
            // The box went away mid-drag
            self.interaction.cancel_resize();
            return;
        };
        if let Some(bounds) = self.interaction.update_resize(point, &current) {
            if bounds != current {
                self.apply_update(box_id, bounds);
            }
        }
    }

    /// Primary button released.
    pub fn pointer_up(&mut self) {
        if self.interaction.is_drawing() {
            self.commit_draw();
        } else {
            self.interaction.finish_resize();
        }
    }

    fn commit_draw(&mut self) {
        let finished = self.interaction.finish_draw();
        if let Some(rejection) = self.interaction.take_rejection() {
            self.events.push(SessionEvent::DrawRejected {
                message: rejection.to_string(),
            });
        }
        let Some(bounds) = finished else {
            return;
        };

        match self.store.create(bounds) {
            Ok(created) => {
                self.events.push(SessionEvent::Created { box_id: created.id });
                self.select(Some(created.id));
            }
            Err(e) => log::warn!("Dropping drawn box: {}", e),
        }
    }

    /// Middle button (camera pan) pressed or released.
    pub fn set_camera_pan(&mut self, active: bool) {
        let cancelled = self.interaction.set_camera_pan(active);
        self.restore_cancelled(cancelled);
    }

    fn restore_cancelled(&mut self, cancelled: Option<CancelledInteraction>) {
        if let Some(CancelledInteraction::Resize { box_id, original }) = cancelled {
            self.restore_box(box_id, original);
        }
    }

    fn restore_box(&mut self, box_id: BoxId, original: GeoBounds) {
        let unchanged = self.store.get(box_id).map(|b| b.bounds == original);
        if unchanged == Some(false) {
            self.apply_update(box_id, original);
        }
    }

    fn apply_update(&mut self, box_id: BoxId, bounds: GeoBounds) {
        if let Err(e) = self.store.update(box_id, bounds) {
            log::warn!("Failed to update {}: {}", box_id, e);
        }
    }

    // ========================================================================
    // Keyboard input
    // ========================================================================

    /// Handle a key press. Returns the action it triggered, if any.
    pub fn key_pressed(&mut self, key: Key) -> Option<KeyAction> {
        let action = self.config.keybindings.action_for_key(key)?;
        self.perform(action);
        Some(action)
    }

    /// Run a keyboard action.
    pub fn perform(&mut self, action: KeyAction) {
        match action {
            KeyAction::Cancel => self.cancel(),
            KeyAction::DeleteSelected => self.delete_selected(),
            KeyAction::ViewMode => self.set_mode(InteractionMode::View),
            KeyAction::DrawMode => self.set_mode(InteractionMode::Draw),
            KeyAction::EditMode => self.set_mode(InteractionMode::Edit),
            KeyAction::EditLabel => {
                if let Some(box_id) = self.store.selected() {
                    self.events.push(SessionEvent::EditLabelRequested { box_id });
                }
            }
        }
    }

    /// Cancel the active draw or resize, else clear the selection.
    fn cancel(&mut self) {
        if self.interaction.is_drawing() {
            self.interaction.cancel_draw();
        } else if let Some(box_id) = self.interaction.resize_state().map(|r| r.box_id) {
            if let Some(original) = self.interaction.cancel_resize() {
                self.restore_box(box_id, original);
            }
        } else {
            self.select(None);
        }
    }

    fn delete_selected(&mut self) {
        if self.interaction.is_drawing() || self.interaction.is_resizing() {
            return;
        }
        let Some(box_id) = self.store.selected() else {
            return;
        };
        match self.store.delete(box_id) {
            Ok(DeleteOutcome::AlreadyPending) => {}
            Ok(_) => self.events.push(SessionEvent::DeleteRequested { box_id }),
            Err(e) => log::warn!("Failed to delete {}: {}", box_id, e),
        }
    }

    /// Set the label of a box (the answer to `EditLabelRequested`).
    pub fn set_label(&mut self, box_id: BoxId, label: &str) -> Result<(), StoreError> {
        self.store.update_label(box_id, label.trim())
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Apply service completions and expire the save status.
    pub fn tick(&mut self) {
        self.store.process_responses();
        self.store.tick();

        if let Some(hovered) = self.interaction.hovered() {
            if self.store.get(hovered).is_none() {
                self.interaction.set_hovered(None);
            }
        }
    }

    /// Take the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Camera
    // ========================================================================

    /// Current vertical field of view in degrees.
    pub fn fov(&self) -> f64 {
        self.fov
    }

    /// Apply a wheel step; positive deltas zoom out. Returns the new field of view.
    pub fn zoom(&mut self, wheel_delta: f64) -> f64 {
        self.fov = zoom_fov(self.fov, wheel_delta, self.config.zoom_speed);
        self.fov
    }

    /// Camera focus for the selected box. The session takes on its field of view.
    pub fn focus_selected(&mut self) -> Option<CameraFocus> {
        let focus = camera_focus(&self.store.selected_box()?.bounds);
        self.fov = focus.fov;
        Some(focus)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Build the geometry for the current frame.
    pub fn render(&self) -> RenderData {
        let mut data = RenderData::default();
        self.render_into(&mut data);
        data
    }

    /// Same as [`render`](Self::render), refilling the buffers of a previous frame.
    pub fn render_into(&self, out: &mut RenderData) {
        let radius = self.config.sphere_radius;
        let segments = self.config.segments_per_edge;
        let selected = self.store.selected();
        let hovered = self.interaction.hovered();

        out.outlines.truncate(self.store.len());
        for (index, b) in self.store.iter().enumerate() {
            if index == out.outlines.len() {
                out.outlines.push(BoxOutline::empty());
            }
            let outline = &mut out.outlines[index];
            let is_selected = selected == Some(b.id);
            outline.box_id = Some(b.id);
            outline.color = to_rgb_f32(if is_selected { SELECTED_COLOR } else { &b.color });
            outline.selected = is_selected;
            outline.hovered = hovered == Some(b.id);
            generate_box_outline_into(&mut outline.points, &b.bounds, segments, radius);
        }

        match self.interaction.draw_preview() {
            Some(bounds) => {
                let preview = out.preview.get_or_insert_with(BoxOutline::empty);
                preview.box_id = None;
                preview.color = to_rgb_f32(DRAW_PREVIEW_COLOR);
                preview.selected = false;
                preview.hovered = false;
                generate_box_outline_into(&mut preview.points, &bounds, segments, radius);
            }
            None => out.preview = None,
        }

        out.handles.clear();
        if let (InteractionMode::Edit, Some(b)) = (self.interaction.mode(), self.store.selected_box()) {
            out.handles.extend(
                ResizeHandle::ALL
                    .iter()
                    .zip(corner_positions(&b.bounds, radius))
                    .map(|(handle, position)| HandleAnchor {
                        handle: *handle,
                        position: position.to_f32_array(),
                    }),
            );
        }
    }
}
