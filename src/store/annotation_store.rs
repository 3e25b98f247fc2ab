//! The box list of the open image and its sync with the service.

use std::collections::HashMap;

use sphere_geo::{GeoBounds, GeoCoordinate};
use thiserror::Error;

use super::save_status::{SaveStatus, SaveStatusTracker};
use crate::api::{
    AnnotationRecord, ApiError, RequestTicket, SyncBackend, SyncOutcome, SyncRequest, SyncResponse,
};
use crate::color_utils::{ColorPalette, is_valid_hex_color};
use crate::model::{BoundingBox, BoxId, ImageId, ServerId, SyncState, hit_test};

/// Errors from store operations the caller got wrong.
///
/// Network failures are not errors here; they show up in the save status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No image has been loaded
    #[error("No image loaded")]
    NoImage,

    /// The box is not in the store
    #[error("Unknown box: {0}")]
    UnknownBox(BoxId),
}

/// What `delete` did with a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Delete request sent; the box goes once the service confirms.
    Requested,
    /// The create is still in flight; the delete follows its acknowledgement.
    Deferred,
    /// The service never held the box; removed locally.
    Removed,
    /// A delete for this box is already under way.
    AlreadyPending,
}

/// What an in-flight request was for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum InFlight {
    Load(ImageId),
    Create(BoxId),
    Update(BoxId),
    Delete(BoxId),
}

/// Authoritative box list for the open image.
///
/// Creates and updates apply locally first and are then sent through the
/// backend; deletes wait for the service. Completions are applied by
/// [`Self::process_responses`], which the owner calls from its event loop.
pub struct AnnotationStore<B: SyncBackend> {
    backend: B,
    image_id: Option<ImageId>,
    boxes: Vec<BoundingBox>,
    selected: Option<BoxId>,
    next_box_id: u64,
    next_ticket: u64,
    in_flight: HashMap<RequestTicket, InFlight>,
    palette: ColorPalette,
    save_status: SaveStatusTracker,
}

impl<B: SyncBackend> AnnotationStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            image_id: None,
            boxes: Vec::new(),
            selected: None,
            next_box_id: 1,
            next_ticket: 1,
            in_flight: HashMap::new(),
            palette: ColorPalette::new(),
            save_status: SaveStatusTracker::new(),
        }
    }

    /// Use a preconfigured save status tracker.
    pub fn with_save_status(mut self, tracker: SaveStatusTracker) -> Self {
        self.save_status = tracker;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn image_id(&self) -> Option<ImageId> {
        self.image_id
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Replace the box list with the annotations of `image_id`.
    ///
    /// The list is emptied right away and filled when the list request
    /// completes. Completions of requests made for the previous image are
    /// dropped.
    pub fn load(&mut self, image_id: ImageId) {
        log::info!("Loading annotations for image {}", image_id);
        self.reset();
        self.image_id = Some(image_id);
        self.submit(InFlight::Load(image_id), SyncRequest::List { image_id });
    }

    /// Close the image: forget its boxes and stop accepting new ones.
    pub fn unload(&mut self) {
        if let Some(image_id) = self.image_id.take() {
            log::debug!("Unloading image {}", image_id);
        }
        self.reset();
    }

    /// Forget all boxes and in-flight requests.
    pub fn clear(&mut self) {
        log::debug!("Clearing {} boxes", self.boxes.len());
        self.reset();
    }

    fn reset(&mut self) {
        self.boxes.clear();
        self.selected = None;
        self.in_flight.clear();
        self.palette.reset();
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a box and send it to the service.
    ///
    /// The box is in the list when this returns; its server id arrives later.
    pub fn create(&mut self, bounds: GeoBounds) -> Result<BoundingBox, StoreError> {
        let image_id = self.image_id.ok_or(StoreError::NoImage)?;
        let id = BoxId(self.next_box_id);
        self.next_box_id += 1;

        let created = BoundingBox::new(id, bounds, self.palette.next_color());
        log::info!("Created box {} at {:?}", id, bounds);
        let payload = created.to_payload();
        self.boxes.push(created.clone());

        self.save_status.mark_saving();
        self.submit(InFlight::Create(id), SyncRequest::Create { image_id, payload });
        Ok(created)
    }

    /// Move a box to new bounds.
    pub fn update(&mut self, box_id: BoxId, bounds: GeoBounds) -> Result<(), StoreError> {
        self.edit(box_id, |b| b.bounds = bounds)
    }

    /// Change a box's label; its bounds are re-sent unchanged.
    pub fn update_label(&mut self, box_id: BoxId, label: impl Into<String>) -> Result<(), StoreError> {
        let label = label.into();
        self.edit(box_id, |b| b.label = label)
    }

    /// Apply a local edit and push it if the box has a server identity and is
    /// not being deleted.
    fn edit(&mut self, box_id: BoxId, apply: impl FnOnce(&mut BoundingBox)) -> Result<(), StoreError> {
        let b = self
            .boxes
            .iter_mut()
            .find(|b| b.id == box_id)
            .ok_or(StoreError::UnknownBox(box_id))?;
        apply(b);

        if b.deleting {
            // Sent if the delete fails
            log::debug!("Box {} is being deleted, holding edit", box_id);
            b.edited_while_pending = true;
            return Ok(());
        }

        match b.sync {
            SyncState::Synced { server_id } => {
                let payload = b.to_payload();
                self.save_status.mark_saving();
                self.submit(
                    InFlight::Update(box_id),
                    SyncRequest::Update {
                        annotation_id: server_id,
                        payload,
                    },
                );
            }
            SyncState::Pending => {
                // Sent once the create is acknowledged
                b.edited_while_pending = true;
            }
            SyncState::Failed { .. } => {
                log::debug!("Box {} is local only, edit not sent", box_id);
            }
        }
        Ok(())
    }

    /// Delete a box.
    ///
    /// Boxes the service holds stay listed until it confirms the delete,
    /// and remain if it fails.
    pub fn delete(&mut self, box_id: BoxId) -> Result<DeleteOutcome, StoreError> {
        let b = self
            .boxes
            .iter_mut()
            .find(|b| b.id == box_id)
            .ok_or(StoreError::UnknownBox(box_id))?;

        if b.is_delete_pending() {
            return Ok(DeleteOutcome::AlreadyPending);
        }

        match b.sync {
            SyncState::Synced { server_id } => {
                b.deleting = true;
                self.save_status.mark_saving();
                self.submit(
                    InFlight::Delete(box_id),
                    SyncRequest::Delete {
                        annotation_id: server_id,
                    },
                );
                Ok(DeleteOutcome::Requested)
            }
            SyncState::Pending => {
                log::debug!("Deferring delete of {} until its create completes", box_id);
                b.delete_after_create = true;
                Ok(DeleteOutcome::Deferred)
            }
            SyncState::Failed { .. } => {
                self.remove_local(box_id);
                Ok(DeleteOutcome::Removed)
            }
        }
    }

    fn remove_local(&mut self, box_id: BoxId) {
        self.boxes.retain(|b| b.id != box_id);
        if self.selected == Some(box_id) {
            self.selected = None;
        }
        log::info!("Removed box {}", box_id);
    }

    // ========================================================================
    // Selection and queries
    // ========================================================================

    /// Select a box, or clear the selection with `None`.
    ///
    /// Returns false (and leaves the selection alone) for unknown boxes.
    pub fn select(&mut self, box_id: Option<BoxId>) -> bool {
        match box_id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.selected = box_id;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<BoxId> {
        self.selected
    }

    pub fn selected_box(&self) -> Option<&BoundingBox> {
        self.selected.and_then(|id| self.get(id))
    }

    /// The first box containing `point`, in list order.
    pub fn box_at(&self, point: impl Into<GeoCoordinate>) -> Option<&BoundingBox> {
        hit_test(&self.boxes, point.into())
    }

    pub fn get(&self, box_id: BoxId) -> Option<&BoundingBox> {
        self.boxes.iter().find(|b| b.id == box_id)
    }

    pub fn find_by_server_id(&self, server_id: ServerId) -> Option<&BoundingBox> {
        self.boxes.iter().find(|b| b.server_id() == Some(server_id))
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundingBox> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    // ========================================================================
    // Save status
    // ========================================================================

    pub fn save_status(&self) -> SaveStatus {
        self.save_status.status()
    }

    pub fn save_status_tracker(&self) -> &SaveStatusTracker {
        &self.save_status
    }

    /// Let an expired save status revert to idle.
    pub fn tick(&mut self) {
        self.save_status.tick();
    }

    /// Number of requests still waiting for a completion.
    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    // ========================================================================
    // Completions
    // ========================================================================

    fn submit(&mut self, purpose: InFlight, request: SyncRequest) {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight.insert(ticket, purpose);
        self.backend.submit(ticket, request);
    }

    /// Apply every completion the backend has ready.
    ///
    /// Returns how many were applied.
    pub fn process_responses(&mut self) -> usize {
        let mut applied = 0;
        while let Some(response) = self.backend.take_one_result() {
            if self.apply_response(response) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_response(&mut self, response: SyncResponse) -> bool {
        let Some(purpose) = self.in_flight.remove(&response.ticket) else {
            log::debug!("Ignoring stale completion {:?}", response.ticket);
            return false;
        };

        match (purpose, response.outcome) {
            (InFlight::Load(image_id), SyncOutcome::Listed(result)) => self.on_listed(image_id, result),
            (InFlight::Create(box_id), SyncOutcome::Created(result)) => self.on_created(box_id, result),
            (InFlight::Update(box_id), SyncOutcome::Updated(result)) => {
                self.on_settled("update", box_id, result.map(|_| ()))
            }
            (InFlight::Delete(box_id), SyncOutcome::Deleted(result)) => self.on_deleted(box_id, result),
            (purpose, outcome) => {
                log::error!("Completion {:?} does not match request {:?}", outcome, purpose);
                return false;
            }
        }
        true
    }

    fn on_listed(&mut self, image_id: ImageId, result: Result<Vec<AnnotationRecord>, ApiError>) {
        match result {
            Ok(records) => {
                let mut loaded: Vec<BoundingBox> = records
                    .iter()
                    .map(|record| {
                        let id = BoxId(self.next_box_id);
                        self.next_box_id += 1;
                        let color = if is_valid_hex_color(&record.color) {
                            record.color.clone()
                        } else {
                            self.palette.next_color().to_string()
                        };
                        BoundingBox::from_record(id, record, color)
                    })
                    .collect();
                let count = loaded.len();

                // Boxes drawn while the list was in flight stay, after the loaded ones
                let drawn = std::mem::take(&mut self.boxes);
                loaded.extend(drawn.into_iter().filter(|b| {
                    b.server_id()
                        .is_none_or(|server_id| records.iter().all(|r| r.id != server_id))
                }));
                self.boxes = loaded;
                if self.selected.is_some_and(|id| self.get(id).is_none()) {
                    self.selected = None;
                }
                log::info!("Loaded {} annotations for image {}", count, image_id);
            }
            Err(e) => {
                // The list was emptied by `load`; only boxes drawn since remain
                log::warn!("Failed to load annotations for image {}: {}", image_id, e);
            }
        }
    }

    fn on_created(&mut self, box_id: BoxId, result: Result<AnnotationRecord, ApiError>) {
        let Some(index) = self.boxes.iter().position(|b| b.id == box_id) else {
            log::debug!("Create completed for {} which is no longer listed", box_id);
            return;
        };

        match result {
            Ok(record) => {
                let b = &mut self.boxes[index];
                b.sync = SyncState::Synced {
                    server_id: record.id,
                };
                log::info!("Box {} saved as annotation {}", box_id, record.id);
                self.save_status.mark_saved();

                if b.delete_after_create {
                    b.delete_after_create = false;
                    b.deleting = true;
                    self.save_status.mark_saving();
                    self.submit(
                        InFlight::Delete(box_id),
                        SyncRequest::Delete {
                            annotation_id: record.id,
                        },
                    );
                } else if b.edited_while_pending {
                    b.edited_while_pending = false;
                    let payload = b.to_payload();
                    self.save_status.mark_saving();
                    self.submit(
                        InFlight::Update(box_id),
                        SyncRequest::Update {
                            annotation_id: record.id,
                            payload,
                        },
                    );
                }
            }
            Err(e) => {
                log::warn!("Failed to save box {}: {}", box_id, e);
                self.save_status.mark_error();
                let b = &mut self.boxes[index];
                if b.delete_after_create {
                    self.remove_local(box_id);
                } else {
                    b.edited_while_pending = false;
                    b.sync = SyncState::Failed {
                        error: e.to_string(),
                    };
                }
            }
        }
    }

    fn on_deleted(&mut self, box_id: BoxId, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.remove_local(box_id);
                self.save_status.mark_saved();
            }
            Err(e) => {
                log::warn!("Failed to delete box {}: {}", box_id, e);
                self.save_status.mark_error();
                let Some(b) = self.boxes.iter_mut().find(|b| b.id == box_id) else {
                    return;
                };
                b.deleting = false;
                if !std::mem::take(&mut b.edited_while_pending) {
                    return;
                }
                if let Some(server_id) = b.server_id() {
                    let payload = b.to_payload();
                    self.save_status.mark_saving();
                    self.submit(
                        InFlight::Update(box_id),
                        SyncRequest::Update {
                            annotation_id: server_id,
                            payload,
                        },
                    );
                }
            }
        }
    }

    fn on_settled(&mut self, what: &str, box_id: BoxId, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                log::debug!("{} of {} saved", what, box_id);
                self.save_status.mark_saved();
            }
            Err(e) => {
                log::warn!("Failed to {} box {}: {}", what, box_id, e);
                self.save_status.mark_error();
            }
        }
    }
}
