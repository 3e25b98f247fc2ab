//! In-process annotation service.
//!
//! Behaves like the remote service (server-assigned ids, not-found errors)
//! and can be told to fail, which makes it the backend of choice for tests
//! and offline replay.

use std::collections::BTreeMap;

use chrono::Utc;

use super::{AnnotationApi, AnnotationPayload, AnnotationRecord, ApiError};
use crate::model::{ImageId, ServerId};

/// Annotation service kept in memory.
#[derive(Debug, Clone)]
pub struct InMemoryApi {
    records: BTreeMap<ServerId, AnnotationRecord>,
    next_id: ServerId,
    /// Number of upcoming calls that fail with a transport error.
    fail_next: u32,
    /// Every call fails while offline.
    offline: bool,
    calls: usize,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            fail_next: 0,
            offline: false,
            calls: 0,
        }
    }

    /// Seed an existing record, keeping its id.
    pub fn with_record(mut self, record: AnnotationRecord) -> Self {
        self.next_id = self.next_id.max(record.id + 1);
        self.records.insert(record.id, record);
        self
    }

    /// Make the next `count` calls fail.
    pub fn fail_next(&mut self, count: u32) {
        self.fail_next = count;
    }

    /// Make every call fail until switched back.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn get(&self, id: ServerId) -> Option<&AnnotationRecord> {
        self.records.get(&id)
    }

    /// Number of stored records across all images.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of calls received, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls
    }

    /// Count the call and decide whether it fails.
    fn check_available(&mut self) -> Result<(), ApiError> {
        self.calls += 1;
        if self.offline {
            return Err(ApiError::transport("service offline"));
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(ApiError::transport("injected failure"));
        }
        Ok(())
    }
}

impl Default for InMemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationApi for InMemoryApi {
    fn list_annotations(&mut self, image_id: ImageId) -> Result<Vec<AnnotationRecord>, ApiError> {
        self.check_available()?;
        Ok(self
            .records
            .values()
            .filter(|r| r.image_id == image_id)
            .cloned()
            .collect())
    }

    fn create_annotation(
        &mut self,
        image_id: ImageId,
        payload: &AnnotationPayload,
    ) -> Result<AnnotationRecord, ApiError> {
        self.check_available()?;
        let id = self.next_id;
        self.next_id += 1;
        let record = payload.clone().into_record(id, image_id, Utc::now());
        self.records.insert(id, record.clone());
        Ok(record)
    }

    fn update_annotation(
        &mut self,
        annotation_id: ServerId,
        payload: &AnnotationPayload,
    ) -> Result<AnnotationRecord, ApiError> {
        self.check_available()?;
        let existing = self
            .records
            .get_mut(&annotation_id)
            .ok_or(ApiError::AnnotationNotFound { id: annotation_id })?;
        let updated = payload
            .clone()
            .into_record(annotation_id, existing.image_id, existing.created_at);
        *existing = updated.clone();
        Ok(updated)
    }

    fn delete_annotation(&mut self, annotation_id: ServerId) -> Result<(), ApiError> {
        self.check_available()?;
        self.records
            .remove(&annotation_id)
            .map(|_| ())
            .ok_or(ApiError::AnnotationNotFound { id: annotation_id })
    }
}
