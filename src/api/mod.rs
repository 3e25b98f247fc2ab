//! The remote annotation service and the channels used to reach it.
//!
//! [`AnnotationApi`] is the narrow CRUD contract of the service. The store
//! never calls it directly; requests go through a [`SyncBackend`], which
//! returns completions later so the caller is never blocked on I/O.

mod backend;
mod error;
#[cfg(feature = "http")]
mod http;
mod memory;
mod types;
mod worker;

pub use backend::{InlineBackend, RequestTicket, SyncBackend, SyncOutcome, SyncRequest, SyncResponse, execute};
pub use error::ApiError;
#[cfg(feature = "http")]
pub use http::HttpApi;
pub use memory::InMemoryApi;
pub use types::{AnnotationPayload, AnnotationRecord};
pub use worker::SyncWorker;

use crate::model::{ImageId, ServerId};

/// CRUD contract of the annotation service.
///
/// Calls are blocking; backends decide where they run.
pub trait AnnotationApi {
    /// All annotations of an image.
    fn list_annotations(&mut self, image_id: ImageId) -> Result<Vec<AnnotationRecord>, ApiError>;

    /// Store a new annotation; the service assigns its id.
    fn create_annotation(
        &mut self,
        image_id: ImageId,
        payload: &AnnotationPayload,
    ) -> Result<AnnotationRecord, ApiError>;

    /// Replace label, bounds and color of an annotation.
    fn update_annotation(
        &mut self,
        annotation_id: ServerId,
        payload: &AnnotationPayload,
    ) -> Result<AnnotationRecord, ApiError>;

    fn delete_annotation(&mut self, annotation_id: ServerId) -> Result<(), ApiError>;
}
