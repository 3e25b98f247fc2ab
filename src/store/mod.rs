//! Annotation storage for the open image.
//!
//! [`AnnotationStore`] owns the box list and the session save status; nothing
//! else mutates them.

mod annotation_store;
mod save_status;

pub use annotation_store::{AnnotationStore, DeleteOutcome, StoreError};
pub use save_status::{SaveStatus, SaveStatusTracker};

#[cfg(test)]
mod tests;
