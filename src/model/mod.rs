//! Data models for SphereMark.

mod annotation;

pub use annotation::{BoundingBox, BoxId, ImageId, ServerId, SyncState, hit_test};
