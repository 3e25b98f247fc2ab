//! Bounding box annotations and their sync identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sphere_geo::{GeoBounds, GeoCoordinate};

use crate::api::{AnnotationPayload, AnnotationRecord};

/// Identifier the server assigns to an annotation.
pub type ServerId = i64;

/// Identifier of a panorama image on the server.
pub type ImageId = i64;

/// Session-local identity of a box.
///
/// Assigned when the box enters the store and never changes, including when
/// the server acknowledges a create. Selection and hover refer to boxes by
/// this id so they survive the server round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(pub u64);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

/// Where a box stands relative to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    /// Created locally, create request in flight.
    Pending,
    /// Known to the server under `server_id`.
    Synced { server_id: ServerId },
    /// The create request failed; the box exists only locally.
    Failed { error: String },
}

impl SyncState {
    pub fn server_id(&self) -> Option<ServerId> {
        match self {
            SyncState::Synced { server_id } => Some(*server_id),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SyncState::Pending)
    }
}

/// A labelled rectangle in azimuth/altitude space on one panorama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Stable local identity.
    pub id: BoxId,
    /// Remote identity and sync outcome.
    pub sync: SyncState,
    /// Corners; `min < max` componentwise.
    pub bounds: GeoBounds,
    /// Free-form label, empty when unlabelled.
    pub label: String,
    /// Display color as `#rrggbb`.
    pub color: String,
    pub created_at: DateTime<Utc>,
    /// Delete requested while the create was still in flight.
    #[serde(skip)]
    pub(crate) delete_after_create: bool,
    /// Local edits were held back while a create or delete was in flight.
    #[serde(skip)]
    pub(crate) edited_while_pending: bool,
    /// A delete request for this box is in flight.
    #[serde(skip)]
    pub(crate) deleting: bool,
}

impl BoundingBox {
    /// Create a new, not yet persisted box.
    pub fn new(id: BoxId, bounds: GeoBounds, color: impl Into<String>) -> Self {
        Self {
            id,
            sync: SyncState::Pending,
            bounds,
            label: String::new(),
            color: color.into(),
            created_at: Utc::now(),
            delete_after_create: false,
            edited_while_pending: false,
            deleting: false,
        }
    }

    /// Build a synced box from a server record.
    pub fn from_record(id: BoxId, record: &AnnotationRecord, color: impl Into<String>) -> Self {
        Self {
            id,
            sync: SyncState::Synced {
                server_id: record.id,
            },
            bounds: record.bounds(),
            label: record.label.clone().unwrap_or_default(),
            color: color.into(),
            created_at: record.created_at,
            delete_after_create: false,
            edited_while_pending: false,
            deleting: false,
        }
    }

    /// Server id once the create has been acknowledged.
    pub fn server_id(&self) -> Option<ServerId> {
        self.sync.server_id()
    }

    /// Identifier shown to users: the server id when known, else `local-N`.
    pub fn display_id(&self) -> String {
        match self.server_id() {
            Some(server_id) => server_id.to_string(),
            None => self.id.to_string(),
        }
    }

    pub fn min(&self) -> GeoCoordinate {
        self.bounds.min
    }

    pub fn max(&self) -> GeoCoordinate {
        self.bounds.max
    }

    /// Whether a delete is waiting on the create acknowledgement.
    pub fn is_delete_pending(&self) -> bool {
        self.delete_after_create || self.deleting
    }

    /// Request body carrying this box's current state.
    pub fn to_payload(&self) -> AnnotationPayload {
        AnnotationPayload::new(&self.label, &self.bounds, &self.color)
    }
}

/// Find the first box containing `point`.
///
/// Boxes are scanned in list order and the first match wins. Overlapping boxes
/// are therefore resolved by insertion order, not by area or recency.
pub fn hit_test(boxes: &[BoundingBox], point: GeoCoordinate) -> Option<&BoundingBox> {
    boxes.iter().find(|b| b.bounds.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box(id: u64, az_min: f64, alt_min: f64, az_max: f64, alt_max: f64) -> BoundingBox {
        BoundingBox::new(
            BoxId(id),
            GeoBounds::from_edges(az_min, alt_min, az_max, alt_max),
            "#ff0000",
        )
    }

    #[test]
    fn test_new_box_is_pending() {
        let b = sample_box(3, 30.0, 10.0, 45.0, 20.0);
        assert!(b.sync.is_pending());
        assert_eq!(b.server_id(), None);
        assert_eq!(b.display_id(), "local-3");
        assert!(b.label.is_empty());
    }

    #[test]
    fn test_display_id_after_sync() {
        let mut b = sample_box(3, 30.0, 10.0, 45.0, 20.0);
        b.sync = SyncState::Synced { server_id: 42 };
        assert_eq!(b.display_id(), "42");
        assert_eq!(b.id, BoxId(3));
    }

    #[test]
    fn test_hit_test_first_match_wins() {
        let boxes = vec![
            sample_box(1, 0.0, 0.0, 50.0, 50.0),
            sample_box(2, 10.0, 10.0, 20.0, 20.0),
        ];
        // Inside both; the earlier box wins even though the later one is smaller
        let hit = hit_test(&boxes, GeoCoordinate::new(15.0, 15.0)).unwrap();
        assert_eq!(hit.id, BoxId(1));

        assert!(hit_test(&boxes, GeoCoordinate::new(100.0, 0.0)).is_none());
    }

    #[test]
    fn test_from_record() {
        let record = AnnotationRecord {
            id: 7,
            image_id: 1,
            label: None,
            az_min: 10.0,
            alt_min: -5.0,
            az_max: 20.0,
            alt_max: 5.0,
            color: "#0000ff".to_string(),
            created_at: Utc::now(),
        };
        let b = BoundingBox::from_record(BoxId(0), &record, record.color.clone());
        assert_eq!(b.server_id(), Some(7));
        assert_eq!(b.label, "");
        assert_eq!(b.bounds, GeoBounds::from_edges(10.0, -5.0, 20.0, 5.0));
    }

    #[test]
    fn test_serialize_skips_internal_flags() {
        let b = sample_box(1, 30.0, 10.0, 45.0, 20.0);
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"state\":\"pending\""));
        assert!(!json.contains("delete_after_create"));
    }
}
