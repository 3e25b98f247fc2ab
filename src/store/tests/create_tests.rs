//! Tests for optimistic creation.

use super::{ack_last_create, bounds, loaded_store, ManualBackend};
use crate::api::{ApiError, InMemoryApi, InlineBackend, SyncOutcome, SyncRequest};
use crate::color_utils::BOX_PALETTE;
use crate::model::SyncState;
use crate::store::{AnnotationStore, SaveStatus, StoreError};

#[test]
fn test_create_is_visible_before_response() {
    let mut store = loaded_store();
    let created = store.create(bounds()).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(created.id).unwrap().bounds, bounds());
    assert!(created.sync.is_pending());
    assert_eq!(store.save_status(), SaveStatus::Saving);
    assert_eq!(store.backend().count("create"), 1);
}

#[test]
fn test_create_ack_sets_server_identity_on_same_box() {
    let mut store = loaded_store();
    let created = store.create(bounds()).unwrap();
    store.select(Some(created.id));

    ack_last_create(&mut store, 42);

    let b = store.get(created.id).unwrap();
    assert_eq!(b.sync, SyncState::Synced { server_id: 42 });
    assert_eq!(b.display_id(), "42");
    assert_eq!(store.find_by_server_id(42).unwrap().id, created.id);
    // Selection survives the acknowledgement
    assert_eq!(store.selected(), Some(created.id));
    assert_eq!(store.save_status(), SaveStatus::Saved);
}

#[test]
fn test_create_failure_keeps_box() {
    let mut store = loaded_store();
    let created = store.create(bounds()).unwrap();
    let (ticket, _) = store.backend().last();
    store
        .backend_mut()
        .respond(ticket, SyncOutcome::Created(Err(ApiError::transport("down"))));
    store.process_responses();

    let b = store.get(created.id).unwrap();
    assert!(matches!(b.sync, SyncState::Failed { .. }));
    assert_eq!(b.server_id(), None);
    assert_eq!(store.save_status(), SaveStatus::Error);
    // No retry
    assert_eq!(store.backend().count("create"), 1);
}

#[test]
fn test_create_requires_image() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    assert_eq!(store.create(bounds()), Err(StoreError::NoImage));
    assert!(store.is_empty());
}

#[test]
fn test_colors_cycle_through_palette() {
    let mut store = loaded_store();
    let colors: Vec<String> = (0..BOX_PALETTE.len() + 1)
        .map(|_| store.create(bounds()).unwrap().color)
        .collect();
    assert_eq!(colors[0], BOX_PALETTE[0]);
    assert_eq!(colors[1], BOX_PALETTE[1]);
    assert_eq!(colors[BOX_PALETTE.len()], BOX_PALETTE[0]);

    // The color is part of the request
    let (_, request) = store.backend().last();
    let SyncRequest::Create { payload, .. } = request else {
        panic!("expected create");
    };
    assert_eq!(payload.color, BOX_PALETTE[0]);
}

#[test]
fn test_box_ids_are_unique() {
    let mut store = loaded_store();
    let a = store.create(bounds()).unwrap();
    let b = store.create(bounds()).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_create_round_trip_through_inline_backend() {
    let mut store = AnnotationStore::new(InlineBackend::new(InMemoryApi::new()));
    store.load(7);
    store.process_responses();

    let created = store.create(bounds()).unwrap();
    assert!(store.get(created.id).unwrap().sync.is_pending());

    assert_eq!(store.process_responses(), 1);
    let server_id = store.get(created.id).unwrap().server_id().unwrap();
    let stored = store.backend().api().get(server_id).unwrap();
    assert_eq!(stored.image_id, 7);
    assert_eq!(stored.bounds(), bounds());
}
