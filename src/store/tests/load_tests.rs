//! Tests for loading, selection and hit testing.

use sphere_geo::{GeoBounds, GeoCoordinate};

use super::{ack_last_create, bounds, loaded_store, record, ManualBackend};
use crate::api::{ApiError, InMemoryApi, InlineBackend, SyncOutcome};
use crate::color_utils::BOX_PALETTE;
use crate::model::{BoxId, SyncState};
use crate::store::{AnnotationStore, SaveStatus};

#[test]
fn test_load_maps_records() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    assert!(store.is_empty());

    let mut with_label = record(7, 1, &bounds());
    with_label.label = Some("tree".to_string());
    let (ticket, _) = store.backend().last();
    store
        .backend_mut()
        .respond(ticket, SyncOutcome::Listed(Ok(vec![with_label, record(8, 1, &bounds())])));
    store.process_responses();

    assert_eq!(store.len(), 2);
    let first = store.find_by_server_id(7).unwrap();
    assert_eq!(first.sync, SyncState::Synced { server_id: 7 });
    assert_eq!(first.label, "tree");
    assert_eq!(first.bounds, bounds());
    assert_eq!(store.find_by_server_id(8).unwrap().label, "");
    // Loading is not a save
    assert_eq!(store.save_status(), SaveStatus::Idle);
}

#[test]
fn test_load_failure_leaves_empty_list() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let (ticket, _) = store.backend().last();
    store
        .backend_mut()
        .respond(ticket, SyncOutcome::Listed(Err(ApiError::ImageNotFound { id: 1 })));
    store.process_responses();

    assert!(store.is_empty());
    assert_eq!(store.image_id(), Some(1));
}

#[test]
fn test_invalid_record_color_gets_palette_color() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let mut blank = record(1, 1, &bounds());
    blank.color = String::new();
    let mut named = record(2, 1, &bounds());
    named.color = "#123abc".to_string();

    let (ticket, _) = store.backend().last();
    store
        .backend_mut()
        .respond(ticket, SyncOutcome::Listed(Ok(vec![blank, named])));
    store.process_responses();

    assert_eq!(store.find_by_server_id(1).unwrap().color, BOX_PALETTE[0]);
    assert_eq!(store.find_by_server_id(2).unwrap().color, "#123abc");
}

#[test]
fn test_stale_load_is_ignored() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let (old_ticket, _) = store.backend().last();
    store.load(2);
    let (new_ticket, _) = store.backend().last();

    store
        .backend_mut()
        .respond(new_ticket, SyncOutcome::Listed(Ok(vec![record(20, 2, &bounds())])));
    store
        .backend_mut()
        .respond(old_ticket, SyncOutcome::Listed(Ok(vec![record(10, 1, &bounds())])));
    assert_eq!(store.process_responses(), 1);

    assert_eq!(store.len(), 1);
    assert!(store.find_by_server_id(20).is_some());
    assert!(store.find_by_server_id(10).is_none());
}

#[test]
fn test_create_ack_for_previous_image_is_ignored() {
    let mut store = loaded_store();
    store.create(bounds()).unwrap();
    let (create_ticket, request) = store.backend().last();
    store.load(2);

    let crate::api::SyncRequest::Create { payload, .. } = request else {
        panic!("expected create");
    };
    store.backend_mut().respond(
        create_ticket,
        SyncOutcome::Created(Ok(payload.into_record(4, 1, chrono::Utc::now()))),
    );
    store.process_responses();
    assert!(store.is_empty());
}

#[test]
fn test_select_and_clear() {
    let mut store = loaded_store();
    let created = store.create(bounds()).unwrap();

    assert!(store.select(Some(created.id)));
    assert_eq!(store.selected_box().unwrap().id, created.id);
    assert!(!store.select(Some(BoxId(999))));
    assert_eq!(store.selected(), Some(created.id));
    assert!(store.select(None));
    assert_eq!(store.selected(), None);

    store.select(Some(created.id));
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.selected(), None);
}

#[test]
fn test_box_at_first_match_wins() {
    let mut store = loaded_store();
    let big = store.create(GeoBounds::from_edges(0.0, 0.0, 50.0, 50.0)).unwrap();
    store.create(GeoBounds::from_edges(10.0, 10.0, 20.0, 20.0)).unwrap();

    assert_eq!(store.box_at(GeoCoordinate::new(15.0, 15.0)).unwrap().id, big.id);
    assert!(store.box_at(GeoCoordinate::new(200.0, 0.0)).is_none());
}

#[test]
fn test_reload_from_service() {
    let mut store = AnnotationStore::new(InlineBackend::new(InMemoryApi::new()));
    store.load(3);
    store.process_responses();
    let created = store.create(bounds()).unwrap();
    store.update_label(created.id, "sign").unwrap();
    store.process_responses();

    store.load(3);
    store.process_responses();
    assert_eq!(store.len(), 1);
    assert_eq!(store.boxes()[0].label, "sign");
    assert!(store.boxes()[0].server_id().is_some());
}

#[test]
fn test_box_drawn_before_list_arrives_is_kept() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let (list_ticket, _) = store.backend().last();
    let created = store.create(bounds()).unwrap();
    store.select(Some(created.id));

    let listed = GeoBounds::from_edges(200.0, -20.0, 230.0, 0.0);
    store
        .backend_mut()
        .respond(list_ticket, SyncOutcome::Listed(Ok(vec![record(7, 1, &listed)])));
    store.process_responses();

    assert_eq!(store.len(), 2);
    assert_eq!(store.boxes()[0].server_id(), Some(7));
    assert_eq!(store.boxes()[1].id, created.id);
    assert_eq!(store.selected(), Some(created.id));

    ack_last_create(&mut store, 42);
    let b = store.get(created.id).unwrap();
    assert_eq!(b.sync, SyncState::Synced { server_id: 42 });
    assert_eq!(b.bounds, bounds());
}

#[test]
fn test_failed_list_keeps_box_drawn_meanwhile() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let (list_ticket, _) = store.backend().last();
    let created = store.create(bounds()).unwrap();

    store
        .backend_mut()
        .respond(list_ticket, SyncOutcome::Listed(Err(ApiError::transport("down"))));
    store.process_responses();

    assert_eq!(store.len(), 1);
    ack_last_create(&mut store, 3);
    assert_eq!(store.get(created.id).unwrap().server_id(), Some(3));
}

#[test]
fn test_listed_copy_of_acknowledged_box_is_not_duplicated() {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let (list_ticket, _) = store.backend().last();
    let created = store.create(bounds()).unwrap();
    ack_last_create(&mut store, 42);

    // The service ran the create before the list
    store
        .backend_mut()
        .respond(list_ticket, SyncOutcome::Listed(Ok(vec![record(42, 1, &bounds())])));
    store.process_responses();

    assert_eq!(store.len(), 1);
    assert_eq!(store.find_by_server_id(42).unwrap().server_id(), Some(42));
    assert!(store.get(created.id).is_none());
}
