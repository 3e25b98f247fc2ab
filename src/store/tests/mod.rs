//! Scenario tests for the annotation store.
//!
//! Most tests drive the store through [`ManualBackend`], which holds every
//! request until the test completes it, so the interleaving of local edits
//! and service responses is explicit.

mod create_tests;
mod load_tests;

use std::collections::VecDeque;

use chrono::Utc;
use sphere_geo::GeoBounds;

use crate::api::{
    AnnotationPayload, AnnotationRecord, RequestTicket, SyncBackend, SyncOutcome, SyncRequest,
    SyncResponse,
};
use crate::model::{ImageId, ServerId};
use crate::store::AnnotationStore;

/// Backend that completes requests only when told to.
#[derive(Debug, Default)]
pub(super) struct ManualBackend {
    pub submitted: Vec<(RequestTicket, SyncRequest)>,
    ready: VecDeque<SyncResponse>,
    outstanding: usize,
}

impl ManualBackend {
    /// Ticket and request of the most recent submit.
    pub fn last(&self) -> (RequestTicket, SyncRequest) {
        self.submitted.last().cloned().expect("nothing submitted")
    }

    /// Number of submitted requests of a kind ("list", "create", ...).
    pub fn count(&self, kind: &str) -> usize {
        self.submitted.iter().filter(|(_, r)| r.kind() == kind).count()
    }

    /// Make a completion available to the store.
    pub fn respond(&mut self, ticket: RequestTicket, outcome: SyncOutcome) {
        self.ready.push_back(SyncResponse { ticket, outcome });
    }
}

impl SyncBackend for ManualBackend {
    fn submit(&mut self, ticket: RequestTicket, request: SyncRequest) {
        self.outstanding += 1;
        self.submitted.push((ticket, request));
    }

    fn take_one_result(&mut self) -> Option<SyncResponse> {
        let response = self.ready.pop_front()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(response)
    }

    fn pending_count(&self) -> usize {
        self.outstanding
    }
}

pub(super) fn bounds() -> GeoBounds {
    GeoBounds::from_edges(30.0, 10.0, 45.0, 20.0)
}

pub(super) fn record(id: ServerId, image_id: ImageId, bounds: &GeoBounds) -> AnnotationRecord {
    AnnotationPayload::new("", bounds, "#ff0000").into_record(id, image_id, Utc::now())
}

/// A store with image 1 loaded and empty.
pub(super) fn loaded_store() -> AnnotationStore<ManualBackend> {
    let mut store = AnnotationStore::new(ManualBackend::default());
    store.load(1);
    let (ticket, _) = store.backend().last();
    store
        .backend_mut()
        .respond(ticket, SyncOutcome::Listed(Ok(Vec::new())));
    store.process_responses();
    store
}

/// Acknowledge the most recent create with `server_id`.
pub(super) fn ack_last_create(store: &mut AnnotationStore<ManualBackend>, server_id: ServerId) {
    let (ticket, request) = store.backend().last();
    let SyncRequest::Create { image_id, payload } = request else {
        panic!("last request was not a create: {:?}", request);
    };
    let record = payload.into_record(server_id, image_id, Utc::now());
    store
        .backend_mut()
        .respond(ticket, SyncOutcome::Created(Ok(record)));
    store.process_responses();
}
