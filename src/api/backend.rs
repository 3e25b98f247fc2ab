//! Request/completion plumbing between the store and the service.

use std::collections::VecDeque;

use super::{AnnotationApi, AnnotationPayload, AnnotationRecord, ApiError};
use crate::model::{ImageId, ServerId};

/// Correlates a request with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(pub u64);

/// A call to make against the service.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    List {
        image_id: ImageId,
    },
    Create {
        image_id: ImageId,
        payload: AnnotationPayload,
    },
    Update {
        annotation_id: ServerId,
        payload: AnnotationPayload,
    },
    Delete {
        annotation_id: ServerId,
    },
}

impl SyncRequest {
    /// Short name for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncRequest::List { .. } => "list",
            SyncRequest::Create { .. } => "create",
            SyncRequest::Update { .. } => "update",
            SyncRequest::Delete { .. } => "delete",
        }
    }
}

/// Result of one service call.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Listed(Result<Vec<AnnotationRecord>, ApiError>),
    Created(Result<AnnotationRecord, ApiError>),
    Updated(Result<AnnotationRecord, ApiError>),
    Deleted(Result<(), ApiError>),
}

impl SyncOutcome {
    /// The error, if the call failed.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            SyncOutcome::Listed(r) => r.as_ref().err(),
            SyncOutcome::Created(r) | SyncOutcome::Updated(r) => r.as_ref().err(),
            SyncOutcome::Deleted(r) => r.as_ref().err(),
        }
    }

    /// The outcome a request gets when it never reached the service.
    pub fn failed(request: &SyncRequest, error: ApiError) -> Self {
        match request {
            SyncRequest::List { .. } => SyncOutcome::Listed(Err(error)),
            SyncRequest::Create { .. } => SyncOutcome::Created(Err(error)),
            SyncRequest::Update { .. } => SyncOutcome::Updated(Err(error)),
            SyncRequest::Delete { .. } => SyncOutcome::Deleted(Err(error)),
        }
    }
}

/// A completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResponse {
    pub ticket: RequestTicket,
    pub outcome: SyncOutcome,
}

/// Run one request against an API.
pub fn execute<A: AnnotationApi + ?Sized>(api: &mut A, request: SyncRequest) -> SyncOutcome {
    match request {
        SyncRequest::List { image_id } => SyncOutcome::Listed(api.list_annotations(image_id)),
        SyncRequest::Create { image_id, payload } => {
            SyncOutcome::Created(api.create_annotation(image_id, &payload))
        }
        SyncRequest::Update {
            annotation_id,
            payload,
        } => SyncOutcome::Updated(api.update_annotation(annotation_id, &payload)),
        SyncRequest::Delete { annotation_id } => {
            SyncOutcome::Deleted(api.delete_annotation(annotation_id))
        }
    }
}

/// Carries requests to the service and hands back completions.
///
/// `submit` never blocks on the service. Completions are collected with
/// `take_one_result` from the owner's event loop, in the order they landed.
pub trait SyncBackend {
    /// Queue a request.
    fn submit(&mut self, ticket: RequestTicket, request: SyncRequest);

    /// Take the oldest completion, if any. Non-blocking.
    fn take_one_result(&mut self) -> Option<SyncResponse>;

    /// Number of submitted requests whose completion has not been taken yet.
    fn pending_count(&self) -> usize;
}

/// Runs each request on submit and holds its completion until taken.
///
/// Single-threaded and deterministic: the service sees requests in submit
/// order, while the store still observes every completion asynchronously.
#[derive(Debug)]
pub struct InlineBackend<A> {
    api: A,
    completed: VecDeque<SyncResponse>,
}

impl<A: AnnotationApi> InlineBackend<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            completed: VecDeque::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }
}

impl<A: AnnotationApi> SyncBackend for InlineBackend<A> {
    fn submit(&mut self, ticket: RequestTicket, request: SyncRequest) {
        log::debug!("Running {} request {:?}", request.kind(), ticket);
        let outcome = execute(&mut self.api, request);
        self.completed.push_back(SyncResponse { ticket, outcome });
    }

    fn take_one_result(&mut self) -> Option<SyncResponse> {
        self.completed.pop_front()
    }

    fn pending_count(&self) -> usize {
        self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;
    use sphere_geo::GeoBounds;

    fn payload() -> AnnotationPayload {
        AnnotationPayload::new("car", &GeoBounds::from_edges(30.0, 10.0, 45.0, 20.0), "#ff0000")
    }

    #[test]
    fn test_inline_backend_defers_completion() {
        let mut backend = InlineBackend::new(InMemoryApi::new());
        backend.submit(
            RequestTicket(1),
            SyncRequest::Create {
                image_id: 1,
                payload: payload(),
            },
        );

        // The service already has the record, the caller has not seen it yet
        assert_eq!(backend.api().len(), 1);
        assert_eq!(backend.pending_count(), 1);

        let response = backend.take_one_result().unwrap();
        assert_eq!(response.ticket, RequestTicket(1));
        assert!(matches!(response.outcome, SyncOutcome::Created(Ok(_))));
        assert!(backend.take_one_result().is_none());
    }

    #[test]
    fn test_completions_in_submit_order() {
        let mut backend = InlineBackend::new(InMemoryApi::new());
        backend.submit(RequestTicket(1), SyncRequest::List { image_id: 1 });
        backend.submit(RequestTicket(2), SyncRequest::Delete { annotation_id: 99 });

        assert_eq!(backend.take_one_result().unwrap().ticket, RequestTicket(1));
        let second = backend.take_one_result().unwrap();
        assert_eq!(second.ticket, RequestTicket(2));
        assert_eq!(
            second.outcome.error(),
            Some(&ApiError::AnnotationNotFound { id: 99 })
        );
    }

    #[test]
    fn test_failed_outcome_matches_request_kind() {
        let request = SyncRequest::Update {
            annotation_id: 1,
            payload: payload(),
        };
        let outcome = SyncOutcome::failed(&request, ApiError::Disconnected);
        assert!(matches!(outcome, SyncOutcome::Updated(Err(ApiError::Disconnected))));
        assert_eq!(request.kind(), "update");
    }
}
