//! Background thread that talks to the annotation service.
//!
//! The owning thread submits requests and later drains completions with
//! `take_one_result`, so the event loop never waits on the network.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use super::backend::{RequestTicket, SyncBackend, SyncOutcome, SyncRequest, SyncResponse, execute};
use super::{AnnotationApi, ApiError};

/// Message sent to the worker thread.
enum ThreadMessage {
    /// Run a request
    Run(RequestTicket, SyncRequest),
    /// Shutdown the thread
    Shutdown,
}

/// Runs service calls on a dedicated thread.
///
/// Requests are executed one at a time in submit order.
pub struct SyncWorker {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for completions from the background thread
    result_rx: Receiver<SyncResponse>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Tickets submitted but not yet taken
    pending: HashSet<RequestTicket>,
    /// Completions synthesized for requests that could not be sent
    undelivered: Vec<SyncResponse>,
}

impl SyncWorker {
    /// Spawn a worker thread that owns `api`.
    pub fn spawn<A>(api: A) -> Result<Self, ApiError>
    where
        A: AnnotationApi + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<SyncResponse>();

        let thread_handle = thread::Builder::new()
            .name("annotation-sync".to_string())
            .spawn(move || {
                log::info!("Annotation sync thread started");
                Self::thread_loop(api, request_rx, result_tx);
                log::info!("Annotation sync thread exiting");
            })
            .map_err(|e| ApiError::transport(format!("Failed to spawn sync thread: {}", e)))?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending: HashSet::new(),
            undelivered: Vec::new(),
        })
    }

    /// Background thread main loop.
    fn thread_loop<A: AnnotationApi>(
        mut api: A,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<SyncResponse>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Run(ticket, request)) => {
                    log::debug!("Running {} request {:?}", request.kind(), ticket);
                    let outcome = execute(&mut api, request);
                    if result_tx.send(SyncResponse { ticket, outcome }).is_err() {
                        log::warn!("Result channel closed, sync thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, sync thread exiting");
                    break;
                }
            }
        }
    }
}

impl SyncBackend for SyncWorker {
    fn submit(&mut self, ticket: RequestTicket, request: SyncRequest) {
        self.pending.insert(ticket);
        let fallback = SyncOutcome::failed(&request, ApiError::Disconnected);
        if self
            .request_tx
            .send(ThreadMessage::Run(ticket, request))
            .is_err()
        {
            log::error!("Failed to send sync request {:?}: channel closed", ticket);
            self.undelivered.push(SyncResponse {
                ticket,
                outcome: fallback,
            });
        }
    }

    fn take_one_result(&mut self) -> Option<SyncResponse> {
        if !self.undelivered.is_empty() {
            let response = self.undelivered.remove(0);
            self.pending.remove(&response.ticket);
            return Some(response);
        }

        match self.result_rx.try_recv() {
            Ok(response) => {
                self.pending.remove(&response.ticket);
                Some(response)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Sync thread disconnected");
                None
            }
        }
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        log::debug!("Shutting down annotation sync thread");

        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Sync thread panicked: {:?}", e);
            }
        }
    }
}
