use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError, bounded};
use tracing::info;

use crate::error::ExtractError;
use crate::types::BoundingBox;

use super::{
    CancelToken, FallbackPolicy, OverpassClient, RetrievalOutcome, Transport, normalize_categories,
};

/// Everything a background retrieval needs, captured by value.
#[derive(Debug, Clone)]
pub struct OverpassRequest {
    pub query: String,
    pub bbox: BoundingBox,
    pub categories: Vec<String>,
    pub fallback: FallbackPolicy,
}

/// The receiving end of a background retrieval.
pub struct OverpassReceiver {
    rx: Receiver<Result<RetrievalOutcome, ExtractError>>,
    cancel: CancelToken,
}

impl OverpassReceiver {
    /// Non-blocking poll, suited to a host's frame loop.
    pub fn try_recv(&self) -> Option<Result<RetrievalOutcome, ExtractError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExtractError::Cancelled)),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<RetrievalOutcome, ExtractError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(ExtractError::Cancelled)),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Runs a retrieval on its own thread. Attempts stay sequential inside that thread.
pub fn spawn_overpass_request<T>(
    client: OverpassClient<T>,
    request: OverpassRequest,
    cancel: CancelToken,
) -> OverpassReceiver
where
    T: Transport + Send + 'static,
{
    let (tx, rx) = bounded(1);
    let worker_cancel = cancel.clone();
    std::thread::spawn(move || {
        info!("Query: {}", request.query);
        let result = normalize_categories(&request.categories).and_then(|categories| {
            client.send_overpass_query_or_fallback(
                &request.query,
                &request.bbox,
                &categories,
                request.fallback,
                &worker_cancel,
            )
        });
        let _ = tx.send(result);
    });
    OverpassReceiver { rx, cancel }
}
