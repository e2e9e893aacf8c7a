use tracing::{info, warn};

use crate::error::{ExtractError, TransportError};
use crate::types::{BoundingBox, OverpassResponse, RawElement};

use super::{CancelToken, FallbackPolicy, OverpassClient, Transport, synthesize_elements};

/// Where the elements of a retrieval came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataMode {
    Live { endpoint: String },
    /// Degraded mode: fabricated data standing in after every endpoint failed.
    Synthetic { seed: u64, cause: TransportError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutcome {
    pub elements: Vec<RawElement>,
    pub mode: DataMode,
}

impl RetrievalOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, DataMode::Synthetic { .. })
    }
}

impl<T: Transport> OverpassClient<T> {
    /// Sends `query` to each endpoint in priority order until one answers with
    /// parseable data. Waits the backoff interval between attempts; never runs two
    /// attempts at once.
    pub fn send_overpass_query(
        &self,
        query: &str,
        cancel: &CancelToken,
    ) -> Result<RetrievalOutcome, ExtractError> {
        if query.is_empty() {
            return Err(ExtractError::invalid("empty query"));
        }
        if self.endpoints.is_empty() {
            return Err(ExtractError::invalid("no endpoints configured"));
        }

        let mut last_error = None;
        for (attempt, endpoint) in self.endpoints.iter().enumerate() {
            if attempt > 0 && !cancel.wait(self.backoff) {
                return Err(ExtractError::Cancelled);
            }
            if cancel.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }

            info!("Querying {} (attempt {})", endpoint, attempt + 1);
            let posted = self.transport.post(endpoint, query);
            if cancel.is_cancelled() {
                info!("Discarding answer from {}, request was cancelled", endpoint);
                return Err(ExtractError::Cancelled);
            }
            let result = posted.and_then(|body| {
                OverpassResponse::from_json(&body)
                    .map_err(|e| TransportError::Decode(e.to_string()))
            });
            match result {
                Ok(response) => {
                    info!("Got {} elements from {}", response.elements.len(), endpoint);
                    return Ok(RetrievalOutcome {
                        elements: response.elements,
                        mode: DataMode::Live {
                            endpoint: endpoint.clone(),
                        },
                    });
                }
                Err(e) => {
                    warn!("Endpoint {} failed: {}", endpoint, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ExtractError::RetrievalFailure {
            attempts: self.endpoints.len(),
            last: last_error
                .unwrap_or_else(|| TransportError::Network("no attempt was made".to_string())),
        })
    }

    /// Like [`send_overpass_query`](Self::send_overpass_query), but when every
    /// endpoint fails and `fallback` opts in, fabricates data inside `bbox` and
    /// marks the outcome as degraded. Cancellation is never papered over.
    pub fn send_overpass_query_or_fallback(
        &self,
        query: &str,
        bbox: &BoundingBox,
        categories: &[String],
        fallback: FallbackPolicy,
        cancel: &CancelToken,
    ) -> Result<RetrievalOutcome, ExtractError> {
        match (self.send_overpass_query(query, cancel), fallback) {
            (Err(ExtractError::RetrievalFailure { last, .. }), FallbackPolicy::Synthetic { seed }) => {
                warn!("All endpoints failed ({}), substituting synthetic data", last);
                Ok(RetrievalOutcome {
                    elements: synthesize_elements(bbox, categories, seed),
                    mode: DataMode::Synthetic { seed, cause: last },
                })
            }
            (result, _) => result,
        }
    }
}
