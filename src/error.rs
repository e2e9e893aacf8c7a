use thiserror::Error;

/// Failures surfaced to the caller of any core operation.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("all {attempts} endpoint attempt(s) failed, last error: {last}")]
    RetrievalFailure { attempts: usize, last: TransportError },
    #[error("retrieval was cancelled")]
    Cancelled,
    #[error("export failed: {0}")]
    ExportFailure(String),
    #[error("could not parse data: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExtractError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ExtractError::InvalidInput(msg.into())
    }
}

/// A single failed request against one endpoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("endpoint answered with status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("response could not be decoded: {0}")]
    Decode(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => TransportError::Status(code),
            ureq::Error::Timeout(_) => TransportError::Timeout,
            other => TransportError::Network(other.to_string()),
        }
    }
}

/// Why a tagged element did not become a feature.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("way resolved to {resolved} coordinate(s), at least 2 are needed")]
    Unresolved { resolved: usize },
    #[error("geometry has no representative point")]
    Degenerate,
    #[error("geometry contains a non-finite coordinate")]
    NonFinite,
    #[error("relations are not materialized into geometry")]
    Relation,
}

/// Elements that carried tags but were dropped while processing. Never fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialDataLoss {
    pub dropped: Vec<(i64, ElementError)>,
}

impl PartialDataLoss {
    pub fn record(&mut self, id: i64, reason: ElementError) {
        tracing::debug!("dropping element {}: {}", id, reason);
        self.dropped.push((id, reason));
    }

    pub fn len(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_failure_mentions_last_cause() {
        let err = ExtractError::RetrievalFailure {
            attempts: 3,
            last: TransportError::Status(504),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 endpoint"));
        assert!(msg.contains("504"));
    }

    #[test]
    fn partial_loss_counts_records() {
        let mut loss = PartialDataLoss::default();
        assert!(loss.is_empty());
        loss.record(7, ElementError::Relation);
        loss.record(8, ElementError::Unresolved { resolved: 1 });
        assert_eq!(loss.len(), 2);
        assert_eq!(loss.dropped[1].0, 8);
    }
}
