use std::time::Duration;

use ureq::Agent;

use crate::error::TransportError;

/// One POST against one endpoint. The seam between retrieval policy and HTTP.
pub trait Transport {
    fn post(&self, url: &str, body: &str) -> Result<String, TransportError>;
}

/// Blocking HTTP transport. Every request is bounded by the agent's global timeout,
/// which aborts the request and releases the connection when it fires.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();
        UreqTransport { agent }
    }
}

impl Transport for UreqTransport {
    fn post(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let mut response = self.agent.post(url).send(body)?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(TransportError::Status(status));
        }
        Ok(response.body_mut().read_to_string()?)
    }
}
