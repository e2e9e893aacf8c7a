mod cancel;
pub(crate) mod client;
mod query;
mod synthetic;
mod transport;
pub(crate) mod worker;

use std::time::Duration;

pub use cancel::*;
pub use client::*;
pub use query::*;
pub use synthetic::*;
pub use transport::*;
pub use worker::*;

/// Public Overpass instances, tried in this order.
pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Queries a prioritized list of endpoints, one at a time.
#[derive(Clone)]
pub struct OverpassClient<T = UreqTransport> {
    endpoints: Vec<String>,
    backoff: Duration,
    pub transport: T,
}

impl Default for OverpassClient {
    fn default() -> Self {
        OverpassClient {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|url| url.to_string()).collect(),
            backoff: DEFAULT_BACKOFF,
            transport: UreqTransport::default(),
        }
    }
}

impl OverpassClient {
    /// A client over HTTP where each attempt is cut off after `timeout`.
    pub fn new(endpoints: Vec<String>, timeout: Duration, backoff: Duration) -> Self {
        OverpassClient {
            endpoints,
            backoff,
            transport: UreqTransport::new(timeout),
        }
    }
}

impl<T: Transport> OverpassClient<T> {
    pub fn with_transport(endpoints: Vec<String>, backoff: Duration, transport: T) -> Self {
        OverpassClient {
            endpoints,
            backoff,
            transport,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn set_endpoints(&mut self, endpoints: Vec<String>) {
        self.endpoints = endpoints;
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}
