use std::sync::Mutex;
use std::time::Duration;

use map_extract::error::TransportError;
use map_extract::export::{ExportFormat, export};
use map_extract::overpass::{
    CancelToken, DataMode, OverpassClient, OverpassRequest, Transport, spawn_overpass_request,
};
use map_extract::types::{BoundingBox, ClickPoints, Coord};
use map_extract::{ExtractError, Settings, extract};

/// Answers every request with the same outcome and remembers the bodies it was sent.
struct FixedTransport {
    answer: Result<String, TransportError>,
    bodies: Mutex<Vec<String>>,
}

impl FixedTransport {
    fn new(answer: Result<String, TransportError>) -> Self {
        FixedTransport {
            answer,
            bodies: Mutex::new(Vec::new()),
        }
    }
}

impl Transport for FixedTransport {
    fn post(&self, _url: &str, body: &str) -> Result<String, TransportError> {
        self.bodies.lock().unwrap().push(body.to_string());
        self.answer.clone()
    }
}

const CAFE: &str = r#"{
    "version": 0.6,
    "generator": "Overpass API",
    "elements": [
        {"type": "node", "id": 1, "lat": 40.711, "lon": -74.005, "tags": {"amenity": "cafe"}}
    ]
}"#;

fn clicks() -> ClickPoints {
    let mut clicks = ClickPoints::new(5);
    for (lon, lat) in [(-74.01, 40.71), (-74.00, 40.72), (-73.99, 40.71), (-74.00, 40.70)] {
        clicks.push(Coord::new(lon, lat)).unwrap();
    }
    clicks
}

fn client(answer: Result<String, TransportError>) -> OverpassClient<FixedTransport> {
    OverpassClient::with_transport(
        vec!["https://one.example/api".into(), "https://two.example/api".into()],
        Duration::ZERO,
        FixedTransport::new(answer),
    )
}

#[test]
fn cafe_inside_the_diamond_reaches_every_export() {
    let client = client(Ok(CAFE.to_string()));
    let extraction = extract(
        &clicks().coords(),
        &["amenity".to_string()],
        &Settings::default(),
        &client,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(extraction.boundary.ring().len(), 5);
    assert_eq!(extraction.boundary.ring().first(), extraction.boundary.ring().last());
    assert!(extraction.stats.area_km2 > 0.0);
    assert_eq!(extraction.stats.total_features, 1);
    assert_eq!(
        extraction.mode,
        DataMode::Live {
            endpoint: "https://one.example/api".into()
        }
    );
    assert_eq!(client.transport.bodies.lock().unwrap()[0], extraction.query);

    let csv = export(ExportFormat::Csv, &extraction.collection, &Default::default()).unwrap();
    let rows: Vec<&str> = csv.content.lines().collect();
    assert_eq!(
        rows[1],
        r#""1","Point","cafe",40.711,-74.005,"amenity","Point","{""amenity"":""cafe"",""id"":1}""#
    );

    let payloads = extraction.exports(&Settings::default()).unwrap();
    assert_eq!(payloads.len(), 4);
    let osm = &payloads[1];
    assert_eq!(osm.file_name, "osm_data.osm");
    assert!(osm.content.contains(r#"<node id="1" lat="40.711" lon="-74.005">"#));
    let josm = &payloads[2];
    assert!(josm.content.contains(r#"id="900000001""#));
    assert!(josm.content.contains(r#"<tag k="amenity" v="cafe"/>"#));
}

#[test]
fn every_endpoint_failing_is_a_retrieval_failure() {
    let client = client(Err(TransportError::Status(503)));
    let result = extract(
        &clicks().coords(),
        &["amenity".to_string()],
        &Settings::default(),
        &client,
        &CancelToken::new(),
    );
    match result {
        Err(ExtractError::RetrievalFailure { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert_eq!(last, TransportError::Status(503));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(client.transport.bodies.lock().unwrap().len(), 2);
}

#[test]
fn background_request_can_be_polled() {
    let client = client(Ok(CAFE.to_string()));
    let request = OverpassRequest {
        query: "[out:json];".into(),
        bbox: BoundingBox::from_coords(&clicks().coords()).unwrap(),
        categories: vec!["amenity".into()],
        fallback: Default::default(),
    };
    let receiver = spawn_overpass_request(client, request, CancelToken::new());
    let outcome = receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("worker finished")
        .unwrap();
    assert_eq!(outcome.elements.len(), 1);
}
