use crate::error::ExtractError;
use crate::types::BoundingBox;

/// Server side timeout, in seconds, written into every query.
pub const DEFAULT_QUERY_TIMEOUT: u64 = 60;

/// Builds an Overpass QL query returning every node, way and relation that carries
/// any of the given tag keys inside the box, followed by the nodes of matched ways
/// so way geometry can be rebuilt.
///
/// The box is written `south,west,north,east`, the axis order Overpass expects.
pub fn build_overpass_query(
    bbox: &BoundingBox,
    categories: &[String],
    timeout_secs: u64,
) -> Result<String, ExtractError> {
    let categories = normalize_categories(categories)?;
    let bounds = format!(
        "{},{},{},{}",
        bbox.min_lat, bbox.min_lng, bbox.max_lat, bbox.max_lng
    );

    let mut filters = String::default();
    for category in &categories {
        filters.push_str(&format!(
            r#"node["{category}"]({bounds});way["{category}"]({bounds});relation["{category}"]({bounds});"#
        ));
    }

    Ok(format!(
        "[out:json][timeout:{timeout_secs}];({filters});out body;>;out skel qt;"
    ))
}

/// Trims, validates and de-duplicates tag keys, keeping first-seen order.
pub fn normalize_categories(categories: &[String]) -> Result<Vec<String>, ExtractError> {
    let mut keys: Vec<String> = Vec::new();
    for raw in categories {
        let key = raw.trim();
        if key.is_empty() {
            continue;
        }
        if key.contains(['"', '\\', '\n', '\r']) {
            return Err(ExtractError::invalid(format!(
                "category {key:?} is not a valid tag key"
            )));
        }
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    if keys.is_empty() {
        return Err(ExtractError::invalid("select at least one data category"));
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox {
            min_lng: -74.01,
            min_lat: 40.7,
            max_lng: -73.99,
            max_lat: 40.72,
        }
    }

    #[test]
    fn single_category_query() {
        let query = build_overpass_query(&bbox(), &["amenity".to_string()], 60).unwrap();
        assert_eq!(
            query,
            r#"[out:json][timeout:60];(node["amenity"](40.7,-74.01,40.72,-73.99);way["amenity"](40.7,-74.01,40.72,-73.99);relation["amenity"](40.7,-74.01,40.72,-73.99););out body;>;out skel qt;"#
        );
    }

    #[test]
    fn duplicate_and_blank_categories_collapse() {
        let cats = vec![
            "highway".to_string(),
            " ".to_string(),
            "building".to_string(),
            "highway ".to_string(),
        ];
        let query = build_overpass_query(&bbox(), &cats, 25).unwrap();
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert_eq!(query.matches(r#"way["highway"]"#).count(), 1);
        assert_eq!(query.matches(r#"way["building"]"#).count(), 1);
        assert!(query.find("highway").unwrap() < query.find("building").unwrap());
    }

    #[test]
    fn empty_categories_are_invalid() {
        assert!(matches!(
            build_overpass_query(&bbox(), &[], 60),
            Err(ExtractError::InvalidInput(_))
        ));
        assert!(matches!(
            build_overpass_query(&bbox(), &["  ".to_string()], 60),
            Err(ExtractError::InvalidInput(_))
        ));
    }

    #[test]
    fn quotes_in_keys_are_rejected() {
        let cats = vec![r#"amenity"](1,1,1,1);node["x"#.to_string()];
        assert!(build_overpass_query(&bbox(), &cats, 60).is_err());
    }
}
