use std::collections::BTreeMap;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::ExtractError;
use crate::types::Coord;

pub const GENERATOR: &str = concat!("map-extract ", env!("CARGO_PKG_VERSION"));

/// Keys that describe the element rather than the feature; never written as tags.
const INTERNAL_KEYS: [&str; 7] = ["id", "type", "timestamp", "version", "changeset", "user", "uid"];

/// Written when nothing else is left, so no element ends up tag-less.
pub const FALLBACK_TAG: (&str, &str) = ("source", "map-extract");

pub(crate) fn export_tags(tags: &BTreeMap<String, String>) -> Vec<(&str, &str)> {
    let kept: Vec<(&str, &str)> = tags
        .iter()
        .filter(|(k, _)| !INTERNAL_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    if kept.is_empty() {
        vec![FALLBACK_TAG]
    } else {
        kept
    }
}

pub(crate) fn check_finite(coords: &[Coord], id: i64) -> Result<(), ExtractError> {
    match coords.iter().find(|c| !c.is_finite()) {
        Some(c) => Err(ExtractError::ExportFailure(format!(
            "feature {} has a non-finite coordinate ({}, {})",
            id, c.long, c.lat
        ))),
        None => Ok(()),
    }
}

/// Indented OSM document writer. Attribute values are escaped for `< > & ' "`.
pub(crate) struct OsmDocument {
    writer: Writer<Vec<u8>>,
}

impl OsmDocument {
    pub fn new() -> Result<Self, ExtractError> {
        let mut doc = OsmDocument {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        doc.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut osm = BytesStart::new("osm");
        osm.push_attribute(("version", "0.6"));
        osm.push_attribute(("generator", GENERATOR));
        doc.write(Event::Start(osm))?;
        Ok(doc)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExtractError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExtractError::ExportFailure(e.to_string()))
    }

    pub fn empty(&mut self, element: BytesStart<'_>) -> Result<(), ExtractError> {
        self.write(Event::Empty(element))
    }

    /// Writes `element` with one `<tag>` child per entry in `tags`.
    pub fn tagged(
        &mut self,
        element: BytesStart<'_>,
        tags: &[(&str, &str)],
    ) -> Result<(), ExtractError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        self.write(Event::Start(element))?;
        self.tags(tags)?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Writes a `<way>`-like element: `<nd ref>` children first, then tags.
    pub fn with_refs(
        &mut self,
        element: BytesStart<'_>,
        refs: &[i64],
        tags: &[(&str, &str)],
    ) -> Result<(), ExtractError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        self.write(Event::Start(element))?;
        for r in refs {
            let mut nd = BytesStart::new("nd");
            nd.push_attribute(("ref", r.to_string().as_str()));
            self.write(Event::Empty(nd))?;
        }
        self.tags(tags)?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn tags(&mut self, tags: &[(&str, &str)]) -> Result<(), ExtractError> {
        for (k, v) in tags {
            let mut tag = BytesStart::new("tag");
            tag.push_attribute(("k", *k));
            tag.push_attribute(("v", *v));
            self.write(Event::Empty(tag))?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<String, ExtractError> {
        self.write(Event::End(BytesEnd::new("osm")))?;
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| ExtractError::ExportFailure(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    use super::*;

    /// Parses `xml` and returns the names of every element in document order.
    pub(crate) fn element_names(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut names = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).into_owned())
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("invalid xml: {e}"),
            }
        }
        names
    }

    #[test]
    fn strips_internal_keys_and_falls_back() {
        let tags: BTreeMap<String, String> = [
            ("id".to_string(), "1".to_string()),
            ("user".to_string(), "bob".to_string()),
            ("name".to_string(), "Cafe".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(export_tags(&tags), vec![("name", "Cafe")]);

        let only_internal: BTreeMap<String, String> =
            [("version".to_string(), "3".to_string())].into_iter().collect();
        assert_eq!(export_tags(&only_internal), vec![FALLBACK_TAG]);
    }

    #[test]
    fn escapes_attribute_values() {
        let mut doc = OsmDocument::new().unwrap();
        let node = BytesStart::new("node");
        doc.tagged(node, &[("name", r#"Tom & "Jerry's" <diner>"#)])
            .unwrap();
        let xml = doc.finish().unwrap();
        assert!(xml.contains("Tom &amp; &quot;Jerry&apos;s&quot; &lt;diner&gt;"), "{xml}");
        assert_eq!(element_names(&xml), vec!["osm", "node", "tag"]);
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(check_finite(&[Coord::new(1.0, 2.0)], 1).is_ok());
        assert!(matches!(
            check_finite(&[Coord::new(f64::INFINITY, 2.0)], 1),
            Err(ExtractError::ExportFailure(_))
        ));
    }
}
