use serde::{Deserialize, Serialize};

use crate::types::{ClickPoint, Feature, FeatureGeometry};

/// sRGB color, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// How a host should draw one kind of thing on the map. Nothing here renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayStyle {
    pub stroke: Rgb,
    pub stroke_width: f32,
    pub fill: Rgb,
    pub fill_opacity: f32,
    /// Marker radius in pixels; `None` for lines and areas.
    pub radius: Option<f32>,
}

const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
const INDIGO: Rgb = Rgb(0x66, 0x7e, 0xea);
const PURPLE: Rgb = Rgb(0x76, 0x4b, 0xa2);
const RED: Rgb = Rgb(0xe7, 0x4c, 0x3c);

pub const CLICK_MARKER: DisplayStyle = DisplayStyle {
    stroke: WHITE,
    stroke_width: 2.0,
    fill: INDIGO,
    fill_opacity: 0.8,
    radius: Some(8.0),
};

pub const BOUNDARY: DisplayStyle = DisplayStyle {
    stroke: PURPLE,
    stroke_width: 3.0,
    fill: INDIGO,
    fill_opacity: 0.2,
    radius: None,
};

pub const FEATURE_POINT: DisplayStyle = DisplayStyle {
    stroke: WHITE,
    stroke_width: 1.0,
    fill: RED,
    fill_opacity: 0.8,
    radius: Some(5.0),
};

pub const FEATURE_SHAPE: DisplayStyle = DisplayStyle {
    stroke: RED,
    stroke_width: 2.0,
    fill: RED,
    fill_opacity: 0.3,
    radius: None,
};

pub fn feature_style(feature: &Feature) -> DisplayStyle {
    match feature.geometry {
        FeatureGeometry::Point(_) => FEATURE_POINT,
        FeatureGeometry::LineString(_) | FeatureGeometry::Polygon(_) => FEATURE_SHAPE,
    }
}

/// Title shown in a feature's popup.
pub fn popup_label(feature: &Feature) -> &str {
    ["name", "amenity", "highway"]
        .iter()
        .find_map(|key| feature.tag(key).filter(|v| !v.is_empty()))
        .unwrap_or("Unknown")
}

pub fn popup_text(feature: &Feature) -> String {
    format!("{}\nID: {}", popup_label(feature), feature.id)
}

pub fn click_tooltip(point: &ClickPoint) -> String {
    format!("Point {}", point.ordinal)
}
