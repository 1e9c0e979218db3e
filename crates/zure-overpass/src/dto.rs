//! DTOs for decoding Overpass JSON responses.
//!
//! A body only counts as a valid answer when it decodes into
//! [`OverpassResponse`], which requires the `elements` array. Elements are
//! mapped into domain [`RawGeoElement`]s in one pass; coordinate problems
//! leave `coordinate` empty rather than failing the whole response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zure_core::{Coordinate, ElementKind, RawGeoElement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassResponse {
    pub fn into_raw_elements(self) -> Vec<RawGeoElement> {
        self.elements
            .into_iter()
            .map(OverpassElement::into_raw)
            .collect()
    }
}

impl OverpassElement {
    pub fn into_raw(self) -> RawGeoElement {
        let coordinate = self
            .position()
            .and_then(|(lat, lon)| Coordinate::new(lat, lon).ok());
        RawGeoElement {
            id: self.id,
            kind: ElementKind::from_wire(&self.element_type),
            coordinate,
            tags: self.tags,
        }
    }

    /// Node position, falling back to the centroid Overpass adds for ways
    /// and relations under `out center`.
    fn position(&self) -> Option<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some((lat, lon));
        }
        self.center.map(|c| (c.lat, c.lon))
    }
}
