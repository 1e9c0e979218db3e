//! Test builders: ergonomic constructors for Overpass elements and explore
//! request bodies.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use serde_json::{json, Map, Value};
use zure_core::geo::EARTH_RADIUS_M;
use zure_core::Coordinate;

// ---------------------------------------------------------------------------
// ElementBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for Overpass JSON elements served by `FakeOverpass`.
///
/// # Example
///
/// ```rust
/// let cafe = ElementBuilder::node(1)
///     .at(35.001, 135.001)
///     .name("Test Cafe")
///     .tag("amenity", "cafe")
///     .build();
/// ```
pub struct ElementBuilder {
    kind: &'static str,
    id: i64,
    position: Option<(f64, f64)>,
    tags: Map<String, Value>,
}

impl ElementBuilder {
    pub fn node(id: i64) -> Self {
        Self::new("node", id)
    }

    /// A way; its position is reported as an `out center` centroid.
    pub fn way(id: i64) -> Self {
        Self::new("way", id)
    }

    fn new(kind: &'static str, id: i64) -> Self {
        Self {
            kind,
            id,
            position: None,
            tags: Map::new(),
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.position = Some((lat, lng));
        self
    }

    pub fn at_coord(self, c: Coordinate) -> Self {
        self.at(c.lat(), c.lng())
    }

    pub fn name(self, name: &str) -> Self {
        self.tag("name", name)
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn build(self) -> Value {
        let mut element = json!({ "type": self.kind, "id": self.id });
        if let Some((lat, lon)) = self.position {
            if self.kind == "node" {
                element["lat"] = json!(lat);
                element["lon"] = json!(lon);
            } else {
                element["center"] = json!({ "lat": lat, "lon": lon });
            }
        }
        if !self.tags.is_empty() {
            element["tags"] = Value::Object(self.tags);
        }
        element
    }
}

/// A named cafe node `metres` from `from` along `bearing_deg`
/// (0 = north, 90 = east). Uses a flat-earth offset, fine for a few km.
pub fn cafe_offset(id: i64, name: &str, from: Coordinate, metres: f64, bearing_deg: f64) -> Value {
    ElementBuilder::node(id)
        .at_coord(offset(from, metres, bearing_deg))
        .name(name)
        .tag("amenity", "cafe")
        .build()
}

/// `from` moved `metres` along `bearing_deg`.
pub fn offset(from: Coordinate, metres: f64, bearing_deg: f64) -> Coordinate {
    let theta = bearing_deg.to_radians();
    let dlat = (metres * theta.cos() / EARTH_RADIUS_M).to_degrees();
    let parallel_m = EARTH_RADIUS_M * from.lat().to_radians().cos();
    let dlng = (metres * theta.sin() / parallel_m).to_degrees();
    Coordinate::new(from.lat() + dlat, from.lng() + dlng).unwrap()
}

// ---------------------------------------------------------------------------
// ExploreBodyBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for `POST /api/explore` JSON bodies.
///
/// ```rust
/// let body = ExploreBodyBuilder::at(35.0, 135.0).tag("amenity=cafe").direction("north").build();
/// ```
pub struct ExploreBodyBuilder {
    body: Map<String, Value>,
}

impl ExploreBodyBuilder {
    pub fn at(lat: f64, lng: f64) -> Self {
        let mut body = Map::new();
        body.insert("currentLat".into(), json!(lat));
        body.insert("currentLng".into(), json!(lng));
        body.insert("osmTags".into(), json!([]));
        Self { body }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        if let Some(Value::Array(tags)) = self.body.get_mut("osmTags") {
            tags.push(json!(tag));
        }
        self
    }

    pub fn category(mut self, label: &str) -> Self {
        let categories = self.body.entry("categories").or_insert_with(|| json!([]));
        if let Value::Array(list) = categories {
            list.push(json!(label));
        }
        self
    }

    pub fn radius(self, radius: f64) -> Self {
        self.field("radius", json!(radius))
    }

    pub fn max_radius(self, radius: f64) -> Self {
        self.field("maxRadius", json!(radius))
    }

    pub fn radius_step(self, step: f64) -> Self {
        self.field("radiusStep", json!(step))
    }

    pub fn direction(self, direction: impl Into<Value>) -> Self {
        self.field("direction", direction.into())
    }

    pub fn direction_range(self, range: f64) -> Self {
        self.field("directionRange", json!(range))
    }

    /// Set or overwrite any field, including invalid values.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.body.remove(key);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.body)
    }
}
