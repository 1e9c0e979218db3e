//! Core types for zure-core.
//!
//! This module defines the data shared by every layer: the validated
//! [`Coordinate`], the upstream [`RawGeoElement`], the ranked [`Place`] and
//! its de-duplication identity [`PlaceKey`], and the per-query
//! [`SearchRequest`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// Errors raised when constructing a [`Coordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    #[error("latitude {0} is outside -90..=90")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside -180..=180")]
    InvalidLongitude(f64),
}

/// A WGS84 position in degrees.
///
/// Always satisfies `-90 <= lat <= 90` and `-180 <= lng < 180`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Validate and build a coordinate. A longitude of exactly `180` is the
    /// same meridian as `-180` and is stored as such.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || !(MIN_LNG..=MAX_LNG).contains(&lng) {
            return Err(CoordError::InvalidLongitude(lng));
        }
        let lng = if lng == MAX_LNG { MIN_LNG } else { lng };
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Tag filters
// ---------------------------------------------------------------------------

/// Errors raised when parsing a `key=value` tag filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag {0:?} is not of the form key=value")]
    Malformed(String),
    #[error("no tags requested")]
    Empty,
}

/// One OSM `key=value` pair a place must carry to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    /// Parse `"amenity=cafe"`. Surrounding whitespace is ignored; an empty key
    /// or value is rejected.
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let (key, value) = raw
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| TagError::Malformed(raw.to_string()))?;
        if key.is_empty() || value.is_empty() {
            return Err(TagError::Malformed(raw.to_string()));
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Parse a list of tags, dropping duplicates while keeping first-seen
    /// order. Order matters: the first matching tag names the category.
    pub fn parse_all<I, S>(raw: I) -> Result<Vec<Self>, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<Self> = Vec::new();
        for tag in raw {
            let parsed = Self::parse(tag.as_ref())?;
            if !out.contains(&parsed) {
                out.push(parsed);
            }
        }
        Ok(out)
    }

    /// True when `tags` carries exactly this key with this value.
    pub fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        tags.get(&self.key).is_some_and(|v| *v == self.value)
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

// ---------------------------------------------------------------------------
// Upstream elements
// ---------------------------------------------------------------------------

/// OSM element type as reported by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
    Other,
}

impl ElementKind {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "node" => ElementKind::Node,
            "way" => ElementKind::Way,
            "relation" => ElementKind::Relation,
            _ => ElementKind::Other,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node => write!(f, "node"),
            ElementKind::Way => write!(f, "way"),
            ElementKind::Relation => write!(f, "relation"),
            ElementKind::Other => write!(f, "other"),
        }
    }
}

/// A geodata element as returned by a mirror, before assembly.
///
/// `coordinate` is the node position for nodes and the centroid for ways and
/// relations; it is `None` when the upstream supplied neither or supplied
/// values outside the valid range.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeoElement {
    pub id: i64,
    pub kind: ElementKind,
    pub coordinate: Option<Coordinate>,
    pub tags: BTreeMap<String, String>,
}

impl RawGeoElement {
    /// The `name` tag, if present and not blank.
    pub fn name(&self) -> Option<&str> {
        self.tags
            .get("name")
            .map(String::as_str)
            .filter(|n| !n.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// A ranked point of interest relative to the origin it was discovered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub coordinate: Coordinate,
    /// Metres from the discovery origin. Never refreshed afterwards.
    pub distance_m: f64,
    /// Degrees clockwise from true north, in `[0, 360)`.
    pub bearing_deg: f64,
    /// The requested `key=value` tag that matched this place.
    pub category: String,
}

impl Place {
    pub fn key(&self) -> PlaceKey {
        PlaceKey::new(&self.name, self.coordinate)
    }
}

/// Scale applied to degrees before rounding; 1e-6° is about 0.11 m.
const KEY_SCALE: f64 = 1e6;

/// Identity of a [`Place`] for de-duplication: name plus the coordinate
/// rounded to micro-degrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceKey {
    name: String,
    lat_e6: i64,
    lng_e6: i64,
}

impl PlaceKey {
    pub fn new(name: &str, coordinate: Coordinate) -> Self {
        Self {
            name: name.to_string(),
            lat_e6: (coordinate.lat() * KEY_SCALE).round() as i64,
            lng_e6: (coordinate.lng() * KEY_SCALE).round() as i64,
        }
    }
}

// ---------------------------------------------------------------------------
// Search requests
// ---------------------------------------------------------------------------

pub const DEFAULT_INITIAL_RADIUS_M: u32 = 3_000;
pub const DEFAULT_MAX_RADIUS_M: u32 = 5_000;
pub const DEFAULT_RADIUS_STEP_M: u32 = 2_000;
pub const DEFAULT_DIRECTION_RANGE_DEG: f64 = 45.0;

/// Restrict results to a sector around a compass bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionFilter {
    /// Centre of the sector, normalised into `[0, 360)`.
    pub target_bearing_deg: f64,
    /// Half-width of the sector, clamped into `(0, 180]`.
    pub half_angle_deg: f64,
}

impl DirectionFilter {
    pub fn new(target_bearing_deg: f64, half_angle_deg: f64) -> Self {
        let half = if half_angle_deg.is_finite() && half_angle_deg > 0.0 {
            half_angle_deg.min(180.0)
        } else {
            DEFAULT_DIRECTION_RANGE_DEG
        };
        Self {
            target_bearing_deg: crate::geo::normalize_bearing(target_bearing_deg),
            half_angle_deg: half,
        }
    }

    pub fn admits(&self, bearing_deg: f64) -> bool {
        crate::geo::within_sector(bearing_deg, self.target_bearing_deg, self.half_angle_deg)
    }
}

/// One proximity query. Ephemeral: built per search, dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub initial_radius_m: u32,
    pub max_radius_m: u32,
    pub radius_step_m: u32,
    pub tags: Vec<TagFilter>,
    pub direction: Option<DirectionFilter>,
}

impl SearchRequest {
    pub fn new(origin: Coordinate, tags: Vec<TagFilter>) -> Self {
        Self {
            origin,
            initial_radius_m: DEFAULT_INITIAL_RADIUS_M,
            max_radius_m: DEFAULT_MAX_RADIUS_M,
            radius_step_m: DEFAULT_RADIUS_STEP_M,
            tags,
            direction: None,
        }
    }

    pub fn with_radii(mut self, initial_m: u32, max_m: u32, step_m: u32) -> Self {
        self.initial_radius_m = initial_m;
        self.max_radius_m = max_m;
        self.radius_step_m = step_m;
        self
    }

    pub fn with_direction(mut self, direction: DirectionFilter) -> Self {
        self.direction = Some(direction);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
