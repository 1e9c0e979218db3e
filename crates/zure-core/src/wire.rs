//! JSON shapes of the `POST /api/explore` endpoint, shared by the server and
//! the client cache.
//!
//! Field names follow the endpoint's camelCase contract. Request validation
//! lives here too so both sides agree on what a searchable request is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category;
use crate::config::SearchConfig;
use crate::geo::round_bearing;
use crate::types::{
    CoordError, Coordinate, DirectionFilter, Place, SearchRequest, TagError, TagFilter,
};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of `POST /api/explore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRequest {
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_step: Option<f64>,
    #[serde(default)]
    pub osm_tags: Vec<String>,
    /// Category labels, resolved to tags and appended after `osm_tags`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<DirectionInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_range: Option<f64>,
}

/// A direction given either as degrees or as a compass name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectionInput {
    Degrees(f64),
    Named(String),
}

impl DirectionInput {
    /// Degrees for this input, or `None` when it names no direction.
    /// Strings may be compass names (`"northeast"`) or numbers (`"45"`).
    pub fn degrees(&self) -> Option<f64> {
        match self {
            DirectionInput::Degrees(d) => d.is_finite().then_some(*d),
            DirectionInput::Named(name) => compass_degrees(name)
                .or_else(|| name.trim().parse::<f64>().ok().filter(|d| d.is_finite())),
        }
    }
}

/// Bearing of a compass point name, clockwise from north.
pub fn compass_degrees(name: &str) -> Option<f64> {
    let deg = match name.trim().to_ascii_lowercase().as_str() {
        "north" => 0.0,
        "northeast" => 45.0,
        "east" => 90.0,
        "southeast" => 135.0,
        "south" => 180.0,
        "southwest" => 225.0,
        "west" => 270.0,
        "northwest" => 315.0,
        _ => return None,
    };
    Some(deg)
}

/// Reasons an explore request is rejected before any network call.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("currentLat and currentLng are required")]
    MissingCoordinates,
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordError),
    #[error("{field} must be a positive number of metres, got {value}")]
    InvalidRadius { field: &'static str, value: f64 },
    #[error(transparent)]
    InvalidTags(#[from] TagError),
}

impl ExploreRequest {
    /// Validate and turn the body into a [`SearchRequest`], filling gaps from
    /// `defaults`. Missing or zero radius fields take the configured default.
    /// An unusable `direction` is dropped rather than rejected.
    pub fn to_search_request(
        &self,
        defaults: &SearchConfig,
    ) -> Result<SearchRequest, ValidationError> {
        let (lat, lng) = match (self.current_lat, self.current_lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(ValidationError::MissingCoordinates),
        };
        let origin = Coordinate::new(lat, lng)?;

        let initial = radius_or("radius", self.radius, defaults.default_radius_m)?;
        let max = radius_or("maxRadius", self.max_radius, defaults.max_radius_m)?;
        let step = radius_or("radiusStep", self.radius_step, defaults.radius_step_m)?;

        let resolved = category::resolve_tags(&self.categories);
        let tags = TagFilter::parse_all(self.osm_tags.iter().chain(resolved.iter()))?;
        if tags.is_empty() {
            return Err(TagError::Empty.into());
        }

        let mut request = SearchRequest::new(origin, tags).with_radii(initial, max, step);
        if let Some(target) = self.direction.as_ref().and_then(DirectionInput::degrees) {
            let half = self
                .direction_range
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(defaults.direction_range_deg);
            request = request.with_direction(DirectionFilter::new(target, half));
        }
        Ok(request)
    }
}

fn radius_or(
    field: &'static str,
    value: Option<f64>,
    default: u32,
) -> Result<u32, ValidationError> {
    match value {
        None => Ok(default),
        Some(v) if v == 0.0 => Ok(default),
        Some(v) if v.is_finite() && v > 0.0 => Ok(v.round().clamp(1.0, u32::MAX as f64) as u32),
        Some(v) => Err(ValidationError::InvalidRadius { field, value: v }),
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Body of every `/api/explore` response, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExploreResponse {
    Success(ExploreSuccess),
    Error(ErrorEnvelope),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreSuccess {
    pub searched_radius: u32,
    pub direction: Option<WireDirection>,
    pub places: Vec<WirePlace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireDirection {
    pub angle: f64,
    pub range: f64,
}

impl From<DirectionFilter> for WireDirection {
    fn from(d: DirectionFilter) -> Self {
        Self {
            angle: d.target_bearing_deg,
            range: d.half_angle_deg,
        }
    }
}

/// A place as sent over the wire: whole metres, bearing to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePlace {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub distance: u64,
    pub bearing: f64,
    pub category: String,
}

impl From<&Place> for WirePlace {
    fn from(p: &Place) -> Self {
        Self {
            name: p.name.clone(),
            lat: p.coordinate.lat(),
            lng: p.coordinate.lng(),
            distance: p.distance_m.round() as u64,
            bearing: round_bearing(p.bearing_deg),
            category: p.category.clone(),
        }
    }
}

impl TryFrom<WirePlace> for Place {
    type Error = CoordError;

    fn try_from(w: WirePlace) -> Result<Self, Self::Error> {
        Ok(Place {
            coordinate: Coordinate::new(w.lat, w.lng)?,
            name: w.name,
            distance_m: w.distance as f64,
            bearing_deg: w.bearing,
            category: w.category,
        })
    }
}

/// `{ status: "error", message, detail? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
