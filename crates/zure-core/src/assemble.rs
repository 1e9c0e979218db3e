//! Result assembler: turns raw upstream elements into a ranked [`Place`]
//! list for one [`SearchRequest`].
//!
//! Steps, in order: drop unusable elements, measure from the origin, pick the
//! category, apply the optional sector filter, stable-sort by distance,
//! truncate. No de-duplication happens here; that belongs to the client
//! cache.

use crate::geo::{bearing_degrees, distance_meters};
use crate::types::{Place, RawGeoElement, SearchRequest};

/// Default cap on places returned from one attempt.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Assemble `elements` into at most `max_results` places ranked by distance
/// from `request.origin`.
pub fn assemble(
    elements: Vec<RawGeoElement>,
    request: &SearchRequest,
    max_results: usize,
) -> Vec<Place> {
    let mut places: Vec<Place> = elements
        .into_iter()
        .filter_map(|element| to_place(element, request))
        .filter(|place| {
            request
                .direction
                .as_ref()
                .map_or(true, |dir| dir.admits(place.bearing_deg))
        })
        .collect();

    // `sort_by` is stable, so equal distances keep upstream order.
    places.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    places.truncate(max_results);
    places
}

fn to_place(element: RawGeoElement, request: &SearchRequest) -> Option<Place> {
    let coordinate = element.coordinate?;
    let name = element.name()?.to_string();
    let category = request
        .tags
        .iter()
        .find(|tag| tag.matches(&element.tags))?
        .to_string();

    Some(Place {
        name,
        coordinate,
        distance_m: distance_meters(request.origin, coordinate),
        bearing_deg: bearing_degrees(request.origin, coordinate),
        category,
    })
}
