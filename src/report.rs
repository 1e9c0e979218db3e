//! Plain-text rendering for the `zure` CLI.
//!
//! The JSON response keeps `category` as the raw `key=value` tag; the text
//! report shows the human label from the category table instead.

use std::fmt::Write;

use zure_core::category::{display_label, labels, tags_for_label};
use zure_core::wire::{ExploreSuccess, WirePlace};

/// Human label for a place's category, falling back to the raw tag.
pub fn category_label(place: &WirePlace) -> &str {
    display_label(&place.category).unwrap_or(&place.category)
}

/// One line per place, nearest first, under a summary header.
pub fn explore_text(success: &ExploreSuccess) -> String {
    let mut out = String::new();
    let noun = if success.places.len() == 1 { "place" } else { "places" };
    let _ = write!(
        out,
        "{} {noun} within {} m",
        success.places.len(),
        success.searched_radius
    );
    if let Some(d) = &success.direction {
        let _ = write!(out, ", facing {}° ±{}°", d.angle, d.range);
    }
    out.push('\n');

    for place in &success.places {
        let _ = writeln!(
            out,
            "{:>6} m  {:>5.1}°  {} ({})",
            place.distance,
            place.bearing,
            place.name,
            category_label(place)
        );
    }
    out
}

/// Every category label with the tags it searches.
pub fn categories_text() -> String {
    let all = labels();
    let width = all.iter().map(|l| l.len()).max().unwrap_or(0);
    let mut out = String::new();
    for label in all {
        let _ = writeln!(out, "{label:<width$}  {}", tags_for_label(label).join(", "));
    }
    out
}
