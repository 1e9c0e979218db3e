//! Category resolver: maps user-facing category labels to OSM tag filters
//! and back.
//!
//! The tables are compiled into perfect-hash maps. Labels are matched
//! case-insensitively after trimming; unknown labels resolve to nothing.

use phf::phf_map;

/// Label → OSM `key=value` tags searched for that label.
static LABEL_TO_TAGS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    // Food and drink
    "restaurant" => &["amenity=restaurant"],
    "cafe" => &["amenity=cafe"],
    "pub & bar" => &["amenity=pub", "amenity=bar", "amenity=biergarten"],
    "noodles" => &["amenity=restaurant"],
    "fast food" => &["amenity=fast_food"],
    "bakery" => &["shop=bakery"],
    "sweets" => &["shop=confectionery"],

    // Shopping
    "books" => &["shop=books"],
    "gifts & variety" => &["shop=variety_store", "shop=gift", "shop=general"],
    "florist" => &["shop=florist", "shop=garden_centre"],
    "market" => &["amenity=marketplace"],
    "department store" => &["shop=department_store", "shop=mall"],
    "stationery" => &["shop=stationery"],

    // Parks and nature
    "park" => &["leisure=park", "leisure=playground"],
    "square" => &["leisure=common", "leisure=plaza", "leisure=pitch"],
    "spring" => &["natural=spring"],
    "landmark tree" => &["natural=tree"],
    "waterside" => &["natural=coastline", "natural=bay", "natural=water", "waterway=riverbank"],
    "peak" => &["natural=peak"],

    // Sightseeing
    "viewpoint" => &["tourism=viewpoint"],
    "lighthouse" => &["man_made=lighthouse", "man_made=beacon"],
    "monument" => &["historic=monument", "historic=memorial", "historic=wayside_cross"],
    "shrine & temple" => &[
        "amenity=place_of_worship",
        "historic=wayside_shrine",
        "historic=archaeological_site",
    ],
    "castle" => &["historic=castle", "historic=ruins"],
    "fountain" => &["amenity=fountain"],
    "museum" => &["tourism=museum", "tourism=artwork"],
    "zoo & aquarium" => &["tourism=zoo", "tourism=aquarium"],

    // Entertainment
    "cinema" => &["amenity=cinema"],
    "theatre" => &["amenity=theatre"],
    "theme park" => &["tourism=theme_park", "leisure=water_park"],
    "library" => &["amenity=library"],
    "bathhouse" => &["amenity=public_bath", "amenity=spa"],
};

/// OSM tag → short display label for a matched place.
static TAG_TO_LABEL: phf::Map<&'static str, &'static str> = phf_map! {
    "amenity=restaurant" => "Restaurant",
    "amenity=cafe" => "Cafe",
    "amenity=pub" => "Pub",
    "amenity=bar" => "Bar",
    "amenity=biergarten" => "Beer garden",
    "amenity=fast_food" => "Fast food",
    "shop=bakery" => "Bakery",
    "shop=confectionery" => "Sweets",
    "shop=books" => "Bookshop",
    "shop=variety_store" => "Variety store",
    "shop=gift" => "Gift shop",
    "shop=general" => "General store",
    "shop=florist" => "Florist",
    "shop=garden_centre" => "Garden centre",
    "amenity=marketplace" => "Market",
    "shop=department_store" => "Department store",
    "shop=mall" => "Mall",
    "shop=stationery" => "Stationery",
    "leisure=park" => "Park",
    "leisure=playground" => "Playground",
    "leisure=common" => "Common",
    "leisure=plaza" => "Plaza",
    "leisure=pitch" => "Pitch",
    "natural=spring" => "Spring",
    "natural=tree" => "Landmark tree",
    "natural=coastline" => "Coast",
    "natural=bay" => "Bay",
    "natural=water" => "Waterside",
    "waterway=riverbank" => "Riverbank",
    "natural=peak" => "Peak",
    "tourism=viewpoint" => "Viewpoint",
    "man_made=lighthouse" => "Lighthouse",
    "man_made=beacon" => "Beacon",
    "historic=monument" => "Monument",
    "historic=memorial" => "Memorial",
    "historic=wayside_cross" => "Wayside cross",
    "amenity=place_of_worship" => "Shrine or temple",
    "historic=wayside_shrine" => "Wayside shrine",
    "historic=archaeological_site" => "Archaeological site",
    "historic=castle" => "Castle",
    "historic=ruins" => "Ruins",
    "amenity=fountain" => "Fountain",
    "tourism=museum" => "Museum",
    "tourism=artwork" => "Artwork",
    "tourism=zoo" => "Zoo",
    "tourism=aquarium" => "Aquarium",
    "amenity=cinema" => "Cinema",
    "amenity=theatre" => "Theatre",
    "tourism=theme_park" => "Theme park",
    "leisure=water_park" => "Water park",
    "amenity=library" => "Library",
    "amenity=public_bath" => "Public bath",
    "amenity=spa" => "Spa",
};

/// Tags for a single label, or an empty slice if the label is unknown.
pub fn tags_for_label(label: &str) -> &'static [&'static str] {
    let key = label.trim().to_lowercase();
    LABEL_TO_TAGS.get(key.as_str()).copied().unwrap_or(&[])
}

/// Resolve several labels into one de-duplicated tag list, keeping the order
/// in which tags are first produced.
pub fn resolve_tags<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        for tag in tags_for_label(label.as_ref()) {
            if !out.iter().any(|t| t == tag) {
                out.push((*tag).to_string());
            }
        }
    }
    out
}

/// Display label for a matched `key=value` category.
pub fn display_label(tag: &str) -> Option<&'static str> {
    TAG_TO_LABEL.get(tag).copied()
}

/// Every known label, sorted for stable presentation.
pub fn labels() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = LABEL_TO_TAGS.keys().copied().collect();
    all.sort_unstable();
    all
}
