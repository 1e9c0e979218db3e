//! Overpass QL builder for proximity queries.

use std::fmt::Write as _;

use zure_core::{Coordinate, TagFilter};

/// Default server-side `[timeout:N]` in seconds.
pub const DEFAULT_QUERY_TIMEOUT_S: u32 = 20;

/// Build a query returning every node, way and relation within `radius_m` of
/// `origin` that carries any of `tags`. Ways and relations come back with a
/// `center` so they can be ranked like nodes.
pub fn proximity_query(
    origin: Coordinate,
    radius_m: u32,
    tags: &[TagFilter],
    timeout_s: u32,
) -> String {
    let mut q = format!("[out:json][timeout:{timeout_s}];\n(\n");
    for tag in tags {
        // Writing into a String cannot fail.
        let _ = writeln!(
            q,
            "  nwr[\"{}\"=\"{}\"](around:{},{:.7},{:.7});",
            escape(&tag.key),
            escape(&tag.value),
            radius_m,
            origin.lat(),
            origin.lng(),
        );
    }
    q.push_str(");\nout center tags;\n");
    q
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
