//! Domain-specific assertion macros for zure harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which part of an explore response was wrong.

// ---------------------------------------------------------------------------
// Envelope assertions
// ---------------------------------------------------------------------------

/// Assert a success envelope and evaluate to its `places` array.
///
/// ```rust
/// let places = assert_success!(status, body);
/// ```
#[macro_export]
macro_rules! assert_success {
    ($status:expr, $body:expr) => {{
        let status: axum::http::StatusCode = $status;
        let body: &serde_json::Value = &$body;
        if status != axum::http::StatusCode::OK || body["status"] != "success" {
            panic!(
                "assert_success! failed:\n  status: {}\n  body:   {:#}",
                status, body
            );
        }
        body["places"]
            .as_array()
            .unwrap_or_else(|| panic!("success body has no places array: {:#}", body))
            .clone()
    }};
}

/// Assert an error envelope with the given HTTP status.
///
/// ```rust
/// assert_error!(status, body, StatusCode::BAD_GATEWAY);
/// ```
#[macro_export]
macro_rules! assert_error {
    ($status:expr, $body:expr, $expected:expr) => {{
        let status: axum::http::StatusCode = $status;
        let body: &serde_json::Value = &$body;
        if status != $expected || body["status"] != "error" || !body["message"].is_string() {
            panic!(
                "assert_error! failed:\n  expected status: {}\n  actual status:   {}\n  body: {:#}",
                $expected, status, body
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Place assertions
// ---------------------------------------------------------------------------

/// Assert the names of a `places` array, in order.
#[macro_export]
macro_rules! assert_place_names {
    ($places:expr, [$($name:expr),* $(,)?]) => {{
        let actual: Vec<&str> = $places
            .iter()
            .map(|p: &serde_json::Value| p["name"].as_str().unwrap_or("<no name>"))
            .collect();
        let expected: Vec<&str> = vec![$($name),*];
        pretty_assertions::assert_eq!(actual, expected, "place names differ");
    }};
}

/// Assert that distances in a `places` array never decrease.
#[macro_export]
macro_rules! assert_sorted_by_distance {
    ($places:expr) => {{
        let distances: Vec<u64> = $places
            .iter()
            .map(|p: &serde_json::Value| p["distance"].as_u64().expect("integer distance"))
            .collect();
        if distances.windows(2).any(|w| w[0] > w[1]) {
            panic!("assert_sorted_by_distance! failed: {:?}", distances);
        }
    }};
}
