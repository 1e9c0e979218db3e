use thiserror::Error;

/// Errors surfaced to the device while refreshing places.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint could not be reached or the body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with an error envelope or a non-success status.
    #[error("server answered {status}: {message}")]
    Server {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// A success body that does not match the explore response shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// No tags selected, so there is nothing to search for.
    #[error("no tags selected")]
    NoTags,
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}
