use thiserror::Error;

/// Failures surfaced by the catalog and overlay pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Transport failure or a non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The catalog answered but reported `success: false`.
    #[error("the catalog reported a failed search")]
    Api,

    /// Neither the candidate nor its descriptor offers a tile template.
    #[error("no tile source available for dataset {id}")]
    MissingTileSource { id: String },

    /// A response body or embedded document could not be decoded.
    #[error("malformed payload: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
