use thiserror::Error;

/// Faults surfaced by the store's public operations.
///
/// Generation failures are not represented here; they land in
/// [`TreeValue::Error`](crate::TreeValue::Error) as an opaque payload.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `run` was asked to expand from a node while the store is showing an
    /// error instead of a tree. This is a caller bug: there is no tree to
    /// expand against.
    #[error("can't expand from node '{node_id}': current state has no tree")]
    NoTreeToExpand { node_id: String },

    /// Import was requested while a generation job is in flight.
    #[error("can't import a tree while a job is running")]
    ImportWhileRunning,

    /// The imported file parsed as JSON but is not a top-level array.
    #[error("invalid tree format: expected a JSON array")]
    InvalidTreeFormat,

    /// The imported file could not be read.
    #[error("reading tree file")]
    Io(#[from] std::io::Error),

    /// The imported file is not valid JSON.
    #[error("parsing tree file")]
    Parse(#[from] serde_json::Error),
}
