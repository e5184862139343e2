//! Error types for reco-core.

use crate::catalog::ItemId;
use thiserror::Error;

/// Errors surfaced to callers of the recommendation core.
///
/// Degenerate inputs (empty histories, zero-norm vectors, unknown ids in a
/// history) are never errors; they resolve to well-defined fallback values.
#[derive(Debug, Error)]
pub enum RecoError {
    /// The session was asked for recommendations before a catalog was loaded.
    #[error("catalog has not been loaded")]
    CatalogNotLoaded,

    /// The index does not cover an item of the catalog it is used with.
    #[error("index is stale: no vector for item {item_id}")]
    StaleIndex { item_id: ItemId },

    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error for catalog or user files.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Interaction store backend error.
    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    /// Interaction record encoding error.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Result type for reco-core operations.
pub type Result<T> = std::result::Result<T, RecoError>;
