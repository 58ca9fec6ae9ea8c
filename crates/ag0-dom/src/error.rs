//! Error types for the DOM.

/// Error from mutating a document.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// A mutation would break the tree structure.
    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    /// The node was destroyed and its handle is stale.
    #[error("Node has been destroyed")]
    Destroyed,
}
