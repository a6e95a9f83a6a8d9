//! Error taxonomy for selector synthesis

use anchor_dom::SelectorError;

/// Errors surfaced by synthesis.
///
/// Relocation and signature building never return these; their failure
/// modes degrade to `None` so callers can treat drift gracefully.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// The synthesis target is not an addressable element in the scope.
    #[error("invalid synthesis target: {0}")]
    InvalidInput(String),

    /// Every search mode exhausted without a unique selector.
    #[error("no unique selector found within the search budget")]
    NotFound,

    /// A path derived from real nodes matched nothing; the query engine
    /// and the search's model of the tree disagree.
    #[error("selector `{selector}` matched no nodes it was derived from")]
    Inconsistent { selector: String },

    /// Query-collaborator parse failure.
    #[error(transparent)]
    Selector(#[from] SelectorError),
}
