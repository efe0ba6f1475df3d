use thiserror::Error;

/// Errors raised while traversing or rewriting an expression tree.
///
/// All of these are fatal for the tree being processed; none is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// The traversal reached a node kind it has no handler for.
    #[error("unsupported node kind: {kind}")]
    UnsupportedNodeKind { kind: String },

    /// A rewritten node still carries a type that was supposed to be
    /// replaced. Indicates an incomplete replacement mapping or missing
    /// registry metadata.
    #[error("{node} node still has unresolved type {ty} after substitution")]
    UnresolvedSubstitution { node: &'static str, ty: String },

    /// A constructor or member could not be re-resolved on the
    /// replacement type.
    #[error("replacement type {ty} has no matching member {member}")]
    MissingReplacementMember { member: String, ty: String },
}
