// Error types.
//
// `TreeError` covers structural misuse of the node arena: every variant
// means the caller tried something that would break a tree invariant, so the
// operation is refused and the tree is left untouched. Outcomes that are
// merely "nothing to do" (replacing or detaching a child that isn't there)
// are reported as `Ok(false)` instead.

use crate::tree::NodeId;

/// Result alias for arena operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Structural errors from the node arena.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id names no live node.
    #[error("no live node with id {0}")]
    MissingNode(NodeId),

    /// The child is already in this parent's child list.
    #[error("{child} is already a child of {parent}")]
    DuplicateChild { parent: NodeId, child: NodeId },

    /// The child is the parent itself or one of its ancestors.
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// The child still belongs to another parent (or is the root).
    #[error("{child} is still owned by {owner:?}; detach it first")]
    AlreadyAttached { child: NodeId, owner: Option<NodeId> },

    /// Tried to destroy a node that is still reachable as a child or root.
    #[error("{0} is still attached to the tree")]
    StillAttached(NodeId),

    /// A full consistency check found a broken invariant.
    #[error("tree invariant violated: {0}")]
    Invariant(String),
}

/// Errors loading or validating an `EvolutionConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from driving an evolution run.
#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    /// The run's configuration could not terminate; nothing was changed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A structural edit failed mid-run; the orchestration has a bug.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The generation loop is a single pass and cannot be restarted.
    #[error("evolution already ran on this tree (phase: {0:?})")]
    AlreadyRun(crate::evolution::Phase),
}
