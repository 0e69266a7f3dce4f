use thiserror::Error;

/// Failure to construct or decode a [`Position`](crate::Position) or
/// [`RegionName`](crate::RegionName).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("region name `{0}` is not 1-8 ASCII alphanumeric characters")]
    BadRegionName(String),

    #[error("coordinate ({0}, {1}) is outside the region grid")]
    CoordinateOutOfBounds(u8, u8),

    #[error("malformed position key `{0}`")]
    BadKey(String),
}

/// Everything that can go wrong while moving an agent. All variants are
/// recoverable: the worst outcome is an agent standing still and retrying
/// next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The pathfinder or mesh search returned nothing within its budget.
    #[error("no path found within the search budget")]
    NoPathFound,

    /// The cached path no longer matches the agent's position or region and
    /// must be recomputed.
    #[error("cached path exhausted")]
    PathExhausted,

    /// No net movement over the sampling window.
    #[error("no net movement over the sampling window")]
    Stalled,

    /// The environment denied the requested move.
    #[error("move rejected: {0}")]
    MoveRejected(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("navigation state missing for agent: {0}")]
    StateMissing(String),

    #[error("invalid position: {0}")]
    Position(#[from] PositionError),
}

pub type NavigationResult<T> = Result<T, NavigationError>;
