use std::collections::HashMap;
use std::hash::Hash;

use crate::error::NavigationError;

/// What the engine did for an agent this tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TravelOutcome {
    /// A single-step move intent was issued along the cached path.
    Moving,
    /// The agent is at (or within range of) the destination.
    Arrived,
    /// The agent is being reconciled onto the path.
    Placing,
    /// A stall was detected and the agent is driving toward a forward
    /// waypoint it can occupy.
    Rerouting,
    /// The agent cannot act this tick (fatigued or otherwise immobilized).
    Immobilized,
}

/// Outcome of travel resolution for a single agent in a given tick, including
/// failures. Stored in [`TravelResults`] by the batch API.
#[derive(Clone, Debug)]
pub enum TravelResult {
    Moving,
    Arrived,
    Placing,
    Rerouting,
    Immobilized,
    Failed(NavigationError),
}

impl TravelResult {
    /// True when movement was attempted or is possible this tick.
    pub fn movement_possible(&self) -> bool {
        !matches!(self, TravelResult::Failed(_))
    }
}

impl From<Result<TravelOutcome, NavigationError>> for TravelResult {
    fn from(value: Result<TravelOutcome, NavigationError>) -> TravelResult {
        match value {
            Ok(TravelOutcome::Moving) => TravelResult::Moving,
            Ok(TravelOutcome::Arrived) => TravelResult::Arrived,
            Ok(TravelOutcome::Placing) => TravelResult::Placing,
            Ok(TravelOutcome::Rerouting) => TravelResult::Rerouting,
            Ok(TravelOutcome::Immobilized) => TravelResult::Immobilized,
            Err(err) => TravelResult::Failed(err),
        }
    }
}

/// Per-tick collection of travel results, indexed by entity handle.
/// Written by `NavigationSystem::process`, read by callers on the next tick.
pub struct TravelResults<Handle>
where
    Handle: Hash + Eq,
{
    pub results: HashMap<Handle, TravelResult>,
}

impl<Handle> Default for TravelResults<Handle>
where
    Handle: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Handle> TravelResults<Handle>
where
    Handle: Hash + Eq,
{
    pub fn new() -> Self {
        TravelResults {
            results: HashMap::new(),
        }
    }

    pub fn get(&self, handle: &Handle) -> Option<&TravelResult> {
        self.results.get(handle)
    }

    pub fn insert(&mut self, handle: Handle, result: TravelResult) {
        self.results.insert(handle, result);
    }
}
