use serde::{Deserialize, Serialize};

use crate::pathcache::CachedPath;
use crate::position::{Position, RegionName};

/// The destination an agent is currently traveling toward. Recreated whenever
/// a new destination is requested or the cached path goes stale.
#[derive(Clone, Serialize, Deserialize)]
pub struct TravelIntent {
    pub destination: Position,
    pub range: u32,
    pub refreshed_at: u32,
}

/// Ordered regions to traverse toward the destination region, as returned by
/// the external region search. Volatile; recomputed whenever the destination
/// region changes or entry into the next region is confirmed.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegionRoute {
    pub(crate) destination: RegionName,
    pub(crate) regions: Vec<RegionName>,
    pub(crate) next_index: usize,
}

impl RegionRoute {
    pub fn destination(&self) -> RegionName {
        self.destination
    }

    /// The next region to enter, if the route is not exhausted.
    pub fn next_region(&self) -> Option<RegionName> {
        self.regions.get(self.next_index).copied()
    }

    pub fn remaining(&self) -> &[RegionName] {
        &self.regions[self.next_index.min(self.regions.len())..]
    }
}

/// Sparse multi-region waypoint route from the external mesh search.
///
/// An empty waypoint list records "the mesh had no route for this
/// destination" so the search is not repeated every tick.
#[derive(Clone, Serialize, Deserialize)]
pub struct MeshRoute {
    destination: String,
    waypoints: Vec<String>,
    cursor: usize,
    incomplete: bool,

    #[serde(skip)]
    decoded: Option<Vec<Position>>,
}

impl MeshRoute {
    pub(crate) fn new(destination: Position, waypoints: &[Position], incomplete: bool) -> MeshRoute {
        MeshRoute {
            destination: destination.key(),
            waypoints: waypoints.iter().map(|p| p.key()).collect(),
            cursor: 0,
            incomplete,
            decoded: None,
        }
    }

    pub(crate) fn no_route(destination: Position) -> MeshRoute {
        MeshRoute {
            destination: destination.key(),
            waypoints: Vec::new(),
            cursor: 0,
            incomplete: true,
            decoded: None,
        }
    }

    pub fn destination(&self) -> Option<Position> {
        self.destination.parse().ok()
    }

    pub fn is_for(&self, destination: Position) -> bool {
        self.destination == destination.key()
    }

    pub fn has_waypoints(&self) -> bool {
        !self.waypoints.is_empty()
    }

    pub fn incomplete(&self) -> bool {
        self.incomplete
    }

    pub(crate) fn waypoints(&mut self) -> &[Position] {
        if self.decoded.is_none() {
            let decoded = self
                .waypoints
                .iter()
                .filter_map(|key| key.parse::<Position>().ok())
                .collect();

            self.decoded = Some(decoded);
        }

        self.decoded.as_deref().unwrap_or(&[])
    }

    pub(crate) fn current_waypoint(&mut self) -> Option<Position> {
        let cursor = self.cursor;
        self.waypoints().get(cursor).copied()
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// All navigation bookkeeping for a single agent, owned by that agent and
/// serializable to plain strings and numbers for the simulation's state
/// store. Cleared wholesale to cancel movement.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NavigationState {
    pub(crate) path: CachedPath,
    pub(crate) intent: Option<TravelIntent>,
    pub(crate) region_route: Option<RegionRoute>,
    pub(crate) mesh_route: Option<MeshRoute>,
    pub(crate) mesh_bypass: bool,
}

impl NavigationState {
    pub fn path(&self) -> &CachedPath {
        &self.path
    }

    pub fn intent(&self) -> Option<&TravelIntent> {
        self.intent.as_ref()
    }

    pub fn region_route(&self) -> Option<&RegionRoute> {
        self.region_route.as_ref()
    }

    /// True iff a path is cached and its arrived flag is set.
    pub fn has_arrived(&self) -> bool {
        self.path.has_arrived()
    }

    /// Cancel movement: drop the cached path, intent and all route state.
    /// Always safe; the agent stays stationary until a new request arrives.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.intent = None;
        self.region_route = None;
        self.mesh_route = None;
        self.mesh_bypass = false;
    }

    /// Destination of the active mesh route, if long-range travel is underway.
    pub fn mesh_navigation_target(&self) -> Option<Position> {
        self.mesh_route.as_ref().and_then(|route| route.destination())
    }

    /// Abort long-range travel, keeping any single-region path intact.
    pub fn stop_mesh_navigation(&mut self) {
        self.mesh_route = None;
        self.mesh_bypass = false;
    }
}
