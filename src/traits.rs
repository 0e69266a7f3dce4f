use crate::error::NavigationError;
use crate::navigationstate::NavigationState;
use crate::position::{Direction, Position, RegionName};
use crate::request::RegionOptions;

/// Abstraction over an agent game object. Provides the subset of the agent
/// API the navigation engine needs; any agent kind with a position and a
/// per-tick move intent can be driven by the same engine.
pub trait AgentHandle {
    fn pos(&self) -> Position;

    /// Remaining fatigue; an agent with nonzero fatigue cannot move this tick.
    fn fatigue(&self) -> u32;

    /// True while the agent is unable to act for reasons other than fatigue
    /// (still materializing, externally pinned, ...).
    fn immobilized(&self) -> bool {
        false
    }

    /// Emit the single move intent for this tick: one step in `direction`.
    fn move_direction(&self, direction: Direction) -> Result<(), String>;

    /// The agent's default long-range movement toward `target`, used as a
    /// fallback when the engine cannot place the agent on its path.
    fn move_to(&self, target: Position) -> Result<(), String>;
}

/// Constraints handed to the grid pathfinder for a single search.
pub struct SearchConstraints {
    /// Regions the search may enter. Always contains the origin region.
    pub allowed_regions: Vec<RegionName>,
    /// Cap on the number of regions the path may traverse.
    pub max_regions: u32,
    /// Operation budget for the search.
    pub max_ops: u32,
    /// Avoid hazardous terrain where the implementation distinguishes it.
    pub avoid_hazard: bool,
}

/// Abstraction over the external cost-weighted grid pathfinder and the
/// region-adjacency search.
pub trait PathfindingProvider {
    /// Single-target pathfinding. Returns the waypoint sequence from `origin`
    /// to within `range` of `goal`, or `None` (never a panic) when no path
    /// exists within the budget.
    fn find_path(
        &mut self,
        origin: Position,
        goal: Position,
        range: u32,
        constraints: &SearchConstraints,
    ) -> Option<Vec<Position>>;

    /// Region-level route search. `region_cost` returns the traversal cost of
    /// entering `to` from `from`; `f64::INFINITY` excludes the edge. The
    /// returned route excludes the starting region and ends with `to`.
    fn find_region_route(
        &self,
        from: RegionName,
        to: RegionName,
        region_cost: &dyn Fn(RegionName, RegionName) -> f64,
    ) -> Option<Vec<RegionName>>;

    /// Terrain check: can the tile ever be occupied?
    fn is_tile_walkable(&self, position: Position) -> bool;
}

pub struct MeshSearchOptions {
    pub avoid_hazard: bool,
}

/// Result of a mesh search. `incomplete` signals the mesh could not fully
/// connect start to destination; a partial route is usable as far as it goes.
pub struct MeshSearchResult {
    pub path: Option<Vec<Position>>,
    pub incomplete: bool,
}

/// Abstraction over the precomputed region-mesh search used for long-range
/// travel.
pub trait MeshSearchProvider {
    fn find_mesh_path(
        &mut self,
        from: Position,
        to: Position,
        options: &MeshSearchOptions,
    ) -> MeshSearchResult;
}

/// The cooperative yield service. The engine only requests yields and marks
/// itself moving; which agent actually moves is the implementor's concern,
/// and a denied yield is simply retried next tick.
pub trait YieldCoordinator<Handle> {
    /// Ask `occupant` to vacate or avoid its tile this tick.
    fn request_yield(&mut self, occupant: Handle);

    /// Record that `agent` has emitted a move intent this tick.
    fn mark_moving(&mut self, agent: Handle);

    fn has_pending_yield(&self, agent: Handle) -> bool;

    fn is_moving(&self, agent: Handle) -> bool;
}

/// What currently occupies a tile.
pub struct TileOccupancy<Handle> {
    /// Controllable agents standing on the tile.
    pub agents: Vec<Handle>,
    /// A structure that cannot be walked over.
    pub impassable_structure: bool,
    /// A construction site that blocks movement.
    pub impassable_site: bool,
}

impl<Handle> TileOccupancy<Handle> {
    pub fn empty() -> Self {
        TileOccupancy {
            agents: Vec::new(),
            impassable_structure: false,
            impassable_site: false,
        }
    }

    pub fn blocked(&self) -> bool {
        self.impassable_structure || self.impassable_site
    }
}

impl<Handle> Default for TileOccupancy<Handle> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Read-only tile occupancy queries, owned by the broader simulation.
pub trait OccupancyProvider<Handle> {
    fn occupants_at(&self, position: Position) -> TileOccupancy<Handle>;
}

/// Structured diagnostics hook. The engine reports *what* happened and the
/// implementor decides how to render or record it (or not). All callbacks
/// default to no-ops.
pub trait NavigationObserver {
    /// A fresh path was computed. `path` contains the full waypoint sequence.
    fn path_recomputed(&mut self, agent_pos: Position, path: &[Position]) {
        let _ = (agent_pos, path);
    }

    /// The agent advanced along its path. `remaining` holds the waypoints
    /// still ahead in the agent's current region.
    fn path_followed(&mut self, agent_pos: Position, remaining: &[Position]) {
        let _ = (agent_pos, remaining);
    }

    /// A stall triggered a local reroute toward `target`.
    fn reroute_triggered(&mut self, agent_pos: Position, target: Position) {
        let _ = (agent_pos, target);
    }

    /// The agent has not moved across the sampling window.
    fn stall_detected(&mut self, agent_pos: Position, samples: u16) {
        let _ = (agent_pos, samples);
    }

    fn arrived(&mut self, agent_pos: Position) {
        let _ = agent_pos;
    }

    /// Movement failed this tick (no path, or the engine gave up on one).
    fn travel_failed(&mut self, agent_pos: Position) {
        let _ = agent_pos;
    }
}

/// Services the embedding simulation provides per agent: handle resolution,
/// navigation state storage and region traversal costs.
pub trait NavigationSystemExternal<Handle> {
    type Agent: AgentHandle;

    fn get_agent(&self, entity: Handle) -> Result<Self::Agent, NavigationError>;

    fn nav_state(&mut self, entity: Handle) -> Result<&mut NavigationState, NavigationError>;

    /// Cost of entering `to` from `from` for region routing, or `None` when
    /// the transition is forbidden. The default treats all regions as
    /// uniformly traversable; implementors apply `options` to price or
    /// exclude hazardous regions.
    fn region_cost(
        &self,
        from: RegionName,
        to: RegionName,
        options: &RegionOptions,
    ) -> Option<f64> {
        let _ = (from, to, options);

        Some(1.0)
    }
}
