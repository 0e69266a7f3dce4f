use std::collections::HashMap;
use std::hash::Hash;

use crate::constants::*;
use crate::error::{NavigationError, NavigationResult};
use crate::outcome::{TravelOutcome, TravelResults};
use crate::position::{Position, RegionName};
use crate::request::*;
use crate::traits::*;

/// Travel requests accumulated over a tick, one per agent. Filled by jobs,
/// drained by [`NavigationSystem::process`].
pub struct NavigationData<Handle>
where
    Handle: Hash + Eq,
{
    requests: HashMap<Handle, TravelRequest>,
}

impl<Handle> Default for NavigationData<Handle>
where
    Handle: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Handle> NavigationData<Handle>
where
    Handle: Hash + Eq,
{
    pub fn new() -> NavigationData<Handle> {
        NavigationData {
            requests: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Request path-following travel to `destination` for `entity`,
    /// replacing any previous request.
    pub fn travel_to(
        &mut self,
        entity: Handle,
        destination: Position,
    ) -> TravelRequestBuilder<'_> {
        self.requests
            .entry(entity)
            .and_modify(|e| *e = TravelRequest::move_to(destination))
            .or_insert_with(|| TravelRequest::move_to(destination))
            .into()
    }

    /// Request mesh-driven long-range travel to `destination` for `entity`,
    /// replacing any previous request.
    pub fn travel_across_regions(
        &mut self,
        entity: Handle,
        destination: Position,
    ) -> TravelRequestBuilder<'_> {
        self.requests
            .entry(entity)
            .and_modify(|e| *e = TravelRequest::across_regions(destination))
            .or_insert_with(|| TravelRequest::across_regions(destination))
            .into()
    }

    pub(crate) fn into_requests(self) -> HashMap<Handle, TravelRequest> {
        self.requests
    }
}

/// The per-tick navigation engine. Constructed fresh each tick with the
/// current tick counter and borrows of the external collaborators; all
/// per-agent state lives in the external's `NavigationState` storage.
pub struct NavigationSystem<'a, Handle> {
    pub(crate) pathfinder: &'a mut dyn PathfindingProvider,
    pub(crate) mesh: &'a mut dyn MeshSearchProvider,
    pub(crate) occupancy: &'a dyn OccupancyProvider<Handle>,
    pub(crate) yields: &'a mut dyn YieldCoordinator<Handle>,
    pub(crate) observer: Option<&'a mut dyn NavigationObserver>,
    pub(crate) tick: u32,
    pub(crate) max_ops_per_region: u32,
}

impl<'a, Handle> NavigationSystem<'a, Handle>
where
    Handle: Hash + Eq + Copy,
{
    pub fn new(
        pathfinder: &'a mut dyn PathfindingProvider,
        mesh: &'a mut dyn MeshSearchProvider,
        occupancy: &'a dyn OccupancyProvider<Handle>,
        yields: &'a mut dyn YieldCoordinator<Handle>,
        tick: u32,
    ) -> Self {
        Self {
            pathfinder,
            mesh,
            occupancy,
            yields,
            observer: None,
            tick,
            max_ops_per_region: DEFAULT_MAX_OPS_PER_REGION,
        }
    }

    pub fn set_observer(&mut self, observer: &'a mut dyn NavigationObserver) {
        self.observer = Some(observer);
    }

    pub fn set_max_ops_per_region(&mut self, max_ops: u32) {
        self.max_ops_per_region = max_ops;
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Resolve every queued request, recording one result per agent.
    pub fn process<S>(&mut self, external: &mut S, data: NavigationData<Handle>) -> TravelResults<Handle>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let mut results = TravelResults::new();

        for (entity, request) in data.into_requests() {
            let outcome = match request.goal {
                TravelGoal::MoveTo { .. } => self.go_to(external, entity, &request),
                TravelGoal::AcrossRegions { .. } => {
                    self.travel_across_regions(external, entity, &request)
                }
            };

            if let Err(err) = &outcome {
                log::debug!("navigation failed for an agent: {}", err);
            }

            results.insert(entity, outcome.into());
        }

        results
    }

    /// Advance `entity` one step toward the request's destination, computing
    /// or refreshing the cached path as needed. `Ok` means movement was
    /// attempted or is possible this tick.
    pub fn go_to<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        request: &TravelRequest,
    ) -> NavigationResult<TravelOutcome>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let options = request.region_options.unwrap_or_default();

        self.move_along_path(
            external,
            entity,
            request.destination(),
            request.range(),
            &options,
            request.max_regions,
        )
    }

    /// Compute a fresh waypoint path from `origin` to within `range` of
    /// `destination`, routing region-by-region first when the destination
    /// lies in another region.
    pub(crate) fn compute_path<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        origin: Position,
        destination: Position,
        range: u32,
        options: &RegionOptions,
        max_regions: u32,
    ) -> NavigationResult<Vec<Position>>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let route = if origin.region() != destination.region() {
            self.plan_region_path(external, entity, origin, destination.region(), options)?
        } else {
            Vec::new()
        };

        if route.len() as u32 + 1 > max_regions {
            log::debug!(
                "region route of {} regions exceeds the budget of {}",
                route.len() + 1,
                max_regions
            );
            return Err(NavigationError::NoPathFound);
        }

        let mut allowed_regions: Vec<RegionName> = Vec::with_capacity(route.len() + 2);
        allowed_regions.push(origin.region());
        for region in route {
            if !allowed_regions.contains(&region) {
                allowed_regions.push(region);
            }
        }
        if !allowed_regions.contains(&destination.region()) {
            allowed_regions.push(destination.region());
        }

        let max_ops = allowed_regions.len() as u32 * self.max_ops_per_region;
        let avoid_hazard = !matches!(options.hazard_behavior(), HazardBehavior::Allow);

        let constraints = SearchConstraints {
            allowed_regions,
            max_regions,
            max_ops,
            avoid_hazard,
        };

        //TODO: Increase the op budget and retry when the search exhausts it.
        let mut steps = self
            .pathfinder
            .find_path(origin, destination, range, &constraints)
            .ok_or(NavigationError::NoPathFound)?;

        if steps.first() != Some(&origin) {
            steps.insert(0, origin);
        }

        Ok(steps)
    }

    /// A tile the agent could legally occupy right now: walkable terrain and
    /// no agent or impassable blocker on it.
    pub(crate) fn tile_open(&self, position: Position) -> bool {
        if !self.pathfinder.is_tile_walkable(position) {
            return false;
        }

        let occupants = self.occupancy.occupants_at(position);

        occupants.agents.is_empty() && !occupants.blocked()
    }

    pub(crate) fn notify(&mut self, event: impl FnOnce(&mut dyn NavigationObserver)) {
        if let Some(observer) = self.observer.as_deref_mut() {
            event(observer);
        }
    }
}
