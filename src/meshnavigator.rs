//! Long-range travel driven by a precomputed region-mesh route, with
//! fallback to region-by-region routing when the mesh has no usable route.

use std::hash::Hash;

use crate::constants::*;
use crate::error::{NavigationError, NavigationResult};
use crate::navigationstate::MeshRoute;
use crate::navigationsystem::NavigationSystem;
use crate::outcome::TravelOutcome;
use crate::position::Position;
use crate::request::{HazardBehavior, TravelRequest};
use crate::traits::{AgentHandle, MeshSearchOptions, NavigationSystemExternal};

/// What the navigator tracks this tick.
enum Leg {
    /// Head within range of a mesh waypoint.
    Waypoint(Position),
    /// No usable mesh route (or it is exhausted): travel toward the final
    /// destination directly, which routes region-by-region as needed.
    Direct,
}

impl<'a, Handle> NavigationSystem<'a, Handle>
where
    Handle: Hash + Eq + Copy,
{
    /// Advance `entity` toward a distant destination using the mesh route for
    /// the request's destination, requesting one from the mesh search when
    /// the destination changed. `NoPathFound` marks the agent to bypass mesh
    /// navigation until travel is restarted toward a new destination.
    pub fn travel_across_regions<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        request: &TravelRequest,
    ) -> NavigationResult<TravelOutcome>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let destination = request.destination();
        let range = request.range();
        let options = request.region_options.unwrap_or_default();
        let max_regions = request.max_regions;

        let agent = external.get_agent(entity)?;
        let pos = agent.pos();

        //
        // Refresh the mesh route when the destination changed.
        //

        let needs_route = {
            let state = external.nav_state(entity)?;
            state
                .mesh_route
                .as_ref()
                .map(|route| !route.is_for(destination))
                .unwrap_or(true)
        };

        if needs_route {
            let mesh_options = MeshSearchOptions {
                avoid_hazard: !matches!(options.hazard_behavior(), HazardBehavior::Allow),
            };

            let result = self.mesh.find_mesh_path(pos, destination, &mesh_options);

            let state = external.nav_state(entity)?;
            state.mesh_bypass = false;
            state.mesh_route = Some(match result.path {
                Some(path) if !path.is_empty() => {
                    MeshRoute::new(destination, &path, result.incomplete)
                }
                // Remember the empty answer so the mesh is not re-queried
                // every tick for the same destination.
                _ => MeshRoute::no_route(destination),
            });
        }

        let bypassed = {
            let state = external.nav_state(entity)?;
            state.mesh_bypass
        };

        if bypassed {
            return self.move_along_path(external, entity, destination, range, &options, max_regions);
        }

        //
        // Pick the waypoint to track this tick. Reaching a waypoint advances
        // the cursor and immediately retargets the next one within the same
        // tick, so the agent never sits a tick out on a waypoint.
        //

        let leg = {
            let state = external.nav_state(entity)?;
            let route = match state.mesh_route.as_mut() {
                Some(route) => route,
                None => return Err(NavigationError::StateMissing(pos.key())),
            };

            if !route.has_waypoints() {
                Leg::Direct
            } else {
                // A consumed waypoint list ends the mesh leg either way: a
                // complete route hands over to the final approach, a partial
                // one to region-by-region travel. Both are the direct leg.
                match route.current_waypoint() {
                    Some(waypoint) if pos.range_to(waypoint) <= MESH_WAYPOINT_RANGE => {
                        route.advance();
                        match route.current_waypoint() {
                            Some(next_waypoint) => Leg::Waypoint(next_waypoint),
                            None => Leg::Direct,
                        }
                    }
                    Some(waypoint) => Leg::Waypoint(waypoint),
                    None => Leg::Direct,
                }
            }
        };

        match leg {
            Leg::Waypoint(waypoint) => {
                match self.move_along_path(
                    external,
                    entity,
                    waypoint,
                    MESH_WAYPOINT_RANGE,
                    &options,
                    max_regions,
                ) {
                    Err(NavigationError::NoPathFound) => {
                        // No progress toward the waypoint: bypass the mesh for
                        // this destination and let the caller fall back to
                        // unconstrained long-range movement.
                        let state = external.nav_state(entity)?;
                        state.mesh_bypass = true;

                        Err(NavigationError::NoPathFound)
                    }
                    other => other,
                }
            }
            Leg::Direct => {
                self.move_along_path(external, entity, destination, range, &options, max_regions)
            }
        }
    }
}
