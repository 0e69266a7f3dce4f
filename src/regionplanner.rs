//! Region-level travel planning: caching and recomputation of the ordered
//! region route toward a destination region.

use std::hash::Hash;

use crate::error::{NavigationError, NavigationResult};
use crate::navigationstate::RegionRoute;
use crate::navigationsystem::NavigationSystem;
use crate::position::{Position, RegionName};
use crate::request::RegionOptions;
use crate::traits::NavigationSystemExternal;

impl<'a, Handle> NavigationSystem<'a, Handle>
where
    Handle: Hash + Eq + Copy,
{
    /// Ordered list of regions to traverse from the agent's current region to
    /// `destination_region`, or `NoPathFound` when the external region search
    /// has no route.
    ///
    /// The cached route is reused until the destination region changes or the
    /// agent has confirmed entry into the next region (standing inside it,
    /// away from the boundary), at which point the full route is recomputed.
    pub fn plan_region_path<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        origin: Position,
        destination_region: RegionName,
        options: &RegionOptions,
    ) -> NavigationResult<Vec<RegionName>>
    where
        S: NavigationSystemExternal<Handle>,
    {
        if origin.region() == destination_region {
            let state = external.nav_state(entity)?;
            state.region_route = None;
            return Ok(Vec::new());
        }

        {
            let state = external.nav_state(entity)?;

            if let Some(route) = state.region_route.as_ref() {
                if route.destination == destination_region {
                    match route.next_region() {
                        Some(next) if next == origin.region() => {
                            if origin.is_region_edge() {
                                // Entered the next region but still on the
                                // boundary: not yet a confirmed transition.
                                return Ok(route.remaining().to_vec());
                            }
                            // Confirmed transition: fall through and recompute.
                        }
                        Some(_) => return Ok(route.remaining().to_vec()),
                        None => {}
                    }
                }
            }
        }

        let regions = {
            let shared: &S = &*external;
            let region_cost = |from: RegionName, to: RegionName| -> f64 {
                shared
                    .region_cost(from, to, options)
                    .unwrap_or(f64::INFINITY)
            };

            self.pathfinder
                .find_region_route(origin.region(), destination_region, &region_cost)
        };

        let state = external.nav_state(entity)?;

        match regions {
            Some(regions) => {
                state.region_route = Some(RegionRoute {
                    destination: destination_region,
                    regions: regions.clone(),
                    next_index: 0,
                });

                Ok(regions)
            }
            None => {
                state.region_route = None;

                Err(NavigationError::NoPathFound)
            }
        }
    }

    /// The next region the agent should enter on its way to
    /// `destination_region`, or `None` when it is already there.
    pub fn next_region_to_enter<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        origin: Position,
        destination_region: RegionName,
        options: &RegionOptions,
    ) -> NavigationResult<Option<RegionName>>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let route =
            self.plan_region_path(external, entity, origin, destination_region, options)?;

        Ok(route.first().copied())
    }
}
