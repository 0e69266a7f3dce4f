//! Per-tick path following: the state machine that advances an agent along
//! its cached path, reconciling actual position against the expected index
//! and emitting at most one move intent per tick.

use std::hash::Hash;

use crate::constants::*;
use crate::error::{NavigationError, NavigationResult};
use crate::navigationstate::TravelIntent;
use crate::navigationsystem::NavigationSystem;
use crate::outcome::TravelOutcome;
use crate::position::Position;
use crate::request::RegionOptions;
use crate::traits::{AgentHandle, NavigationSystemExternal};

/// Result of trying to reconcile an off-path agent onto its path.
enum Placement {
    /// The agent stands on the waypoint at this index.
    Placed(usize),
    /// A move toward a placement waypoint was issued; try again next tick.
    Approaching,
}

impl<'a, Handle> NavigationSystem<'a, Handle>
where
    Handle: Hash + Eq + Copy,
{
    /// The follower tick for one agent, in fixed order: staleness check,
    /// placement check, stall check, reconciliation, move emission. At most
    /// one move intent is issued.
    pub(crate) fn move_along_path<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        destination: Position,
        range: u32,
        options: &RegionOptions,
        max_regions: u32,
    ) -> NavigationResult<TravelOutcome>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let agent = external.get_agent(entity)?;
        let pos = agent.pos();

        //
        // Don't move if the request is already satisfied.
        //

        let satisfied = pos == destination
            || (range > 0
                && pos.region() == destination.region()
                && pos.range_to(destination) <= range);

        if satisfied {
            let state = external.nav_state(entity)?;
            state.path.mark_arrived();
            self.notify(|o| o.arrived(pos));
            return Ok(TravelOutcome::Arrived);
        }

        if agent.fatigue() > 0 || agent.immobilized() {
            return Ok(TravelOutcome::Immobilized);
        }

        //
        // Invalidate the path if the intent changed or the path went stale,
        // then follow it. An exhausted path is recomputed transparently once.
        //

        let mut recomputed = false;

        loop {
            let needs_path = {
                let state = external.nav_state(entity)?;

                let fresh = state
                    .intent
                    .as_ref()
                    .map(|intent| {
                        intent.destination == destination
                            && intent.range == range
                            && self.tick.saturating_sub(intent.refreshed_at) <= PATH_STALE_TICKS
                    })
                    .unwrap_or(false);

                !(fresh && state.path.has_path() && !state.path.has_arrived())
            };

            if needs_path {
                let steps = match self.compute_path(
                    external,
                    entity,
                    pos,
                    destination,
                    range,
                    options,
                    max_regions,
                ) {
                    Ok(steps) => steps,
                    Err(err) => {
                        log::debug!("path computation failed at {}: {}", pos, err);
                        self.notify(|o| o.travel_failed(pos));
                        return Err(err);
                    }
                };

                let state = external.nav_state(entity)?;
                state.path.set_path(&steps, false, 0);
                state.intent = Some(TravelIntent {
                    destination,
                    range,
                    refreshed_at: self.tick,
                });

                self.notify(|o| o.path_recomputed(pos, &steps));
            }

            match self.advance(external, entity, &agent, pos) {
                Err(NavigationError::PathExhausted) if !recomputed => {
                    recomputed = true;

                    let state = external.nav_state(entity)?;
                    state.path.clear();
                    state.intent = None;
                }
                Err(NavigationError::PathExhausted) => {
                    self.notify(|o| o.travel_failed(pos));
                    return Err(NavigationError::NoPathFound);
                }
                other => return other,
            }
        }
    }

    /// One step of the `PLACING_ON_PATH`/`FOLLOWING`/`REROUTING` machinery.
    /// The cached path is present when this is called.
    fn advance<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        agent: &S::Agent,
        pos: Position,
    ) -> NavigationResult<TravelOutcome>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let (steps, mut cursor, force_target) = {
            let state = external.nav_state(entity)?;

            if !state.path.has_path() {
                log::warn!("agent at {} is trying to follow a missing path", pos);
                return Err(NavigationError::PathExhausted);
            }

            state.path.record_position(self.tick, pos);

            (
                state.path.path().to_vec(),
                state.path.cursor(),
                state.path.force_target(),
            )
        };

        //
        // Placement: reconcile the agent onto the path when it is not on the
        // expected waypoint. Skipped while a force drive is underway; the
        // drive is itself the recovery motion.
        //

        let on_expected = cursor
            .map(|c| steps.get(c) == Some(&pos) || steps.get(c + 1) == Some(&pos))
            .unwrap_or(false);

        if force_target.is_none() && !on_expected {
            match self.place_on_path(external, entity, agent, pos, &steps)? {
                Placement::Placed(index) => cursor = Some(index),
                Placement::Approaching => return Ok(TravelOutcome::Placing),
            }
        }

        //
        // Stall detection: no net movement across the sampling window while
        // no force drive is active triggers a local reroute.
        //

        let (stalled, samples) = {
            let state = external.nav_state(entity)?;
            (state.path.is_stalled(), state.path.stall_samples())
        };

        let force_target = if stalled {
            self.notify(|o| o.stall_detected(pos, samples as u16));
            match self.start_reroute(external, entity, pos, &steps, cursor)? {
                Some(index) => Some(index),
                None => return Ok(TravelOutcome::Arrived),
            }
        } else {
            force_target
        };

        //
        // Force drive: head straight for the chosen waypoint until reached.
        //

        if let Some(target_index) = force_target {
            match steps.get(target_index).copied() {
                Some(target) if pos == target => {
                    let state = external.nav_state(entity)?;
                    state.path.reach_force_target();
                    cursor = Some(target_index);
                }
                Some(target) => {
                    if let Some(direction) = pos.direction_to(target) {
                        match agent.move_direction(direction) {
                            Ok(()) => self.yields.mark_moving(entity),
                            Err(err) => log::debug!("reroute move rejected at {}: {}", pos, err),
                        }
                    }
                    return Ok(TravelOutcome::Rerouting);
                }
                None => {
                    // Restored state pointing past the decoded path; drop it.
                    let state = external.nav_state(entity)?;
                    state.path.reach_force_target();
                }
            }
        }

        //
        // Reconcile actual position against the expected index.
        //

        let mut cursor = match cursor {
            Some(cursor) => cursor,
            None => {
                log::warn!("agent at {} has a path but no confirmed waypoint", pos);
                return Err(NavigationError::PathExhausted);
            }
        };

        if steps.get(cursor + 1) == Some(&pos) {
            cursor += 1;
            let state = external.nav_state(entity)?;
            state.path.set_cursor(cursor);
        }

        if cursor + 1 >= steps.len() {
            let state = external.nav_state(entity)?;
            state.path.set_cursor(cursor);
            self.notify(|o| o.arrived(pos));
            return Ok(TravelOutcome::Arrived);
        }

        let mut next = steps[cursor + 1];

        //
        // Region boundary handling: an out-of-region next waypoint is only
        // followable as a crossing move from the matching edge. Otherwise
        // adopt a same-region successor two steps ahead, or give the path up.
        //

        if next.region() != pos.region() && pos.direction_to(next).is_none() {
            match steps.get(cursor + 2) {
                Some(successor)
                    if successor.region() == pos.region() && pos.range_to(*successor) <= 1 =>
                {
                    cursor += 1;
                    let state = external.nav_state(entity)?;
                    state.path.set_cursor(cursor);
                    next = *successor;
                }
                _ => return Err(NavigationError::PathExhausted),
            }
        }

        //
        // Ask the tile's occupant (or the one beyond it) to make room, then
        // emit the single move intent for this tick.
        //

        self.request_path_yields(entity, next, steps.get(cursor + 2).copied());

        match pos.direction_to(next) {
            Some(direction) => match agent.move_direction(direction) {
                Ok(()) => self.yields.mark_moving(entity),
                // Absorbed: stay in place and retry next tick.
                Err(err) => log::debug!("move rejected at {}: {}", pos, err),
            },
            None => return Err(NavigationError::PathExhausted),
        }

        let remaining: Vec<Position> = steps[cursor + 1..]
            .iter()
            .take_while(|p| p.region() == pos.region())
            .copied()
            .collect();
        self.notify(|o| o.path_followed(pos, &remaining));

        Ok(TravelOutcome::Moving)
    }

    /// Find the nearest reachable, currently-unoccupied waypoint in the
    /// agent's current region. Boundary tiles are excluded to avoid false
    /// placement next to an exit. Ties break to the first waypoint found in
    /// step order (implementation-defined).
    fn place_on_path<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        agent: &S::Agent,
        pos: Position,
        steps: &[Position],
    ) -> NavigationResult<Placement>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let mut best: Option<(u32, usize)> = None;

        for (index, waypoint) in steps.iter().enumerate() {
            if waypoint.region() != pos.region() || waypoint.is_region_edge() {
                continue;
            }
            if *waypoint != pos && !self.tile_open(*waypoint) {
                continue;
            }

            let distance = pos.range_to(*waypoint);
            if best.map(|(d, _)| distance < d).unwrap_or(true) {
                best = Some((distance, index));
            }
        }

        match best {
            Some((0, index)) => {
                let state = external.nav_state(entity)?;
                state.path.set_cursor(index);
                Ok(Placement::Placed(index))
            }
            Some((_, index)) => {
                // Not there yet: issue a short direct move toward it.
                if let Some(direction) = pos.direction_to(steps[index]) {
                    match agent.move_direction(direction) {
                        Ok(()) => self.yields.mark_moving(entity),
                        Err(err) => log::debug!("placement move rejected at {}: {}", pos, err),
                    }
                }
                Ok(Placement::Approaching)
            }
            None => {
                // Region mismatch or fully blocked: fall back to the agent's
                // default long-range movement toward the path's first waypoint.
                if let Some(first) = steps.first() {
                    match agent.move_to(*first) {
                        Ok(()) => self.yields.mark_moving(entity),
                        Err(err) => log::debug!("fallback move rejected at {}: {}", pos, err),
                    }
                }
                Ok(Placement::Approaching)
            }
        }
    }

    /// Scan forward along the remaining path for the first waypoint in the
    /// current region the agent can legally occupy and begin a force drive
    /// toward it. With no occupiable waypoint left before the path exits the
    /// region, the path is given up: arrival is forced so the caller issues
    /// a fresh travel request.
    fn start_reroute<S>(
        &mut self,
        external: &mut S,
        entity: Handle,
        pos: Position,
        steps: &[Position],
        cursor: Option<usize>,
    ) -> NavigationResult<Option<usize>>
    where
        S: NavigationSystemExternal<Handle>,
    {
        let base = cursor.unwrap_or(0);

        let mut chosen = None;
        for (index, waypoint) in steps.iter().enumerate().skip(base + 1) {
            if waypoint.region() != pos.region() {
                break;
            }
            if self.tile_open(*waypoint) {
                chosen = Some(index);
                break;
            }
        }

        match chosen {
            Some(index) => {
                let state = external.nav_state(entity)?;
                state.path.set_force_target(index);
                self.notify(|o| o.reroute_triggered(pos, steps[index]));
                Ok(Some(index))
            }
            None => {
                let state = external.nav_state(entity)?;
                state.path.mark_arrived();
                self.notify(|o| o.travel_failed(pos));
                Ok(None)
            }
        }
    }

    /// The cooperative yield protocol: when the next tile (or the one after
    /// it) is held by another controllable agent that is not itself mid-move,
    /// ask that occupant to make room. Nearest tile first, never more than
    /// one yield target per tick.
    fn request_path_yields(&mut self, entity: Handle, next: Position, beyond: Option<Position>) {
        for tile in std::iter::once(next).chain(beyond) {
            let occupants = self.occupancy.occupants_at(tile);

            if let Some(occupant) = occupants.agents.into_iter().find(|o| *o != entity) {
                if self.yields.is_moving(occupant) || self.yields.has_pending_yield(occupant) {
                    continue;
                }

                self.yields.request_yield(occupant);
                return;
            }
        }
    }
}
