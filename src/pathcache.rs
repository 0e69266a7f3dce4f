use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::position::Position;

/// Fixed-size ring of recently visited positions, keyed by `tick % slots`.
/// Used only to detect "no net movement over the last few ticks".
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PositionRing {
    slots: [Option<String>; POSITION_RING_SLOTS],
}

impl PositionRing {
    pub fn record(&mut self, tick: u32, key: String) {
        self.slots[tick as usize % POSITION_RING_SLOTS] = Some(key);
    }

    pub fn samples(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when enough slots are filled and every filled slot holds the
    /// identical position. Oscillation between two tiles is an accepted
    /// false negative.
    pub fn is_stalled(&self) -> bool {
        let mut filled = self.slots.iter().flatten();

        let first = match filled.next() {
            Some(key) => key,
            None => return false,
        };

        self.samples() >= STALL_MIN_SAMPLES && filled.all(|key| key == first)
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

/// The serialized route an agent is following, owned exclusively by that
/// agent. Steps are stored as encoded position keys; decoding is memoized
/// per stored path and never persisted.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CachedPath {
    steps: Vec<String>,
    cursor: Option<usize>,
    arrived: bool,
    force_target: Option<usize>,
    recent: PositionRing,

    #[serde(skip)]
    decoded: Option<Vec<Position>>,
}

impl CachedPath {
    /// Store a new path, optionally reversed and/or shortened from the end by
    /// `truncate_by` steps. Always clears the cursor, the arrived flag, any
    /// active force target and the decode memo.
    pub fn set_path(&mut self, steps: &[Position], reverse: bool, truncate_by: usize) {
        let mut keys: Vec<String> = steps.iter().map(|p| p.key()).collect();

        if reverse {
            keys.reverse();
        }

        let keep = keys.len().saturating_sub(truncate_by);
        keys.truncate(keep);

        self.steps = keys;
        self.cursor = None;
        self.arrived = false;
        self.force_target = None;
        self.decoded = None;
    }

    /// Decoded waypoint sequence. Empty when no path is stored.
    pub fn path(&mut self) -> &[Position] {
        if self.decoded.is_none() {
            let decoded = self
                .steps
                .iter()
                .filter_map(|key| match key.parse::<Position>() {
                    Ok(position) => Some(position),
                    Err(err) => {
                        log::warn!("discarding unparseable path step `{}`: {}", key, err);
                        None
                    }
                })
                .collect();

            self.decoded = Some(decoded);
        }

        self.decoded.as_deref().unwrap_or(&[])
    }

    pub fn has_path(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        *self = CachedPath::default();
    }

    pub fn has_arrived(&self) -> bool {
        self.has_path() && self.arrived
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Confirm the agent has reached the waypoint at `index`. Out-of-range
    /// indices are ignored so the cursor always stays valid.
    pub fn set_cursor(&mut self, index: usize) {
        if index < self.steps.len() {
            self.cursor = Some(index);
            self.arrived = index + 1 == self.steps.len();
        }
    }

    /// Force the arrived flag without reaching the final waypoint. Used when
    /// the engine gives up on a path so the caller issues a fresh request.
    pub fn mark_arrived(&mut self) {
        if self.has_path() {
            self.arrived = true;
        }
    }

    pub fn force_target(&self) -> Option<usize> {
        self.force_target
    }

    /// Begin driving the agent toward the waypoint at `index`. The index must
    /// lie on the path at or past the cursor.
    pub fn set_force_target(&mut self, index: usize) {
        if index < self.steps.len() && index >= self.cursor.unwrap_or(0) {
            self.force_target = Some(index);
        }
    }

    /// The force target has been reached: confirm it as the cursor and clear
    /// it, resuming normal following from that index.
    pub fn reach_force_target(&mut self) {
        if let Some(index) = self.force_target.take() {
            self.set_cursor(index);
        }
    }

    pub fn record_position(&mut self, tick: u32, position: Position) {
        self.recent.record(tick, position.key());
    }

    pub fn stall_samples(&self) -> usize {
        self.recent.samples()
    }

    /// Stall is only declared while no force target is active; the force
    /// drive is itself the recovery from the last detected stall.
    pub fn is_stalled(&self) -> bool {
        self.force_target.is_none() && self.recent.is_stalled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::RegionName;

    fn pos(x: u8, y: u8) -> Position {
        Position::new(RegionName::new("R1").unwrap(), x, y).unwrap()
    }

    fn line(len: u8) -> Vec<Position> {
        (0..len).map(|x| pos(x, 5)).collect()
    }

    #[test]
    fn set_path_stores_and_clear_removes() {
        let mut cache = CachedPath::default();
        assert!(!cache.has_path());
        assert!(cache.path().is_empty());

        let steps = line(4);
        cache.set_path(&steps, false, 0);
        assert!(cache.has_path());
        assert_eq!(cache.path(), &steps[..]);
        assert_eq!(cache.cursor(), None);
        assert!(!cache.has_arrived());

        cache.clear();
        assert!(!cache.has_path());
        assert!(!cache.has_arrived());
    }

    #[test]
    fn set_path_reverse_and_truncate() {
        let mut cache = CachedPath::default();
        let steps = line(5);

        cache.set_path(&steps, true, 2);
        let expected = [pos(4, 5), pos(3, 5), pos(2, 5)];
        assert_eq!(cache.path(), &expected[..]);
    }

    #[test]
    fn cursor_tracks_arrival() {
        let mut cache = CachedPath::default();
        cache.set_path(&line(3), false, 0);

        cache.set_cursor(1);
        assert_eq!(cache.cursor(), Some(1));
        assert!(!cache.has_arrived());

        cache.set_cursor(2);
        assert!(cache.has_arrived());

        // Out-of-range confirmations are ignored.
        cache.set_cursor(7);
        assert_eq!(cache.cursor(), Some(2));
    }

    #[test]
    fn force_target_respects_cursor_and_hands_off() {
        let mut cache = CachedPath::default();
        cache.set_path(&line(6), false, 0);
        cache.set_cursor(2);

        cache.set_force_target(1);
        assert_eq!(cache.force_target(), None);

        cache.set_force_target(4);
        assert_eq!(cache.force_target(), Some(4));

        cache.reach_force_target();
        assert_eq!(cache.force_target(), None);
        assert_eq!(cache.cursor(), Some(4));
    }

    #[test]
    fn stall_requires_identical_samples() {
        let mut cache = CachedPath::default();
        cache.set_path(&line(6), false, 0);

        cache.record_position(0, pos(2, 5));
        cache.record_position(1, pos(2, 5));
        assert!(!cache.is_stalled(), "two samples are not enough");

        cache.record_position(2, pos(2, 5));
        assert!(cache.is_stalled());

        cache.record_position(3, pos(3, 5));
        assert!(!cache.is_stalled(), "any differing sample clears the stall");
    }

    #[test]
    fn stall_suppressed_while_force_target_active() {
        let mut cache = CachedPath::default();
        cache.set_path(&line(6), false, 0);
        cache.set_cursor(0);

        for tick in 0..5 {
            cache.record_position(tick, pos(0, 5));
        }
        assert!(cache.is_stalled());

        cache.set_force_target(3);
        assert!(!cache.is_stalled());
    }

    #[test]
    fn ring_overwrites_by_tick_modulo() {
        let mut ring = PositionRing::default();

        for tick in 0..7 {
            ring.record(tick, pos(tick as u8, 0).key());
        }
        assert_eq!(ring.samples(), POSITION_RING_SLOTS);
        assert!(!ring.is_stalled());

        for tick in 7..12 {
            ring.record(tick, pos(9, 9).key());
        }
        assert!(ring.is_stalled());
    }
}
