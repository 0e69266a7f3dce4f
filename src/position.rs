use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::PositionError;

/// Identifier of a region: 1-8 ASCII alphanumeric characters stored inline,
/// so the type stays `Copy` and hash-friendly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionName {
    bytes: [u8; REGION_NAME_MAX_LEN],
    len: u8,
}

impl RegionName {
    pub fn new(name: &str) -> Result<RegionName, PositionError> {
        let raw = name.as_bytes();

        if raw.is_empty()
            || raw.len() > REGION_NAME_MAX_LEN
            || !raw.iter().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(PositionError::BadRegionName(name.to_owned()));
        }

        let mut bytes = [0u8; REGION_NAME_MAX_LEN];
        bytes[..raw.len()].copy_from_slice(raw);

        Ok(RegionName {
            bytes,
            len: raw.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionName({})", self.as_str())
    }
}

impl FromStr for RegionName {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionName::new(s)
    }
}

impl TryFrom<String> for RegionName {
    type Error = PositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RegionName::new(&value)
    }
}

impl From<RegionName> for String {
    fn from(value: RegionName) -> String {
        value.as_str().to_owned()
    }
}

/// One of the eight movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    pub fn iter() -> impl Iterator<Item = Direction> {
        [
            Direction::Top,
            Direction::TopRight,
            Direction::Right,
            Direction::BottomRight,
            Direction::Bottom,
            Direction::BottomLeft,
            Direction::Left,
            Direction::TopLeft,
        ]
        .into_iter()
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
        }
    }
}

/// A tile in the world: region identifier plus local coordinates, each in
/// `0..REGION_SIZE`. Immutable value type.
///
/// The codec form is `"<region>:<x>:<y>"`; [`Position::key`] and [`FromStr`]
/// are total inverses over valid values, and serde uses the same string form
/// so persisted structures contain only plain strings and numbers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    region: RegionName,
    x: u8,
    y: u8,
}

impl Position {
    pub fn new(region: RegionName, x: u8, y: u8) -> Result<Position, PositionError> {
        if x > REGION_EDGE_MAX || y > REGION_EDGE_MAX {
            return Err(PositionError::CoordinateOutOfBounds(x, y));
        }

        Ok(Position { region, x, y })
    }

    pub fn region(&self) -> RegionName {
        self.region
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    /// Encode into the compact string key.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.region, self.x, self.y)
    }

    /// True when the tile sits on the region boundary.
    pub fn is_region_edge(&self) -> bool {
        self.x == 0 || self.x == REGION_EDGE_MAX || self.y == 0 || self.y == REGION_EDGE_MAX
    }

    /// Chebyshev distance to `other`.
    ///
    /// Across regions the distance is only meaningful for tiles on
    /// complementary boundary edges (a crossing move); any other cross-region
    /// pair reports `u32::MAX` since region adjacency is not known here.
    pub fn range_to(&self, other: Position) -> u32 {
        if self.region == other.region {
            let dx = (self.x as i32 - other.x as i32).unsigned_abs();
            let dy = (self.y as i32 - other.y as i32).unsigned_abs();
            return dx.max(dy);
        }

        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();

        if (self.x == REGION_EDGE_MAX && other.x == 0) || (self.x == 0 && other.x == REGION_EDGE_MAX)
        {
            return 1u32.max(dy);
        }
        if (self.y == REGION_EDGE_MAX && other.y == 0) || (self.y == 0 && other.y == REGION_EDGE_MAX)
        {
            return 1u32.max(dx);
        }

        u32::MAX
    }

    /// Direction of a single step toward `other`.
    ///
    /// Within a region this is the sign of the coordinate delta. Across
    /// regions it is only defined when `self` stands on the boundary edge
    /// matching `other`'s entry edge (the crossing move); otherwise `None`.
    pub fn direction_to(&self, other: Position) -> Option<Direction> {
        if self.region == other.region {
            let dx = (other.x as i32 - self.x as i32).signum();
            let dy = (other.y as i32 - self.y as i32).signum();

            return match (dx, dy) {
                (0, -1) => Some(Direction::Top),
                (1, -1) => Some(Direction::TopRight),
                (1, 0) => Some(Direction::Right),
                (1, 1) => Some(Direction::BottomRight),
                (0, 1) => Some(Direction::Bottom),
                (-1, 1) => Some(Direction::BottomLeft),
                (-1, 0) => Some(Direction::Left),
                (-1, -1) => Some(Direction::TopLeft),
                _ => None,
            };
        }

        if self.x == REGION_EDGE_MAX && other.x == 0 {
            return Some(Direction::Right);
        }
        if self.x == 0 && other.x == REGION_EDGE_MAX {
            return Some(Direction::Left);
        }
        if self.y == REGION_EDGE_MAX && other.y == 0 {
            return Some(Direction::Bottom);
        }
        if self.y == 0 && other.y == REGION_EDGE_MAX {
            return Some(Direction::Top);
        }

        None
    }

    /// Tile one step in `direction`, staying within the region. `None` when
    /// the step would leave the grid; crossing into a neighboring region is
    /// the simulation's concern, not this type's.
    pub fn step(&self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.offset();
        let x = self.x as i32 + dx;
        let y = self.y as i32 + dy;

        if !(0..REGION_SIZE as i32).contains(&x) || !(0..REGION_SIZE as i32).contains(&y) {
            return None;
        }

        Some(Position {
            region: self.region,
            x: x as u8,
            y: y as u8,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.region, self.x, self.y)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({}:{}:{})", self.region, self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');

        let region = parts
            .next()
            .ok_or_else(|| PositionError::BadKey(s.to_owned()))?;
        let x = parts
            .next()
            .and_then(|v| v.parse::<u8>().ok())
            .ok_or_else(|| PositionError::BadKey(s.to_owned()))?;
        let y = parts
            .next()
            .and_then(|v| v.parse::<u8>().ok())
            .ok_or_else(|| PositionError::BadKey(s.to_owned()))?;

        if parts.next().is_some() {
            return Err(PositionError::BadKey(s.to_owned()));
        }

        Position::new(RegionName::new(region)?, x, y)
    }
}

impl TryFrom<String> for Position {
    type Error = PositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(value: Position) -> String {
        value.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pos(region: &str, x: u8, y: u8) -> Position {
        Position::new(RegionName::new(region).unwrap(), x, y).unwrap()
    }

    #[test]
    fn key_round_trips() {
        let p = pos("R1", 5, 49);
        assert_eq!(p.key(), "R1:5:49");
        assert_eq!(p.key().parse::<Position>().unwrap(), p);
    }

    #[test]
    fn rejects_bad_keys() {
        assert!("".parse::<Position>().is_err());
        assert!("R1:5".parse::<Position>().is_err());
        assert!("R1:5:50".parse::<Position>().is_err());
        assert!("R1:5:5:5".parse::<Position>().is_err());
        assert!("R-1:5:5".parse::<Position>().is_err());
        assert!("toolongname:5:5".parse::<Position>().is_err());
    }

    #[test]
    fn rejects_out_of_bounds_coordinates() {
        let region = RegionName::new("R1").unwrap();
        assert!(Position::new(region, 50, 0).is_err());
        assert!(Position::new(region, 0, 50).is_err());
        assert!(Position::new(region, 49, 49).is_ok());
    }

    #[test]
    fn edge_detection() {
        assert!(pos("R1", 0, 25).is_region_edge());
        assert!(pos("R1", 49, 25).is_region_edge());
        assert!(pos("R1", 25, 0).is_region_edge());
        assert!(pos("R1", 25, 49).is_region_edge());
        assert!(!pos("R1", 1, 1).is_region_edge());
    }

    #[test]
    fn in_region_direction_and_range() {
        let from = pos("R1", 10, 10);
        assert_eq!(from.direction_to(pos("R1", 10, 9)), Some(Direction::Top));
        assert_eq!(
            from.direction_to(pos("R1", 20, 20)),
            Some(Direction::BottomRight)
        );
        assert_eq!(from.direction_to(from), None);
        assert_eq!(from.range_to(pos("R1", 20, 13)), 10);
    }

    #[test]
    fn crossing_direction_and_range() {
        let exit = pos("R1", 49, 20);
        let entry = pos("R2", 0, 20);
        assert_eq!(exit.direction_to(entry), Some(Direction::Right));
        assert_eq!(entry.direction_to(exit), Some(Direction::Left));
        assert_eq!(exit.range_to(entry), 1);

        // Interior tiles of different regions have no known distance.
        assert_eq!(pos("R1", 10, 10).range_to(pos("R2", 10, 10)), u32::MAX);
        assert_eq!(pos("R1", 10, 10).direction_to(pos("R2", 10, 10)), None);
    }

    #[test]
    fn step_stays_inside_the_region() {
        assert_eq!(pos("R1", 0, 0).step(Direction::Top), None);
        assert_eq!(pos("R1", 49, 10).step(Direction::Right), None);
        assert_eq!(
            pos("R1", 5, 5).step(Direction::BottomLeft),
            Some(pos("R1", 4, 6))
        );
    }

    proptest! {
        #[test]
        fn decode_encode_is_identity(
            region in "[A-Za-z0-9]{1,8}",
            x in 0u8..REGION_SIZE,
            y in 0u8..REGION_SIZE,
        ) {
            let p = Position::new(RegionName::new(&region).unwrap(), x, y).unwrap();
            prop_assert_eq!(p.key().parse::<Position>().unwrap(), p);
        }
    }
}
