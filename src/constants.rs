/// Width and height of a region in tiles.
pub const REGION_SIZE: u8 = 50;

/// Largest valid tile coordinate within a region.
pub const REGION_EDGE_MAX: u8 = REGION_SIZE - 1;

/// Maximum length of a region identifier in bytes.
pub const REGION_NAME_MAX_LEN: usize = 8;

/// Ticks a cached path may go unrefreshed before it is recomputed.
pub const PATH_STALE_TICKS: u32 = 10;

/// Number of slots in the recent-position ring used for stall detection.
pub const POSITION_RING_SLOTS: usize = 5;

/// Minimum number of filled ring slots before a stall can be declared.
pub const STALL_MIN_SAMPLES: usize = 3;

/// Default pathfinder operation budget granted per whitelisted region.
pub const DEFAULT_MAX_OPS_PER_REGION: u32 = 2000;

/// Default cap on the number of regions a single path may traverse.
pub const DEFAULT_MAX_REGIONS: u32 = 16;

/// An agent tracks a mesh waypoint once it is within this range of it.
pub const MESH_WAYPOINT_RANGE: u32 = 1;
