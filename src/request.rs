use crate::constants::*;
use crate::position::Position;

/// How region routing treats hazardous regions.
#[derive(Copy, Clone, Debug)]
pub enum HazardBehavior {
    Allow,
    HighCost,
    Deny,
}

#[derive(Copy, Clone, Debug)]
pub struct RegionOptions {
    hazard_behavior: HazardBehavior,
}

impl RegionOptions {
    pub fn new(hazard_behavior: HazardBehavior) -> RegionOptions {
        Self { hazard_behavior }
    }

    pub fn hazard_behavior(&self) -> HazardBehavior {
        self.hazard_behavior
    }
}

impl Default for RegionOptions {
    fn default() -> Self {
        RegionOptions {
            hazard_behavior: HazardBehavior::Deny,
        }
    }
}

/// Describes the movement goal for an agent.
pub(crate) enum TravelGoal {
    /// Move to a fixed position within range, following a cached path.
    MoveTo { destination: Position, range: u32 },
    /// Long-range travel driven by the mesh navigator, falling back to
    /// region-by-region routing when the mesh has no route.
    AcrossRegions { destination: Position, range: u32 },
}

pub struct TravelRequest {
    pub(crate) goal: TravelGoal,
    pub(crate) region_options: Option<RegionOptions>,
    pub(crate) max_regions: u32,
}

impl TravelRequest {
    pub fn move_to(destination: Position) -> TravelRequest {
        TravelRequest {
            goal: TravelGoal::MoveTo {
                destination,
                range: 0,
            },
            region_options: None,
            max_regions: DEFAULT_MAX_REGIONS,
        }
    }

    pub fn across_regions(destination: Position) -> TravelRequest {
        TravelRequest {
            goal: TravelGoal::AcrossRegions {
                destination,
                range: 0,
            },
            region_options: None,
            max_regions: DEFAULT_MAX_REGIONS,
        }
    }

    pub fn destination(&self) -> Position {
        match &self.goal {
            TravelGoal::MoveTo { destination, .. } => *destination,
            TravelGoal::AcrossRegions { destination, .. } => *destination,
        }
    }

    pub fn range(&self) -> u32 {
        match &self.goal {
            TravelGoal::MoveTo { range, .. } => *range,
            TravelGoal::AcrossRegions { range, .. } => *range,
        }
    }

    pub fn builder(&mut self) -> TravelRequestBuilder<'_> {
        self.into()
    }
}

pub struct TravelRequestBuilder<'a> {
    request: &'a mut TravelRequest,
}

impl<'a> From<&'a mut TravelRequest> for TravelRequestBuilder<'a> {
    fn from(request: &'a mut TravelRequest) -> TravelRequestBuilder<'a> {
        TravelRequestBuilder { request }
    }
}

impl<'a> TravelRequestBuilder<'a> {
    /// Arrival range: the request is satisfied within this Chebyshev distance
    /// of the destination.
    pub fn range(&mut self, range: u32) -> &mut Self {
        match &mut self.request.goal {
            TravelGoal::MoveTo { range: ref mut r, .. } => *r = range,
            TravelGoal::AcrossRegions { range: ref mut r, .. } => *r = range,
        }

        self
    }

    pub fn region_options(&mut self, options: RegionOptions) -> &mut Self {
        self.request.region_options = Some(options);

        self
    }

    /// Shorthand for permitting hazardous regions on the route.
    pub fn allow_hazard(&mut self, allow: bool) -> &mut Self {
        let behavior = if allow {
            HazardBehavior::Allow
        } else {
            HazardBehavior::Deny
        };
        self.request.region_options = Some(RegionOptions::new(behavior));

        self
    }

    /// Cap on how many regions a computed path may traverse.
    pub fn max_regions(&mut self, max_regions: u32) -> &mut Self {
        self.request.max_regions = max_regions;

        self
    }
}
