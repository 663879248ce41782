// Core types shared across the layout engines.
//
// Identifiers for buildings and their generated components, plus the small
// closed enums the proportion rules branch on: wall layout, opening style,
// leaf orientation, building side, and muntin band count. All derive serde
// so they can appear in `BuildingParams` JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A building instance in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "building-{}", self.0)
    }
}

/// A sub-assembly that can be rebuilt on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Platform stone courses and stairs.
    Platform,
    /// Door/window frames, leaves, dwarf walls and solid walls.
    Walls,
    /// Roof-tile curves and placed tiles.
    Tiles,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] =
        [ComponentKind::Platform, ComponentKind::Walls, ComponentKind::Tiles];

    pub fn node_name(self) -> &'static str {
        match self {
            ComponentKind::Platform => "platform",
            ComponentKind::Walls => "walls",
            ComponentKind::Tiles => "tiles",
        }
    }
}

// ---------------------------------------------------------------------------
// Style enums
// ---------------------------------------------------------------------------

/// Arrangement of enclosing walls on the pillar grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallLayout {
    /// Open pavilion: no walls.
    None,
    /// Walls on the outer pillar ring.
    #[default]
    NoCorridor,
    /// Walls one bay in on every side, leaving a surrounding corridor.
    FullCorridor,
    /// Walls one bay in on the front side only.
    FrontCorridor,
    /// Both the outer ring and the inset ring.
    DoubleRing,
}

impl WallLayout {
    /// The serialized name, for messages.
    pub fn name(self) -> &'static str {
        match self {
            WallLayout::None => "none",
            WallLayout::NoCorridor => "no_corridor",
            WallLayout::FullCorridor => "full_corridor",
            WallLayout::FrontCorridor => "front_corridor",
            WallLayout::DoubleRing => "double_ring",
        }
    }
}

/// What fills one bay of a wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallStyle {
    /// Solid masonry.
    Wall,
    /// Full-height lattice door.
    #[default]
    Door,
    /// Lattice window, on a dwarf wall when the building asks for one.
    Window,
}

impl WallStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            WallStyle::Wall => "wall",
            WallStyle::Door => "door",
            WallStyle::Window => "window",
        }
    }

    pub fn parse(s: &str) -> Option<WallStyle> {
        match s {
            "wall" => Some(WallStyle::Wall),
            "door" => Some(WallStyle::Door),
            "window" => Some(WallStyle::Window),
            _ => None,
        }
    }
}

/// Which edge a leaf pivots on, seen from the front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Left,
    Right,
}

impl Orientation {
    /// Leaves alternate left/right across an opening, starting with left.
    pub fn for_leaf(index: u32) -> Orientation {
        if index % 2 == 0 { Orientation::Left } else { Orientation::Right }
    }
}

/// Building side, by compass direction. South is the front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    South,
    East,
    North,
    West,
}

impl Side {
    /// Rotation about Z, in degrees, that turns a south-facing stair to face
    /// this side.
    pub fn stair_rotation_degrees(self) -> f64 {
        match self {
            Side::South => 0.0,
            Side::East => 90.0,
            Side::North => 180.0,
            Side::West => 270.0,
        }
    }
}

/// Number of horizontal muntin bands in a leaf. A closed set: each variant
/// has its own proportion formulas in `leaf.rs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BandCount {
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl TryFrom<u32> for BandCount {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            2 => Ok(BandCount::Two),
            3 => Ok(BandCount::Three),
            4 => Ok(BandCount::Four),
            5 => Ok(BandCount::Five),
            6 => Ok(BandCount::Six),
            _ => Err(format!("band count must be between 2 and 6, got {n}")),
        }
    }
}

impl From<BandCount> for u32 {
    fn from(b: BandCount) -> u32 {
        match b {
            BandCount::Two => 2,
            BandCount::Three => 3,
            BandCount::Four => 4,
            BandCount::Five => 5,
            BandCount::Six => 6,
        }
    }
}

impl BandCount {
    pub const ALL: [BandCount; 5] =
        [BandCount::Two, BandCount::Three, BandCount::Four, BandCount::Five, BandCount::Six];
}
