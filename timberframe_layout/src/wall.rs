// Wall openings on the pillar grid.
//
// An opening is one bay between two pillars, written in net notation as
// `style#x/y#x/y`: the style name, then the pillar indices (into `net_x`,
// `net_y`) at each end. A wall net is a comma-separated list of openings;
// empty entries (a trailing comma) are ignored.
//
// Openings come from one of two places. An explicit `wall_net` string on
// the building wins. Otherwise `WallLayout` generates enclosing rings:
//
//   None           no walls
//   NoCorridor     the perimeter ring
//   FullCorridor   the ring inset one pillar on every side
//   FrontCorridor  the ring inset one pillar on the front (south) side only
//   DoubleRing     the perimeter ring and the fully inset ring
//
// Within each ring, the centre bay of the front side is a door (or a solid
// wall if the building's style is solid wall), the other front bays take
// the building's wall style, and every other bay is solid wall.
//
// Placement: each opening is centred on the midpoint of its two pillars,
// rotated about Z so that local X runs from the first pillar to the second.
// Solid walls are a single stone box; doors and windows go through
// `door::layout_opening`.
//
// See also: `steps.rs`, which puts stairs in front of centred doors.

use crate::config::LayoutConfig;
use crate::door::layout_opening;
use crate::error::{LayoutError, LayoutResult};
use crate::floor::FloorNet;
use crate::lattice::LatticeUnit;
use crate::params::BuildingParams;
use crate::types::{WallLayout, WallStyle};
use std::fmt;
use timberframe_scene::{Assembly, Euler, MaterialRef, Member, Vec3};

// ---------------------------------------------------------------------------
// Net notation
// ---------------------------------------------------------------------------

/// Pillar grid indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pillar {
    pub x: usize,
    pub y: usize,
}

impl Pillar {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One bay of wall between two adjacent-in-line pillars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallOpening {
    pub style: WallStyle,
    pub from: Pillar,
    pub to: Pillar,
}

impl fmt::Display for WallOpening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}/{}#{}/{}",
            self.style.as_str(),
            self.from.x,
            self.from.y,
            self.to.x,
            self.to.y
        )
    }
}

fn net_error(entry: &str, reason: &'static str) -> LayoutError {
    LayoutError::WallNet { entry: entry.to_string(), reason }
}

fn parse_pillar(entry: &str, field: &str) -> LayoutResult<Pillar> {
    let (x, y) = field.split_once('/').ok_or_else(|| net_error(entry, "pillar must be written x/y"))?;
    let x = x.trim().parse().map_err(|_| net_error(entry, "pillar x index is not a number"))?;
    let y = y.trim().parse().map_err(|_| net_error(entry, "pillar y index is not a number"))?;
    Ok(Pillar { x, y })
}

/// Parse a wall net. Checks syntax and shape only; indices are checked
/// against the floor by `openings_for`.
pub fn parse_wall_net(net: &str) -> LayoutResult<Vec<WallOpening>> {
    let mut out = Vec::new();
    for entry in net.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let fields: Vec<&str> = entry.split('#').collect();
        let [style, from, to] = fields[..] else {
            return Err(net_error(entry, "expected style#x/y#x/y"));
        };
        let style = WallStyle::parse(style.trim()).ok_or_else(|| net_error(entry, "unknown style"))?;
        let from = parse_pillar(entry, from)?;
        let to = parse_pillar(entry, to)?;
        if from == to {
            return Err(net_error(entry, "both ends are the same pillar"));
        }
        if from.x != to.x && from.y != to.y {
            return Err(net_error(entry, "opening must run along one grid axis"));
        }
        out.push(WallOpening { style, from, to });
    }
    Ok(out)
}

pub fn format_wall_net(openings: &[WallOpening]) -> String {
    openings.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

// ---------------------------------------------------------------------------
// Generated rings
// ---------------------------------------------------------------------------

/// Inclusive pillar index bounds of one enclosing ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Ring {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Ring {
    /// Front side first (west to east), then east, north and west sides.
    fn openings(self, style: WallStyle) -> Vec<WallOpening> {
        let front_style = |i: usize| {
            if 2 * i + 1 == self.x0 + self.x1 {
                if style == WallStyle::Wall { WallStyle::Wall } else { WallStyle::Door }
            } else {
                style
            }
        };
        let mut out = Vec::new();
        for i in self.x0..self.x1 {
            out.push(WallOpening { style: front_style(i), from: Pillar::new(i, self.y0), to: Pillar::new(i + 1, self.y0) });
        }
        for j in self.y0..self.y1 {
            out.push(WallOpening { style: WallStyle::Wall, from: Pillar::new(self.x1, j), to: Pillar::new(self.x1, j + 1) });
        }
        for i in self.x0..self.x1 {
            out.push(WallOpening { style: WallStyle::Wall, from: Pillar::new(i, self.y1), to: Pillar::new(i + 1, self.y1) });
        }
        for j in self.y0..self.y1 {
            out.push(WallOpening { style: WallStyle::Wall, from: Pillar::new(self.x0, j), to: Pillar::new(self.x0, j + 1) });
        }
        out
    }
}

/// Openings generated by a wall layout on an `nx` by `ny` pillar grid.
pub fn generate_openings(layout: WallLayout, style: WallStyle, nx: usize, ny: usize) -> LayoutResult<Vec<WallOpening>> {
    if nx < 2 || ny < 2 {
        return Err(LayoutError::WallLayout { layout: layout.name(), needed: "at least one bay on each axis" });
    }
    let outer = Ring { x0: 0, y0: 0, x1: nx - 1, y1: ny - 1 };
    let inset = || {
        if nx >= 4 && ny >= 4 {
            Ok(Ring { x0: 1, y0: 1, x1: nx - 2, y1: ny - 2 })
        } else {
            Err(LayoutError::WallLayout { layout: layout.name(), needed: "at least three bays on each axis" })
        }
    };
    let rings = match layout {
        WallLayout::None => vec![],
        WallLayout::NoCorridor => vec![outer],
        WallLayout::FullCorridor => vec![inset()?],
        WallLayout::FrontCorridor => {
            if ny < 3 {
                return Err(LayoutError::WallLayout { layout: layout.name(), needed: "at least two bays in depth" });
            }
            vec![Ring { y0: 1, ..outer }]
        }
        WallLayout::DoubleRing => vec![outer, inset()?],
    };
    Ok(rings.into_iter().flat_map(|r| r.openings(style)).collect())
}

/// The building's openings: its explicit net if set, else its layout.
/// Every pillar index is checked against the floor.
pub fn openings_for(params: &BuildingParams, floor: &FloorNet) -> LayoutResult<Vec<WallOpening>> {
    let (nx, ny) = (floor.net_x.len(), floor.net_y.len());
    let openings = match &params.wall_net {
        Some(net) => parse_wall_net(net)?,
        None => generate_openings(params.wall_layout, params.wall_style, nx, ny)?,
    };
    for o in &openings {
        if [o.from, o.to].iter().any(|p| p.x >= nx || p.y >= ny) {
            return Err(net_error(&o.to_string(), "pillar index outside the floor grid"));
        }
    }
    Ok(openings)
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// An opening resolved to walls-root coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedOpening {
    pub opening: WallOpening,
    pub location: Vec3,
    pub rotation: Euler,
    /// Pillar centre-to-centre span.
    pub width: f64,
}

pub fn place(opening: WallOpening, floor: &FloorNet) -> PlacedOpening {
    let a = Vec3::new(floor.net_x[opening.from.x], floor.net_y[opening.from.y], 0.0);
    let b = Vec3::new(floor.net_x[opening.to.x], floor.net_y[opening.to.y], 0.0);
    let d = b - a;
    PlacedOpening {
        opening,
        location: (a + b) * 0.5,
        rotation: Euler::about_z(d.y.atan2(d.x)),
        width: d.length(),
    }
}

/// A solid masonry wall filling the bay between two pillars.
pub fn layout_solid_wall(params: &BuildingParams, width: f64, config: &LayoutConfig) -> LayoutResult<Member> {
    let len = width - params.pillar_diameter;
    if len <= 0.0 {
        return Err(LayoutError::Degenerate { what: "solid wall length", value: len });
    }
    let h = params.pillar_height;
    let stone = MaterialRef::new(config.finish.stone_material.clone());
    Ok(Member::cuboid(
        "solid wall",
        Vec3::new(0.0, 0.0, h / 2.0),
        Vec3::new(len, config.proportions.wall_depth * params.pd(), h),
    )
    .beveled(config.finish.frame_bevel)
    .with_material(&stone))
}

/// One assembly per opening, in net order, relative to the walls root.
pub fn layout_walls(
    params: &BuildingParams,
    floor: &FloorNet,
    lattice: Option<&LatticeUnit>,
    config: &LayoutConfig,
) -> LayoutResult<Vec<Assembly>> {
    let mut out = Vec::new();
    for opening in openings_for(params, floor)? {
        let placed = place(opening, floor);
        let name = opening.to_string();
        let assembly = match opening.style {
            WallStyle::Wall => {
                let mut a = Assembly::new(name, placed.location).rotated(placed.rotation);
                a.members.push(layout_solid_wall(params, placed.width, config)?);
                a
            }
            WallStyle::Door | WallStyle::Window => {
                let dwarf = opening.style == WallStyle::Window && params.use_dwarf_wall;
                layout_opening(params, placed.width, dwarf, lattice, config)?.into_assembly(
                    &name,
                    placed.location,
                    placed.rotation,
                    config,
                )
            }
        };
        out.push(assembly);
    }
    Ok(out)
}
