// Opening assembly: frame, leaves and dwarf wall for one bay.
//
// `layout_opening` runs the frame engine, splits the clear span between the
// door posts into `door_num` equal leaves, and lays out each leaf. Leaves
// alternate left/right swing starting from the left. Each leaf box is the
// pitch and the lower-post height less the leaf gap, centred on the lower
// post.
//
// With a dwarf wall (window openings only), the leaves report a windowsill.
// The wall is built up to half a gap below it, the lower door posts are cut
// down to start on the wall, and the wall carries its own pivot bosses at
// the odd seams (the frame emits none without a sill to sit them on).
// Dwarf wall stack, bottom up:
//   body          hexagonal masonry block, stone material
//   window board  hexagonal board overhanging the wall on every side
//   wind sill     timber rail capping the board
//
// See also: `frame.rs`, `leaf.rs`, and `wall.rs`, which places openings on
// the pillar grid.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::frame::{FrameInput, FrameLayout, layout_frame, seam_positions};
use crate::lattice::LatticeUnit;
use crate::leaf::{LeafInput, LeafLayout, layout_leaf};
use crate::params::BuildingParams;
use crate::types::Orientation;
use timberframe_scene::{Assembly, Euler, MaterialRef, Member, Shape, Vec3};

/// The masonry and joinery under a window.
#[derive(Clone, Debug, PartialEq)]
pub struct DwarfWallLayout {
    pub body: Member,
    pub window_board: Member,
    pub wind_sill: Member,
    pub bosses: Vec<Member>,
    /// Height of the wall top above the opening floor.
    pub top: f64,
}

impl DwarfWallLayout {
    pub fn members(&self) -> Vec<Member> {
        let mut out = vec![self.wind_sill.clone(), self.window_board.clone(), self.body.clone()];
        out.extend(self.bosses.iter().cloned());
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLeaf {
    pub layout: LeafLayout,
    pub location: Vec3,
    pub orientation: Orientation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpeningLayout {
    pub frame: FrameLayout,
    pub leaves: Vec<PlacedLeaf>,
    /// Leaf box: width, depth, height.
    pub leaf_size: Vec3,
    pub dwarf_wall: Option<DwarfWallLayout>,
}

impl OpeningLayout {
    /// Windowsill height above the opening floor, if the opening sits on a
    /// dwarf wall.
    pub fn windowsill(&self) -> Option<f64> {
        let first = self.leaves.first()?;
        first.layout.windowsill().map(|s| first.location.z + s)
    }

    /// Frame and dwarf wall as loose members, each leaf as its own joined
    /// child.
    pub fn into_assembly(self, name: &str, location: Vec3, rotation: Euler, config: &LayoutConfig) -> Assembly {
        let mut a = Assembly::new(name, location).rotated(rotation);
        a.members = self.frame.members();
        if let Some(dw) = &self.dwarf_wall {
            a.members.extend(dw.members());
        }
        for (n, leaf) in self.leaves.into_iter().enumerate() {
            a.children.push(leaf.layout.into_assembly(&format!("leaf {n}"), leaf.location, config));
        }
        a
    }
}

pub fn layout_opening(
    params: &BuildingParams,
    width: f64,
    dwarf_wall: bool,
    lattice: Option<&LatticeUnit>,
    config: &LayoutConfig,
) -> LayoutResult<OpeningLayout> {
    let p = &config.proportions;
    let pd = params.pd();
    let gap = p.leaf_gap;

    let mut frame = layout_frame(&FrameInput::from_params(params, width, dwarf_wall), lattice, config)?;

    let pitch = frame.leaf_span / f64::from(params.door_num);
    let leaf_size = Vec3::new(pitch - gap, p.post_depth * pd, frame.post_height - gap);
    if leaf_size.x <= 0.0 || leaf_size.z <= 0.0 {
        return Err(LayoutError::Degenerate { what: "leaf size", value: leaf_size.x.min(leaf_size.z) });
    }

    let half = f64::from(params.door_num) / 2.0;
    let mut leaves = Vec::with_capacity(params.door_num as usize);
    for n in 0..params.door_num {
        let orientation = Orientation::for_leaf(n);
        let input = LeafInput {
            width: leaf_size.x,
            height: leaf_size.z,
            band_count: params.band_count,
            dwarf_wall,
            orientation,
            pd,
        };
        let location = Vec3::new(pitch * (half - f64::from(n) - 0.5), 0.0, frame.post_center_z);
        leaves.push(PlacedLeaf { layout: layout_leaf(&input, lattice, config)?, location, orientation });
    }

    let mut dwarf = None;
    if dwarf_wall {
        let sill = leaves.first().and_then(|l| l.layout.windowsill().map(|s| l.location.z + s));
        if let Some(sill) = sill {
            let top = sill - gap / 2.0;
            let post_top = frame.post_center_z + frame.post_height / 2.0;
            shorten_box(&mut frame.lower_post, top, post_top);
            dwarf = Some(layout_dwarf_wall(params, width, top, &frame, config)?);
        }
    }
    Ok(OpeningLayout { frame, leaves, leaf_size, dwarf_wall: dwarf })
}

/// Re-span a box member between `bottom` and `top`.
fn shorten_box(m: &mut Member, bottom: f64, top: f64) {
    if let Shape::Box { size } = &mut m.shape {
        size.z = top - bottom;
    }
    m.location.z = (top + bottom) / 2.0;
}

fn layout_dwarf_wall(
    params: &BuildingParams,
    width: f64,
    top: f64,
    frame: &FrameLayout,
    config: &LayoutConfig,
) -> LayoutResult<DwarfWallLayout> {
    let p = &config.proportions;
    let pd = params.pd();
    let red = MaterialRef::new(config.finish.structural_material.clone());
    let stone = MaterialRef::new(config.finish.stone_material.clone());
    let bevel = config.finish.frame_bevel;

    let wind = Vec3::new(width, p.wind_sill_depth * pd, p.wind_sill_height * pd);
    let board = Vec3::new(
        width + p.window_board_overhang,
        p.window_board_depth * pd + p.window_board_overhang,
        p.window_board_height * pd,
    );
    let body_h = top - wind.z - board.z;
    if body_h <= 0.0 {
        return Err(LayoutError::Degenerate { what: "dwarf wall body height", value: body_h });
    }

    let wind_sill = Member::cuboid("wind sill", Vec3::new(0.0, 0.0, top - wind.z / 2.0), wind);
    let window_board = Member::new(
        "window board",
        Shape::HexPrism { size: board, half: false },
        Vec3::new(0.0, 0.0, top - wind.z - board.z / 2.0),
    );
    let body = Member::new(
        "dwarf wall",
        Shape::HexPrism { size: Vec3::new(width, p.wall_depth * pd, body_h), half: false },
        Vec3::new(0.0, 0.0, body_h / 2.0),
    );

    let boss = Vec3::new(p.boss_width * pd, p.boss_depth * pd, p.boss_height * pd);
    let upper_z = if params.use_clerestory { params.door_height } else { params.pillar_height - boss.z / 2.0 };
    let lower_z = top - wind.z + boss.z / 2.0;
    let y = p.sill_depth * pd / 2.0;
    let mut bosses = Vec::new();
    for x in seam_positions(frame.leaf_span, params.door_num) {
        for (label, z) in [("upper window boss", upper_z), ("lower window boss", lower_z)] {
            bosses.push(
                Member::new(label, Shape::HexPrism { size: boss, half: true }, Vec3::new(x, y, z))
                    .beveled(bevel)
                    .with_material(&red),
            );
        }
    }

    Ok(DwarfWallLayout {
        body: body.beveled(bevel).with_material(&stone),
        window_board: window_board.beveled(bevel).with_material(&red),
        wind_sill: wind_sill.beveled(bevel).with_material(&red),
        bosses,
        top,
    })
}
