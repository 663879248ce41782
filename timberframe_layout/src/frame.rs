// Frame (kan-kuang) layout engine.
//
// Computes the members framing one door or window opening between two
// pillars: the bottom sill, the top lintel, the door posts, and optionally a
// clerestory (mid rail, upper posts, mullions and lattice slots) and the
// pivot bosses that carry the leaves.
//
// Coordinates are local to the opening: X runs along the wall centred
// between the pillar centres, Y is through the wall, Z starts at the floor.
// `width` is the pillar centre-to-centre span, so posts are offset inward by
// half a pillar diameter.
//
// Branching:
// - No dwarf wall: a bottom sill spans the full width and the lower pivot
//   bosses sit on it. With a dwarf wall neither exists; `door.rs` builds
//   the wall and shortens the lower posts instead.
// - Clerestory: the lower posts stop at the mid rail; above it,
//   `door_num - 1` equal slots are separated by `door_num - 2` mullions.
// - Pivot bosses sit at odd leaf seams only (n = 1, 3 for four leaves),
//   which is every other inter-leaf boundary. The seams between leaf pairs
//   have no pivot.
//
// Every member gets the frame bevel and the structural material. The lower
// door post is also returned on its own: it is the reference box the leaf
// layout is derived from.
//
// See also: `leaf.rs` for the leaves, `door.rs` for the assembly that
// combines frame, leaves and dwarf wall, `lattice.rs` for slot fills.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::lattice::{LatticeLayout, LatticeUnit, layout_lattice};
use crate::params::BuildingParams;
use timberframe_scene::{Axis, MaterialRef, Member, MirrorSpec, Shape, Vec3};

/// Geometry inputs for one opening's frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInput {
    /// Pillar centre-to-centre span.
    pub width: f64,
    pub height: f64,
    pub pillar_diameter: f64,
    /// Pillar module.
    pub pd: f64,
    pub door_num: u32,
    /// Mid rail centre height; only read with a clerestory.
    pub door_height: f64,
    pub use_clerestory: bool,
    pub use_dwarf_wall: bool,
}

impl FrameInput {
    pub fn from_params(params: &BuildingParams, width: f64, use_dwarf_wall: bool) -> Self {
        Self {
            width,
            height: params.pillar_height,
            pillar_diameter: params.pillar_diameter,
            pd: params.pd(),
            door_num: params.door_num,
            door_height: params.door_height,
            use_clerestory: params.use_clerestory,
            use_dwarf_wall,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayout {
    pub sill: Option<Member>,
    pub lintel: Member,
    pub mid_rail: Option<Member>,
    /// Right lower post, mirrored to the left.
    pub lower_post: Member,
    pub upper_post: Option<Member>,
    pub mullions: Vec<Member>,
    pub slots: Vec<LatticeLayout>,
    pub bosses: Vec<Member>,
    pub post_height: f64,
    pub post_center_z: f64,
    /// X of the right post centre.
    pub post_x: f64,
    /// Clear span between the posts, shared by all leaves.
    pub leaf_span: f64,
    pub slot_width: Option<f64>,
}

impl FrameLayout {
    /// All members in emission order.
    pub fn members(&self) -> Vec<Member> {
        let mut out = Vec::new();
        out.extend(self.sill.clone());
        out.push(self.lintel.clone());
        out.push(self.lower_post.clone());
        out.extend(self.mid_rail.clone());
        out.extend(self.upper_post.clone());
        out.extend(self.mullions.iter().cloned());
        for slot in &self.slots {
            out.extend(slot.clone().into_members());
        }
        out.extend(self.bosses.iter().cloned());
        out
    }
}

/// Apply the frame finish: bevel and structural material.
fn finish(m: Member, config: &LayoutConfig, red: &MaterialRef) -> Member {
    m.beveled(config.finish.frame_bevel).with_material(red)
}

pub fn layout_frame(
    input: &FrameInput,
    lattice: Option<&LatticeUnit>,
    config: &LayoutConfig,
) -> LayoutResult<FrameLayout> {
    let p = &config.proportions;
    let pd = input.pd;
    let (w, h) = (input.width, input.height);
    let red = MaterialRef::new(config.finish.structural_material.clone());

    let sill_h = p.sill_height * pd;
    let lintel_h = p.lintel_height * pd;
    let mid_h = p.mid_rail_height * pd;
    let post_w = p.post_width * pd;
    let post_d = p.post_depth * pd;

    let leaf_span = w - input.pillar_diameter - 2.0 * post_w;
    if leaf_span <= 0.0 {
        return Err(LayoutError::Degenerate { what: "leaf span between door posts", value: leaf_span });
    }

    // Door posts run from the sill top to the mid rail or the lintel.
    let post_height = if input.use_clerestory {
        (input.door_height - mid_h / 2.0) - sill_h
    } else {
        h - lintel_h - sill_h
    };
    if post_height <= 0.0 {
        return Err(LayoutError::Degenerate { what: "door post height", value: post_height });
    }
    let post_center_z = sill_h + post_height / 2.0;
    let post_x = w / 2.0 - input.pillar_diameter / 2.0 - post_w / 2.0;
    let mirror_x = MirrorSpec::across(Axis::X, Vec3::ZERO);

    let sill = (!input.use_dwarf_wall).then(|| {
        Member::cuboid("bottom sill", Vec3::new(0.0, 0.0, sill_h / 2.0), Vec3::new(w, p.sill_depth * pd, sill_h))
    });
    let lintel = Member::cuboid(
        "top lintel",
        Vec3::new(0.0, 0.0, h - lintel_h / 2.0),
        Vec3::new(w, p.lintel_depth * pd, lintel_h),
    );
    let lower_post = Member::cuboid(
        "lower door post",
        Vec3::new(post_x, 0.0, post_center_z),
        Vec3::new(post_w, post_d, post_height),
    )
    .mirrored(mirror_x);

    let mut mid_rail = None;
    let mut upper_post = None;
    let mut mullions = Vec::new();
    let mut slots = Vec::new();
    let mut slot_width = None;
    if input.use_clerestory {
        mid_rail = Some(Member::cuboid(
            "mid rail",
            Vec3::new(0.0, 0.0, input.door_height),
            Vec3::new(w, p.mid_rail_depth * pd, mid_h),
        ));

        let upper_h = h - lintel_h - (input.door_height + mid_h / 2.0);
        if upper_h <= 0.0 {
            return Err(LayoutError::Degenerate { what: "clerestory height", value: upper_h });
        }
        let upper_z = h - lintel_h - upper_h / 2.0;
        upper_post = Some(
            Member::cuboid("upper door post", Vec3::new(post_x, 0.0, upper_z), Vec3::new(post_w, post_d, upper_h))
                .mirrored(mirror_x),
        );

        let num = input.door_num.saturating_sub(1).max(1);
        let nf = f64::from(num);
        let sw = (w - input.pillar_diameter - post_w * (nf + 1.0)) / nf;
        if sw <= 0.0 {
            return Err(LayoutError::Degenerate { what: "clerestory slot width", value: sw });
        }
        slot_width = Some(sw);
        for n in 1..num {
            let x = post_x - (post_w + sw) * f64::from(n);
            mullions.push(Member::cuboid(
                format!("mullion {n}"),
                Vec3::new(x, 0.0, upper_z),
                Vec3::new(post_w, post_d, upper_h),
            ));
        }
        for n in 0..num {
            let x = post_x - (post_w + sw) * (f64::from(n) + 0.5);
            slots.push(layout_lattice(
                &format!("clerestory slot {n}"),
                Vec3::new(sw, p.lattice_border_depth * pd, upper_h),
                Vec3::new(x, 0.0, upper_z),
                lattice,
                pd,
                config,
            ));
        }
    }

    let mut bosses = Vec::new();
    if !input.use_dwarf_wall {
        let size = Vec3::new(p.boss_width * pd, p.boss_depth * pd, p.boss_height * pd);
        let top_z = if input.use_clerestory { input.door_height } else { h - size.z / 2.0 };
        for x in seam_positions(leaf_span, input.door_num) {
            let y = p.sill_depth * pd / 2.0;
            bosses.push(Member::new("upper pivot boss", Shape::HexPrism { size, half: true }, Vec3::new(x, y, top_z)));
            bosses.push(Member::new(
                "lower pivot boss",
                Shape::HexPrism { size, half: true },
                Vec3::new(x, y, size.z / 2.0),
            ));
        }
    }

    let f = |m: Member| finish(m, config, &red);
    Ok(FrameLayout {
        sill: sill.map(f),
        lintel: f(lintel),
        mid_rail: mid_rail.map(f),
        lower_post: f(lower_post),
        upper_post: upper_post.map(f),
        mullions: mullions.into_iter().map(f).collect(),
        slots: slots
            .into_iter()
            .map(|s| LatticeLayout { ring: f(s.ring), fill: s.fill.map(f), ..s })
            .collect(),
        bosses: bosses.into_iter().map(f).collect(),
        post_height,
        post_center_z,
        post_x,
        leaf_span,
        slot_width,
    })
}

/// X positions of the odd leaf seams across a leaf span.
pub fn seam_positions(leaf_span: f64, door_num: u32) -> Vec<f64> {
    (1..door_num)
        .step_by(2)
        .map(|n| -leaf_span / 2.0 + f64::from(n) * leaf_span / f64::from(door_num))
        .collect()
}
