// Leaf (geshan) decomposition engine.
//
// Splits one door or window leaf into horizontal bands: head rails at top
// and bottom, interior rails, a lattice core, and dado or frieze boards.
// The proportions are a closed table of five cases keyed by `BandCount`,
// each with its own formulas. They encode irregular joinery conventions and
// do not reduce to one recursive rule, so each case has its own handler.
//
// Notation (all relative to the leaf centre, Z up):
//   bw     border width (stiles and rails)
//   heart  lattice core height, `core_ratio * (h - k * bw)` where k counts
//          the fixed border widths in that case
//   dado   the remainder below the core, `heart * (1 - core_ratio) /
//          core_ratio` (the traditional 6:4 split)
//
// With a dwarf wall the leaf stops at a windowsill: the bottom head rail and
// any dado below the lowest interior rail are replaced by a `DwarfWall`
// band, and the windowsill is that rail's lower face. A two-band leaf cannot
// express a windowsill, so under a dwarf wall it is laid out as three bands.
//
// Bands are reported top to bottom and always tile the full leaf height.
// After the bands come the stiles (one member mirrored across the leaf's
// vertical centreline, spanning the windowsill to the top under a dwarf
// wall) and the pivot cylinder on the hinge edge. Everything is joined into
// one object whose rotation is locked to Z.
//
// See also: `door.rs` for leaf placement within an opening, `lattice.rs`
// for the core fill, `frame.rs` for the posts that bound the leaves.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::lattice::{LatticeLayout, LatticeUnit, layout_lattice};
use crate::types::{BandCount, Orientation};
use timberframe_scene::{Assembly, Axis, MaterialRef, Member, MirrorSpec, Shape, Vec3};

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandKind {
    /// Top or bottom rail of the leaf border.
    HeadRail,
    /// Interior muntin rail.
    Rail,
    LatticeCore,
    /// Board below the core.
    Dado,
    /// Narrow board between rails.
    Frieze,
    /// Region below the windowsill, filled by the dwarf wall.
    DwarfWall,
}

/// A horizontal interval of the leaf.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub kind: BandKind,
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    fn around(kind: BandKind, center: f64, height: f64) -> Self {
        Self { kind, top: center + height / 2.0, bottom: center - height / 2.0 }
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn center(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Band decomposition of one leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct BandPlan {
    pub bands: Vec<Band>,
    /// Top of the dwarf wall relative to the leaf centre; `None` for a
    /// full-height leaf.
    pub windowsill: Option<f64>,
    /// Band count actually laid out (a two-band leaf on a dwarf wall is
    /// promoted to three).
    pub effective: BandCount,
}

impl BandPlan {
    pub fn count(&self, kind: BandKind) -> usize {
        self.bands.iter().filter(|b| b.kind == kind).count()
    }

    pub fn total_height(&self) -> f64 {
        self.bands.iter().map(Band::height).sum()
    }
}

/// Proportion inputs shared by every band-count case.
#[derive(Clone, Copy, Debug)]
struct Dims {
    h: f64,
    bw: f64,
    ratio: f64,
}

impl Dims {
    fn heart(&self, fixed_borders: f64) -> f64 {
        self.ratio * (self.h - fixed_borders * self.bw)
    }

    fn dado(&self, heart: f64) -> f64 {
        heart * (1.0 - self.ratio) / self.ratio
    }

    fn top_rail(&self) -> Band {
        Band::around(BandKind::HeadRail, self.h / 2.0 - self.bw / 2.0, self.bw)
    }

    fn bottom_rail(&self) -> Band {
        Band::around(BandKind::HeadRail, -self.h / 2.0 + self.bw / 2.0, self.bw)
    }

    /// Close the stack with a dwarf wall below `sill`.
    fn dwarf_wall(&self, sill: f64) -> Band {
        Band { kind: BandKind::DwarfWall, top: sill, bottom: -self.h / 2.0 }
    }
}

/// Decompose a leaf of height `h` into bands.
pub fn plan_bands(
    h: f64,
    bw: f64,
    ratio: f64,
    band_count: BandCount,
    dwarf_wall: bool,
) -> LayoutResult<BandPlan> {
    let d = Dims { h, bw, ratio };
    let plan = match (band_count, dwarf_wall) {
        (BandCount::Two, false) => two_bands(&d),
        (BandCount::Two, true) | (BandCount::Three, _) => three_bands(&d, dwarf_wall),
        (BandCount::Four, _) => four_bands(&d, dwarf_wall),
        (BandCount::Five, _) => five_bands(&d, dwarf_wall),
        (BandCount::Six, _) => six_bands(&d, dwarf_wall),
    };
    for band in &plan.bands {
        if band.height() <= 0.0 {
            return Err(LayoutError::Degenerate { what: "leaf band height", value: band.height() });
        }
    }
    Ok(plan)
}

fn two_bands(d: &Dims) -> BandPlan {
    let bands = vec![
        d.top_rail(),
        Band::around(BandKind::LatticeCore, 0.0, d.h - 2.0 * d.bw),
        d.bottom_rail(),
    ];
    BandPlan { bands, windowsill: None, effective: BandCount::Two }
}

fn three_bands(d: &Dims, dwarf_wall: bool) -> BandPlan {
    let (h, bw) = (d.h, d.bw);
    let heart = d.heart(3.0);
    let rail2 = h / 2.0 - heart - 1.5 * bw;

    let mut bands = vec![
        d.top_rail(),
        Band::around(BandKind::LatticeCore, rail2 + heart / 2.0 + bw / 2.0, heart),
        Band::around(BandKind::Rail, rail2, bw),
    ];
    let mut windowsill = None;
    if dwarf_wall {
        let sill = rail2 - bw / 2.0;
        bands.push(d.dwarf_wall(sill));
        windowsill = Some(sill);
    } else {
        let dado = d.dado(heart);
        bands.push(Band::around(BandKind::Dado, rail2 - bw / 2.0 - dado / 2.0, dado));
        bands.push(d.bottom_rail());
    }
    BandPlan { bands, windowsill, effective: BandCount::Three }
}

fn four_bands(d: &Dims, dwarf_wall: bool) -> BandPlan {
    let (h, bw) = (d.h, d.bw);
    let heart = d.heart(6.0);
    let rail2 = h / 2.0 - heart - 1.5 * bw;
    let rail3 = rail2 - 3.0 * bw;

    let mut bands = vec![
        d.top_rail(),
        Band::around(BandKind::LatticeCore, rail2 + heart / 2.0 + bw / 2.0, heart),
        Band::around(BandKind::Rail, rail2, bw),
        Band::around(BandKind::Frieze, (rail2 + rail3) / 2.0, 2.0 * bw),
        Band::around(BandKind::Rail, rail3, bw),
    ];
    let mut windowsill = None;
    if dwarf_wall {
        let sill = rail3 - bw / 2.0;
        bands.push(d.dwarf_wall(sill));
        windowsill = Some(sill);
    } else {
        let dado = d.dado(heart);
        bands.push(Band::around(BandKind::Dado, rail3 - bw / 2.0 - dado / 2.0, dado));
        bands.push(d.bottom_rail());
    }
    BandPlan { bands, windowsill, effective: BandCount::Four }
}

fn five_bands(d: &Dims, dwarf_wall: bool) -> BandPlan {
    let (h, bw) = (d.h, d.bw);
    let heart = d.heart(9.0);
    let rail2 = h / 2.0 - heart - 1.5 * bw;
    let rail3 = rail2 - 3.0 * bw;

    let mut bands = vec![
        d.top_rail(),
        Band::around(BandKind::LatticeCore, rail2 + heart / 2.0 + bw / 2.0, heart),
        Band::around(BandKind::Rail, rail2, bw),
        Band::around(BandKind::Frieze, (rail2 + rail3) / 2.0, 2.0 * bw),
        Band::around(BandKind::Rail, rail3, bw),
    ];
    let mut windowsill = None;
    if dwarf_wall {
        let sill = rail3 - bw / 2.0;
        bands.push(d.dwarf_wall(sill));
        windowsill = Some(sill);
    } else {
        // The lower frieze hangs from the bottom edge, not from the core.
        let rail4 = -h / 2.0 + 3.5 * bw;
        bands.push(Band::around(BandKind::Dado, (rail3 + rail4) / 2.0, d.dado(heart)));
        bands.push(Band::around(BandKind::Rail, rail4, bw));
        bands.push(Band::around(BandKind::Frieze, rail4 - 1.5 * bw, 2.0 * bw));
        bands.push(d.bottom_rail());
    }
    BandPlan { bands, windowsill, effective: BandCount::Five }
}

fn six_bands(d: &Dims, dwarf_wall: bool) -> BandPlan {
    let (h, bw) = (d.h, d.bw);
    let heart = d.heart(12.0);
    let rail2 = h / 2.0 - 3.5 * bw;
    let rail3 = rail2 - heart - bw;
    let rail4 = rail3 - 3.0 * bw;

    let mut bands = vec![
        d.top_rail(),
        Band::around(BandKind::Frieze, rail2 + 1.5 * bw, 2.0 * bw),
        Band::around(BandKind::Rail, rail2, bw),
        Band::around(BandKind::LatticeCore, (rail2 + rail3) / 2.0, heart),
        Band::around(BandKind::Rail, rail3, bw),
        Band::around(BandKind::Frieze, (rail3 + rail4) / 2.0, 2.0 * bw),
        Band::around(BandKind::Rail, rail4, bw),
    ];
    let mut windowsill = None;
    if dwarf_wall {
        let sill = rail4 - bw / 2.0;
        bands.push(d.dwarf_wall(sill));
        windowsill = Some(sill);
    } else {
        let rail5 = -h / 2.0 + 3.5 * bw;
        bands.push(Band::around(BandKind::Dado, (rail4 + rail5) / 2.0, d.dado(heart)));
        bands.push(Band::around(BandKind::Rail, rail5, bw));
        bands.push(Band::around(BandKind::Frieze, -h / 2.0 + 2.0 * bw, 2.0 * bw));
        bands.push(d.bottom_rail());
    }
    BandPlan { bands, windowsill, effective: BandCount::Six }
}

// ---------------------------------------------------------------------------
// Leaf members
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct LeafInput {
    pub width: f64,
    pub height: f64,
    pub band_count: BandCount,
    pub dwarf_wall: bool,
    pub orientation: Orientation,
    /// Pillar module.
    pub pd: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafLayout {
    pub plan: BandPlan,
    /// Rails and boards, one per band (dwarf-wall region excluded).
    pub band_members: Vec<Member>,
    pub core: Option<LatticeLayout>,
    /// Right stile, mirrored to the left.
    pub stile: Member,
    pub stile_height: f64,
    pub pivot: Member,
}

impl LeafLayout {
    /// Relative to the leaf centre; `None` for a full-height leaf.
    pub fn windowsill(&self) -> Option<f64> {
        self.plan.windowsill
    }

    pub fn members(&self) -> Vec<Member> {
        let mut out = self.band_members.clone();
        if let Some(core) = &self.core {
            out.extend(core.clone().into_members());
        }
        out.push(self.stile.clone());
        out.push(self.pivot.clone());
        out
    }

    /// One joined object with rotation locked to the swing axis.
    pub fn into_assembly(self, name: &str, location: Vec3, config: &LayoutConfig) -> Assembly {
        let mut a = Assembly::new(name, location);
        a.members = self.members();
        a.join = true;
        a.join_bevel = Some(config.finish.leaf_bevel);
        a.rotation_lock = Some(Axis::Z);
        a
    }
}

pub fn layout_leaf(
    input: &LeafInput,
    lattice: Option<&LatticeUnit>,
    config: &LayoutConfig,
) -> LayoutResult<LeafLayout> {
    let p = &config.proportions;
    let pd = input.pd;
    let (w, h) = (input.width, input.height);
    let bw = p.border_width * pd;
    let bd = p.border_depth * pd;
    let rail_w = w - 2.0 * bw;
    if rail_w <= 0.0 {
        return Err(LayoutError::Degenerate { what: "leaf rail length", value: rail_w });
    }
    let red = MaterialRef::new(config.finish.structural_material.clone());

    let plan = plan_bands(h, bw, p.core_ratio, input.band_count, input.dwarf_wall)?;

    let mut band_members = Vec::new();
    let mut core = None;
    for band in &plan.bands {
        let c = Vec3::new(0.0, 0.0, band.center());
        match band.kind {
            BandKind::HeadRail | BandKind::Rail => {
                band_members.push(Member::cuboid("leaf rail", c, Vec3::new(rail_w, bd, band.height())));
            }
            BandKind::Dado => {
                band_members.push(Member::cuboid("dado board", c, Vec3::new(rail_w, bd / 3.0, band.height())));
            }
            BandKind::Frieze => {
                band_members.push(Member::cuboid("frieze board", c, Vec3::new(rail_w, bd / 3.0, band.height())));
            }
            BandKind::LatticeCore => {
                let size = Vec3::new(rail_w, p.lattice_border_depth * pd, band.height());
                core = Some(layout_lattice("lattice core", size, c, lattice, pd, config));
            }
            BandKind::DwarfWall => {}
        }
    }

    // Stiles span the windowsill to the top under a dwarf wall. The pivot is
    // centred between the top and the sill lowered by half the leaf gap.
    let (stile_height, stile_z, pivot_z) = match plan.windowsill {
        Some(sill) => {
            let sh = h / 2.0 - sill;
            (sh, h / 2.0 - sh / 2.0, (h / 2.0 + sill - p.leaf_gap / 2.0) / 2.0)
        }
        None => (h, 0.0, 0.0),
    };
    let stile = Member::cuboid("stile", Vec3::new(w / 2.0 - bw / 2.0, 0.0, stile_z), Vec3::new(bw, bd, stile_height))
        .mirrored(MirrorSpec::across(Axis::X, Vec3::ZERO));

    let r = p.pivot_radius * pd;
    let pivot_x = match input.orientation {
        Orientation::Left => -w / 2.0 + r,
        Orientation::Right => w / 2.0 - r,
    };
    let pivot = Member::new(
        "pivot",
        Shape::Cylinder { radius: r, depth: stile_height + 2.0 * p.boss_height * pd },
        Vec3::new(pivot_x, bd / 2.0 + r, pivot_z),
    );

    let band_members = band_members.into_iter().map(|m| m.with_material(&red)).collect();
    Ok(LeafLayout {
        plan,
        band_members,
        core,
        stile: stile.with_material(&red),
        stile_height,
        pivot: pivot.with_material(&red),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 2.0;
    const W: f64 = 0.9;
    const PD: f64 = 0.48;

    fn bw() -> f64 {
        LayoutConfig::default().proportions.border_width * PD
    }

    fn leaf(bands: BandCount, dwarf: bool, orientation: Orientation) -> LeafLayout {
        let input = LeafInput { width: W, height: H, band_count: bands, dwarf_wall: dwarf, orientation, pd: PD };
        layout_leaf(&input, None, &LayoutConfig::default()).unwrap()
    }

    fn assert_contiguous(plan: &BandPlan) {
        assert!((plan.bands[0].top - H / 2.0).abs() < 1e-9);
        assert!((plan.bands.last().unwrap().bottom + H / 2.0).abs() < 1e-9);
        for pair in plan.bands.windows(2) {
            assert!((pair[0].bottom - pair[1].top).abs() < 1e-9, "gap in {:?}", plan.bands);
        }
    }

    #[test]
    fn bands_sum_to_leaf_height_for_every_case() {
        for bands in BandCount::ALL {
            for dwarf in [false, true] {
                let plan = plan_bands(H, bw(), 0.6, bands, dwarf).unwrap();
                assert!((plan.total_height() - H).abs() < 1e-6, "{bands:?} dwarf={dwarf}");
                assert_contiguous(&plan);
            }
        }
    }

    #[test]
    fn three_band_leaf_without_dwarf_wall() {
        let l = leaf(BandCount::Three, false, Orientation::Left);
        let bw = bw();
        assert_eq!(l.plan.count(BandKind::Rail), 1);
        assert_eq!(l.plan.count(BandKind::LatticeCore), 1);
        assert_eq!(l.plan.count(BandKind::Dado), 1);
        let core = l.plan.bands.iter().find(|b| b.kind == BandKind::LatticeCore).unwrap();
        let dado = l.plan.bands.iter().find(|b| b.kind == BandKind::Dado).unwrap();
        assert!((core.height() - 0.6 * (2.0 - 3.0 * bw)).abs() < 1e-9);
        assert!((dado.height() - 0.4 * (2.0 - 3.0 * bw)).abs() < 1e-9);
        assert_eq!(l.windowsill(), None);
        assert!((l.stile_height - H).abs() < 1e-12);
    }

    #[test]
    fn three_band_leaf_on_dwarf_wall() {
        let l = leaf(BandCount::Three, true, Orientation::Left);
        assert_eq!(l.plan.count(BandKind::Dado), 0);
        assert_eq!(l.plan.count(BandKind::DwarfWall), 1);
        let rail = l.plan.bands.iter().find(|b| b.kind == BandKind::Rail).unwrap();
        let sill = l.windowsill().unwrap();
        assert!((sill - rail.bottom).abs() < 1e-12);
        // Stile spans only the windowsill to the top.
        assert!((l.stile_height - (H / 2.0 - sill)).abs() < 1e-12);
        let e = l.stile.extent();
        assert!((l.stile.location.z - e.z / 2.0 - sill).abs() < 1e-9);
        assert!((l.stile.location.z + e.z / 2.0 - H / 2.0).abs() < 1e-9);
    }

    #[test]
    fn two_bands_promote_to_three_on_dwarf_wall() {
        let plan = plan_bands(H, bw(), 0.6, BandCount::Two, true).unwrap();
        assert_eq!(plan.effective, BandCount::Three);
        assert!(plan.windowsill.is_some());
        let plain = plan_bands(H, bw(), 0.6, BandCount::Two, false).unwrap();
        assert_eq!(plain.effective, BandCount::Two);
        assert_eq!(plain.count(BandKind::LatticeCore), 1);
        assert_eq!(plain.count(BandKind::Rail), 0);
    }

    #[test]
    fn interior_rail_and_board_counts_per_case() {
        let expect = [
            (BandCount::Four, 2, 1, 1),
            (BandCount::Five, 3, 2, 1),
            (BandCount::Six, 4, 3, 1),
        ];
        for (bands, rails, friezes, dados) in expect {
            let plan = plan_bands(H, bw(), 0.6, bands, false).unwrap();
            assert_eq!(plan.count(BandKind::Rail), rails, "{bands:?}");
            assert_eq!(plan.count(BandKind::Frieze), friezes, "{bands:?}");
            assert_eq!(plan.count(BandKind::Dado), dados, "{bands:?}");
            assert_eq!(plan.count(BandKind::HeadRail), 2);
        }
    }

    #[test]
    fn windowsill_is_lowest_rail_lower_face() {
        for bands in [BandCount::Four, BandCount::Five, BandCount::Six] {
            let plan = plan_bands(H, bw(), 0.6, bands, true).unwrap();
            let lowest_rail = plan.bands.iter().rev().find(|b| b.kind == BandKind::Rail).unwrap();
            assert!((plan.windowsill.unwrap() - lowest_rail.bottom).abs() < 1e-12);
            assert_eq!(plan.count(BandKind::HeadRail), 1);
        }
    }

    #[test]
    fn pivot_follows_orientation() {
        let r = LayoutConfig::default().proportions.pivot_radius * PD;
        let left = leaf(BandCount::Five, false, Orientation::Left);
        let right = leaf(BandCount::Five, false, Orientation::Right);
        assert!((left.pivot.location.x - (-W / 2.0 + r)).abs() < 1e-12);
        assert!((right.pivot.location.x - (W / 2.0 - r)).abs() < 1e-12);
        // Pivot overruns the stile by a boss height at both ends.
        let boss = LayoutConfig::default().proportions.boss_height * PD;
        assert!((left.pivot.extent().z - (H + 2.0 * boss)).abs() < 1e-12);
    }

    #[test]
    fn pivot_on_dwarf_wall_sits_below_stile_centre() {
        let config = LayoutConfig::default();
        let gap = config.proportions.leaf_gap;
        let l = leaf(BandCount::Four, true, Orientation::Right);
        let sill = l.plan.windowsill.unwrap();
        assert!((l.pivot.location.z - (H / 2.0 + sill - gap / 2.0) / 2.0).abs() < 1e-12);
        assert!((l.stile.location.z - l.pivot.location.z - gap / 4.0).abs() < 1e-12);
        // Without a dwarf wall the pivot is centred on the leaf.
        assert_eq!(leaf(BandCount::Four, false, Orientation::Right).pivot.location.z, 0.0);
    }

    #[test]
    fn stile_mirror_is_symmetric_about_leaf_centreline() {
        let l = leaf(BandCount::Four, false, Orientation::Left);
        assert!(l.stile.is_mirrored_across(Axis::X));
        let e = l.stile.extent();
        assert!((l.stile.location.x + e.x / 2.0 - W / 2.0).abs() < 1e-12);
    }

    #[test]
    fn joined_assembly_locks_rotation_to_z() {
        let config = LayoutConfig::default();
        let a = leaf(BandCount::Three, false, Orientation::Right).into_assembly("leaf", Vec3::ZERO, &config);
        assert!(a.join);
        assert_eq!(a.rotation_lock, Some(Axis::Z));
        assert_eq!(a.object_count(), 1);
    }

    #[test]
    fn too_short_leaf_is_degenerate() {
        let err = plan_bands(0.5, bw(), 0.6, BandCount::Six, false).unwrap_err();
        assert!(matches!(err, LayoutError::Degenerate { .. }));
    }
}
