// Stairs (ta-duo) in front of centred doors.
//
// A side of the building gets a stair only for a door opening that lies on
// that side's outer pillar line and spans its exact centre bay, i.e. the two
// pillar indices along the side sum to the pillar count minus one.
// Off-centre doors, windows and walls get nothing.
//
// Stair geometry, in the stair's local frame (X across the stair, -Y away
// from the platform, Z up, origin at the stair box centre):
//
//   rise     platform height
//   run      rise * step_ratio
//   count    ceil((rise - footing) / max_step_height)
//   footing  border slab under the whole stair
//   cheek    a wedge on each side rising toward the platform, cut by the
//            elephant-eye tool (the eye stone stretched x2 across its width)
//   eye      the smaller wedge filling the triangle under the cheek;
//            absent, with no cut, when the stair is a single step
//   treads   count - 1 slabs between the cheeks; the top step is the
//            platform edge itself
//
// The stair is placed `extend + run/2` out from the door's pillar line and
// turned to face its side.
//
// See also: `platform.rs`, `wall.rs` for the openings scanned here.

use crate::config::{LayoutConfig, StoneCourse};
use crate::error::{LayoutError, LayoutResult};
use crate::floor::FloorNet;
use crate::params::BuildingParams;
use crate::platform::COURSE_TOLERANCE;
use crate::types::{Side, WallStyle};
use crate::wall::{Pillar, WallOpening};
use timberframe_scene::{Assembly, Axis, BooleanPrecision, Euler, MaterialRef, Member, MirrorSpec, Shape, Vec3};

/// Number of steps for a rise: each step is at most one course high.
pub fn step_count(rise: f64, stone: &StoneCourse) -> u32 {
    let n = ((rise - stone.ground_border) / stone.step_height - COURSE_TOLERANCE).ceil();
    if n.is_finite() && n >= 1.0 { n as u32 } else { 1 }
}

/// The side a door opens onto, if it spans that side's centre bay.
pub fn stair_side(opening: &WallOpening, nx: usize, ny: usize) -> Option<Side> {
    if opening.style != WallStyle::Door {
        return None;
    }
    let (a, b) = (opening.from, opening.to);
    let centred_x = a.x + b.x + 1 == nx;
    let centred_y = a.y + b.y + 1 == ny;
    if a.y == 0 && b.y == 0 && centred_x {
        Some(Side::South)
    } else if a.y == ny - 1 && b.y == ny - 1 && centred_x {
        Some(Side::North)
    } else if a.x == 0 && b.x == 0 && centred_y {
        Some(Side::West)
    } else if a.x == nx - 1 && b.x == nx - 1 && centred_y {
        Some(Side::East)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StairSite {
    pub side: Side,
    pub from: Pillar,
    pub to: Pillar,
}

pub fn stair_sites(openings: &[WallOpening], floor: &FloorNet) -> Vec<StairSite> {
    let (nx, ny) = (floor.net_x.len(), floor.net_y.len());
    openings
        .iter()
        .filter_map(|o| stair_side(o, nx, ny).map(|side| StairSite { side, from: o.from, to: o.to }))
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct StairLayout {
    pub site: StairSite,
    /// Centre of the stair box, relative to the platform centre.
    pub location: Vec3,
    pub rotation: Euler,
    /// Width, run and rise.
    pub size: Vec3,
    pub count: u32,
    pub step_height: f64,
    pub step_depth: f64,
    pub members: Vec<Member>,
}

impl StairLayout {
    /// Tread members, bottom step first.
    pub fn treads(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.name == "tread")
    }

    pub fn into_assembly(self) -> Assembly {
        let name = format!("stair {:?}", self.site.side).to_lowercase();
        let mut a = Assembly::new(name, self.location).rotated(self.rotation);
        a.members = self.members;
        a
    }
}

pub fn layout_stair(
    site: StairSite,
    params: &BuildingParams,
    floor: &FloorNet,
    config: &LayoutConfig,
) -> LayoutResult<StairLayout> {
    let s = &config.stone;
    let bevel = config.finish.step_bevel;
    let rise = params.platform_height;
    let run = rise * s.step_ratio;
    let offset = params.platform_extend + run / 2.0;

    let (fx, tx) = (floor.net_x[site.from.x], floor.net_x[site.to.x]);
    let (fy, ty) = (floor.net_y[site.from.y], floor.net_y[site.to.y]);
    let (width, location) = match site.side {
        Side::South => ((tx - fx).abs(), Vec3::new((fx + tx) / 2.0, fy - offset, 0.0)),
        Side::North => ((tx - fx).abs(), Vec3::new((fx + tx) / 2.0, fy + offset, 0.0)),
        Side::West => ((ty - fy).abs(), Vec3::new(fx - offset, (fy + ty) / 2.0, 0.0)),
        Side::East => ((ty - fy).abs(), Vec3::new(fx + offset, (fy + ty) / 2.0, 0.0)),
    };
    let rotation = Euler::about_z(site.side.stair_rotation_degrees().to_radians());

    let sw = params.platform_extend - params.pillar_diameter;
    let tread_w = width - 2.0 * sw;
    if tread_w <= 0.0 {
        return Err(LayoutError::Degenerate { what: "stair tread width", value: tread_w });
    }
    let eye = Vec3::new(sw, run - s.step_height * s.step_ratio, rise - s.ground_border - s.step_height);

    let count = step_count(rise, s);
    let step_height = (rise - s.ground_border) / f64::from(count);
    let step_depth = run / f64::from(count);
    let mirror_x = MirrorSpec::across(Axis::X, Vec3::ZERO);
    let mut members = Vec::new();

    members.push(Member::cuboid(
        "stair footing",
        Vec3::new(0.0, 0.0, -rise / 2.0 + s.ground_border / 2.0),
        Vec3::new(width + 2.0 * s.ground_border, run + 2.0 * s.ground_border, s.ground_border),
    ));

    let side_x = -width / 2.0 + sw / 2.0;
    let mut cheek = Member::new(
        "cheek stone",
        Shape::Wedge { size: Vec3::new(sw, run, rise - s.ground_border) },
        Vec3::new(side_x, 0.0, s.ground_border / 2.0),
    );
    // A single-step stair leaves no room under the cheek for an eye stone.
    if eye.y > COURSE_TOLERANCE && eye.z > COURSE_TOLERANCE {
        let eye_stone = Member::new(
            "elephant-eye stone",
            Shape::Wedge { size: eye },
            Vec3::new(side_x, s.step_height * s.step_ratio / 2.0, s.ground_border / 2.0 - s.step_height / 2.0),
        );
        let tool = eye_stone.clone().with_scale(Vec3::new(2.0, 1.0, 1.0));
        members.push(eye_stone.mirrored(mirror_x));
        cheek = cheek.subtracting(tool, BooleanPrecision::Exact);
    }
    members.push(cheek.mirrored(mirror_x));

    for n in 0..count.saturating_sub(1) {
        let nf = f64::from(n);
        members.push(Member::cuboid(
            "tread",
            Vec3::new(
                0.0,
                -run / 2.0 + (nf + 1.5) * step_depth,
                -rise / 2.0 + s.ground_border / 2.0 + (nf + 0.5) * step_height,
            ),
            Vec3::new(tread_w, step_depth + 2.0 * bevel, step_height),
        ));
    }

    let stone = MaterialRef::new(config.finish.stone_material.clone());
    let members = members.into_iter().map(|m| m.beveled(bevel).with_material(&stone)).collect();
    Ok(StairLayout {
        site,
        location,
        rotation,
        size: Vec3::new(width, run, rise),
        count,
        step_height,
        step_depth,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WallLayout;
    use crate::wall::{generate_openings, parse_wall_net};
    use timberframe_scene::Modifier;

    fn template() -> (BuildingParams, FloorNet) {
        let p = BuildingParams::template(0.08);
        let floor = FloorNet::solve(&p).unwrap();
        (p, floor)
    }

    #[test]
    fn step_count_is_monotonic_in_rise() {
        let stone = StoneCourse::default();
        let mut last = 0;
        for i in 1..200 {
            let n = step_count(0.06 + f64::from(i) * 0.013, &stone);
            assert!(n >= last, "rise step {i}");
            last = n;
        }
        // 0.91 m over 0.15 m courses.
        assert_eq!(step_count(0.96, &stone), 7);
        assert_eq!(step_count(0.0, &stone), 1);
    }

    #[test]
    fn only_the_centred_front_door_gets_a_stair() {
        let (_, floor) = template();
        let openings = generate_openings(WallLayout::NoCorridor, WallStyle::Window, 4, 4).unwrap();
        let sites = stair_sites(&openings, &floor);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].side, Side::South);
    }

    #[test]
    fn each_side_is_detected_from_its_pillar_line() {
        let net = "door#1/0#2/0,door#1/3#2/3,door#0/1#0/2,door#3/1#3/2,door#0/0#1/0,window#3/1#3/2";
        let openings = parse_wall_net(net).unwrap();
        let sides: Vec<Option<Side>> = openings.iter().map(|o| stair_side(o, 4, 4)).collect();
        assert_eq!(
            sides,
            vec![Some(Side::South), Some(Side::North), Some(Side::West), Some(Side::East), None, None]
        );
    }

    #[test]
    fn inset_ring_doors_get_no_stair() {
        let openings = generate_openings(WallLayout::FullCorridor, WallStyle::Door, 6, 6).unwrap();
        assert!(openings.iter().all(|o| stair_side(o, 6, 6).is_none()));
    }

    #[test]
    fn south_stair_layout() {
        let (p, floor) = template();
        let config = LayoutConfig::default();
        let site = StairSite { side: Side::South, from: Pillar::new(1, 0), to: Pillar::new(2, 0) };
        let st = layout_stair(site, &p, &floor, &config).unwrap();
        let run = p.platform_height * 2.5;
        assert!((st.location.y - (floor.net_y[0] - p.platform_extend - run / 2.0)).abs() < 1e-12);
        assert!(st.location.x.abs() < 1e-12);
        assert!((st.size.x - p.x_room_widths.center).abs() < 1e-12);
        assert!(st.rotation.is_identity());

        let treads: Vec<&Member> = st.treads().collect();
        assert_eq!(treads.len() as u32, st.count - 1);
        for w in treads.windows(2) {
            assert!(w[1].location.z > w[0].location.z);
            assert!(w[1].location.y > w[0].location.y);
        }
        let d = treads[0].extent().y;
        assert!((d - (st.step_depth + 2.0 * config.finish.step_bevel)).abs() < 1e-12);
    }

    #[test]
    fn cheek_is_cut_by_a_stretched_eye_stone() {
        let (p, floor) = template();
        let config = LayoutConfig::default();
        let site = StairSite { side: Side::East, from: Pillar::new(3, 1), to: Pillar::new(3, 2) };
        let st = layout_stair(site, &p, &floor, &config).unwrap();
        assert!((st.rotation.z - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let cheek = st.members.iter().find(|m| m.name == "cheek stone").unwrap();
        let tool = cheek.modifiers.iter().find_map(|m| match m {
            Modifier::Subtract { tool, precision } => Some((tool, *precision)),
            _ => None,
        });
        let (tool, precision) = tool.unwrap();
        assert_eq!(precision, BooleanPrecision::Exact);
        assert_eq!(tool.scale, Vec3::new(2.0, 1.0, 1.0));
        assert!(cheek.is_mirrored_across(Axis::X));
    }

    #[test]
    fn one_course_plinth_gets_a_single_uncut_step() {
        let (mut p, floor) = template();
        p.platform_height = 0.2;
        let config = LayoutConfig::default();
        assert_eq!(step_count(p.platform_height, &config.stone), 1);
        let site = StairSite { side: Side::South, from: Pillar::new(1, 0), to: Pillar::new(2, 0) };
        let st = layout_stair(site, &p, &floor, &config).unwrap();
        assert_eq!(st.count, 1);
        assert_eq!(st.treads().count(), 0);
        assert!(st.members.iter().all(|m| m.name != "elephant-eye stone"));
        let cheek = st.members.iter().find(|m| m.name == "cheek stone").unwrap();
        assert!(!cheek.modifiers.iter().any(|m| matches!(m, Modifier::Subtract { .. })));
        assert!(cheek.is_mirrored_across(Axis::X));
    }
}
