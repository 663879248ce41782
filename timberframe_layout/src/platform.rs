// Platform (tai-ji) stone courses.
//
// The platform is a block `x_total + 2·extend` by `y_total + 2·extend` by
// `platform_height`. Member coordinates are relative to its centre, so the
// top face is at `+h/2`. Courses from top to bottom:
//
//   pavement      one slab over the pillar grid, one pillar diameter past
//                 the outer pillars on every side
//   edge stones   a ring at the platform rim, `extend - pillar_d` wide.
//                 Front and back stones follow the pillar spacing, except
//                 that the end stones ("first stones") are a fixed fraction
//                 of (end bay + extend) long, measured from the corner.
//                 Side stones run to one pillar diameter past the corner
//                 pillars so they butt against the front and back rows.
//   corner posts  under the edge-stone corners, down to the footing
//   riser boards  between the corner posts on all four faces
//                 (posts and risers are left out when the pavement sits
//                 directly on the footing)
//   footing       a border slab projecting past the whole platform
//
// Stones on opposite faces are one member mirrored across the centre.
// Every stone gets the platform bevel and the stone material.
//
// See also: `steps.rs` for the stairs in front of doors, `floor.rs` for the
// pillar coordinates.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::floor::FloorNet;
use crate::params::BuildingParams;
use timberframe_scene::{Axis, MaterialRef, Member, MirrorSpec, Vec3};

/// Slack when comparing stacked course heights.
pub const COURSE_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct PlatformLayout {
    /// Outer size of the platform block.
    pub size: Vec3,
    /// Width of the edge-stone ring, `extend - pillar_diameter`.
    pub edge_width: f64,
    pub members: Vec<Member>,
}

/// X breakpoints of the front edge stones, outer corner to outer corner.
pub fn front_stone_breaks(net_x: &[f64], extend: f64, first_ratio: f64) -> Vec<f64> {
    let n = net_x.len();
    if n < 2 {
        return Vec::new();
    }
    let end_bay = net_x[1] - net_x[0];
    let first = (end_bay + extend) * first_ratio;
    let left = net_x[0] - extend;
    let right = net_x[n - 1] + extend;

    let mut breaks = Vec::with_capacity(n + 2);
    breaks.push(left);
    breaks.push(left + first);
    breaks.extend_from_slice(&net_x[1..n - 1]);
    breaks.push(right - first);
    breaks.push(right);
    breaks
}

pub fn layout_platform(params: &BuildingParams, floor: &FloorNet, config: &LayoutConfig) -> LayoutResult<PlatformLayout> {
    let s = &config.stone;
    let extend = params.platform_extend;
    let pillar_d = params.pillar_diameter;
    let size = Vec3::new(
        floor.x_total + 2.0 * extend,
        floor.y_total + 2.0 * extend,
        params.platform_height,
    );
    let (pw, pdp, ph) = (size.x, size.y, size.z);
    let sw = extend - pillar_d;
    if sw <= 0.0 {
        return Err(LayoutError::Degenerate { what: "edge stone width", value: sw });
    }
    let riser_h = ph - s.step_height - s.ground_border;
    if riser_h < -COURSE_TOLERANCE {
        return Err(LayoutError::Degenerate { what: "platform riser height", value: riser_h });
    }

    let top_z = ph / 2.0 - s.step_height / 2.0;
    let mirror_x = MirrorSpec::across(Axis::X, Vec3::ZERO);
    let mirror_y = MirrorSpec::across(Axis::Y, Vec3::ZERO);
    let mut members = Vec::new();

    members.push(Member::cuboid(
        "pavement",
        Vec3::new(0.0, 0.0, top_z),
        Vec3::new(floor.x_total + 2.0 * pillar_d, floor.y_total + 2.0 * pillar_d, s.step_height),
    ));

    let xb = front_stone_breaks(&floor.net_x, extend, s.first_stone_ratio);
    for pair in xb.windows(2) {
        members.push(
            Member::cuboid(
                "front edge stone",
                Vec3::new((pair[0] + pair[1]) / 2.0, pdp / 2.0 - sw / 2.0, top_z),
                Vec3::new(pair[1] - pair[0], sw, s.step_height),
            )
            .mirrored(mirror_y),
        );
    }

    let mut yb = floor.net_y.clone();
    let n = yb.len();
    if n >= 2 {
        yb[0] -= pillar_d;
        yb[n - 1] += pillar_d;
    }
    for pair in yb.windows(2) {
        members.push(
            Member::cuboid(
                "side edge stone",
                Vec3::new(pw / 2.0 - sw / 2.0, (pair[0] + pair[1]) / 2.0, top_z),
                Vec3::new(sw, pair[1] - pair[0], s.step_height),
            )
            .mirrored(mirror_x),
        );
    }

    // Pavement directly on the footing: no riser course.
    if riser_h > COURSE_TOLERANCE {
        let riser_z = ph / 2.0 - s.step_height - riser_h / 2.0;
        members.push(
            Member::cuboid(
                "corner post",
                Vec3::new(pw / 2.0 - sw / 2.0, pdp / 2.0 - sw / 2.0, riser_z),
                Vec3::new(sw, sw, riser_h),
            )
            .mirrored(MirrorSpec::across_xy(Vec3::ZERO)),
        );
        members.push(
            Member::cuboid(
                "front riser board",
                Vec3::new(0.0, pdp / 2.0 - s.step_height / 2.0, riser_z),
                Vec3::new(pw - 2.0 * sw, s.step_height, riser_h),
            )
            .mirrored(mirror_y),
        );
        members.push(
            Member::cuboid(
                "side riser board",
                Vec3::new(pw / 2.0 - s.step_height / 2.0, 0.0, riser_z),
                Vec3::new(s.step_height, pdp - 2.0 * sw, riser_h),
            )
            .mirrored(mirror_x),
        );
    }

    members.push(Member::cuboid(
        "footing",
        Vec3::new(0.0, 0.0, -ph / 2.0 + s.ground_border / 2.0),
        Vec3::new(pw + 2.0 * s.ground_border, pdp + 2.0 * s.ground_border, s.ground_border),
    ));

    let stone = MaterialRef::new(config.finish.stone_material.clone());
    let members = members
        .into_iter()
        .map(|m| m.beveled(config.finish.platform_bevel).with_material(&stone))
        .collect();
    Ok(PlatformLayout { size, edge_width: sw, members })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> (BuildingParams, FloorNet) {
        let p = BuildingParams::template(0.08);
        let floor = FloorNet::solve(&p).unwrap();
        (p, floor)
    }

    #[test]
    fn first_stones_shorten_the_end_bays() {
        let (p, floor) = template();
        let xb = front_stone_breaks(&floor.net_x, p.platform_extend, 0.3);
        // Two outer corners, two first-stone joints, the inner pillars.
        assert_eq!(xb.len(), floor.net_x.len() + 2);
        let end_bay = floor.net_x[1] - floor.net_x[0];
        assert!((xb[1] - xb[0] - 0.3 * (end_bay + p.platform_extend)).abs() < 1e-12);
        for w in xb.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert!((xb[0] + xb[xb.len() - 1]).abs() < 1e-12);
    }

    #[test]
    fn platform_block_wraps_the_pillar_grid() {
        let (p, floor) = template();
        let config = LayoutConfig::default();
        let l = layout_platform(&p, &floor, &config).unwrap();
        assert!((l.size.x - (floor.x_total + 2.0 * p.platform_extend)).abs() < 1e-12);
        assert!((l.edge_width - (p.platform_extend - p.pillar_diameter)).abs() < 1e-12);
        // pavement, 5 front stones, 3 side stones, corner post, two risers, footing
        assert_eq!(l.members.len(), 1 + 5 + 3 + 1 + 2 + 1);
    }

    #[test]
    fn courses_stack_from_footing_to_top() {
        let (p, floor) = template();
        let config = LayoutConfig::default();
        let l = layout_platform(&p, &floor, &config).unwrap();
        let find = |name: &str| l.members.iter().find(|m| m.name == name).unwrap();
        let top = |m: &Member| m.location.z + m.extent().z / 2.0;
        let bottom = |m: &Member| m.location.z - m.extent().z / 2.0;
        let h = p.platform_height;
        assert!((top(find("pavement")) - h / 2.0).abs() < 1e-12);
        assert!((top(find("corner post")) - bottom(find("pavement"))).abs() < 1e-12);
        assert!((bottom(find("corner post")) - top(find("footing"))).abs() < 1e-12);
        assert!((bottom(find("footing")) + h / 2.0).abs() < 1e-12);
    }

    #[test]
    fn side_stones_meet_the_front_row() {
        let (p, floor) = template();
        let config = LayoutConfig::default();
        let l = layout_platform(&p, &floor, &config).unwrap();
        let side: Vec<&Member> = l.members.iter().filter(|m| m.name == "side edge stone").collect();
        let outer = side.iter().map(|m| m.location.y + m.extent().y / 2.0).fold(f64::MIN, f64::max);
        let front_inner = l.size.y / 2.0 - l.edge_width;
        assert!((outer - front_inner).abs() < 1e-9);
        assert!(side.iter().all(|m| m.is_mirrored_across(Axis::X)));
    }

    #[test]
    fn every_stone_is_beveled_stone() {
        let (p, floor) = template();
        let config = LayoutConfig::default();
        let l = layout_platform(&p, &floor, &config).unwrap();
        assert!(l.members.iter().all(|m| m.material.as_ref().map(|r| r.0.as_str()) == Some("stone")));
    }

    #[test]
    fn one_course_plinth_has_no_risers() {
        let (mut p, floor) = template();
        p.platform_height = 0.2;
        let config = LayoutConfig::default();
        let l = layout_platform(&p, &floor, &config).unwrap();
        for name in ["corner post", "front riser board", "side riser board"] {
            assert!(l.members.iter().all(|m| m.name != name), "{name}");
        }
        let find = |name: &str| l.members.iter().find(|m| m.name == name).unwrap();
        let pavement = find("pavement");
        let footing = find("footing");
        let pavement_bottom = pavement.location.z - pavement.extent().z / 2.0;
        let footing_top = footing.location.z + footing.extent().z / 2.0;
        assert!((pavement_bottom - footing_top).abs() < 1e-9);
    }

    #[test]
    fn too_low_platform_is_degenerate() {
        let (mut p, floor) = template();
        p.platform_height = 0.1;
        let err = layout_platform(&p, &floor, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Degenerate { what: "platform riser height", .. }));
    }
}
