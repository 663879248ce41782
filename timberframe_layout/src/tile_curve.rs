// Roof-tile curve fitting.
//
// Builds the three polylines a tile surface is lofted from, all in the tile
// root frame (see `tile_base_height`) and for the +X, +Y quarter of the
// roof; tiles are mirrored to the other quarters.
//
// main  The tile course line up the slope, in the YZ plane. It starts at
//       the fly-rafter head, lifted by half a fly rafter plus the fascia
//       board and tilted to the fly rafter's pitch, then passes above each
//       rafter purlin at the full roof stack height (half purlin, rafter,
//       decking, roof mud).
// eave  Fascia centre, a point level with it at the first interior purlin's
//       X (where the upturn starts), a midpoint, and the corner point.
// hip   Starts at the corner point, then follows the main curve's purlin
//       points shifted out to the corner's X and up by the corner upturn.
//
// The corner point is computed from the traditional "rush 3, tilt 4"
// upturn rule (eave projection plus `chong` rafters outward, `qiqiao`
// rafters up), not from any corner-rafter geometry, so the tiles do not
// depend on the rafter builder's output. Eave and hip curves are moved from
// the fascia centre to its outer top edge.
//
// With brackets, the eave purlin carried by the brackets is not part of the
// rafter slope and is dropped before fitting.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::floor::FloorNet;
use crate::params::{BuildingParams, RoofFrame, RoofParams};
use smallvec::SmallVec;
use timberframe_scene::{CurveSpec, Member, Shape, Vec3};

/// Height of the tile root above the ground: platform, pillars, then the
/// bracket layer or the beam that carries the roof.
pub fn tile_base_height(params: &BuildingParams, config: &LayoutConfig) -> f64 {
    let carrier = if params.roof.use_brackets {
        params.roof.bracket_height
    } else {
        config.proportions.beam_height * params.pd()
    };
    params.platform_height + params.pillar_height + carrier
}

/// The purlins the rafters rest on, eave first.
pub fn rafter_purlins<'a>(roof: &RoofParams, frame: &'a RoofFrame) -> &'a [Vec3] {
    if roof.use_brackets && !frame.purlins.is_empty() {
        &frame.purlins[1..]
    } else {
        &frame.purlins
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileCurves {
    pub main: CurveSpec,
    pub eave: CurveSpec,
    pub hip: CurveSpec,
    /// Eave corner point, before the fascia-edge offset.
    pub corner: Vec3,
    /// Corner upturn, metres.
    pub upturn: f64,
}

impl TileCurves {
    pub fn members(&self) -> Vec<Member> {
        vec![
            Member::new("main tile curve", Shape::Curve(self.main.clone()), Vec3::ZERO),
            Member::new("eave tile curve", Shape::Curve(self.eave.clone()), Vec3::ZERO),
            Member::new("hip tile curve", Shape::Curve(self.hip.clone()), Vec3::ZERO),
        ]
    }
}

fn open_curve(points: SmallVec<[Vec3; 5]>, order: u32) -> CurveSpec {
    CurveSpec { points, order, closed: false, bevel_depth: 0.0 }
}

pub fn fit_tile_curves(
    params: &BuildingParams,
    floor: &FloorNet,
    frame: &RoofFrame,
    config: &LayoutConfig,
) -> LayoutResult<TileCurves> {
    let r = &config.roof;
    let dk = params.dk;
    let purlins = rafter_purlins(&params.roof, frame);
    if purlins.len() < 2 {
        return Err(LayoutError::Degenerate { what: "rafter purlin count", value: purlins.len() as f64 });
    }
    let stack = Vec3::new(0.0, 0.0, r.stack_height() * dk);

    let lift = Vec3::new(0.0, 0.0, (r.fly_rafter_height / 2.0 + r.fascia_height) * dk);
    let mut main: SmallVec<[Vec3; 5]> = SmallVec::new();
    main.push(frame.flyrafter_head.yz() + lift.rotated_x(-frame.flyrafter_pitch));
    main.extend(purlins.iter().map(|p| p.yz() + stack));

    let mut ex = (r.rafter_projection + r.fly_rafter_projection) * dk + params.roof.chong * r.rafter_diameter * dk;
    if params.roof.use_brackets {
        ex += params.roof.bracket_extend;
    }
    let shift = r.corner_beam_width / 4.0 * dk * std::f64::consts::SQRT_2;
    let upturn = params.roof.qiqiao * r.rafter_diameter * dk;
    let cx = floor.x_total / 2.0 + ex - shift;
    let cy = floor.y_total / 2.0 + ex - r.notch * dk;
    let edge = Vec3::new(0.0, r.fascia_height * dk / 2.0, -r.fascia_depth * dk / 2.0 - r.notch * dk)
        .rotated(frame.fascia_rotation);

    let p1 = frame.fascia_location;
    let p2 = p1 + Vec3::new(purlins[1].x, 0.0, 0.0);
    let corner = Vec3::new(cx, cy, p2.z + upturn);
    // Literal 1/8 height: a visual correction, not a derived value.
    let p3 = Vec3::new((p2.x + corner.x) / 2.0, p2.y, (p2.z + corner.z) / 8.0);
    let eave: SmallVec<[Vec3; 5]> = [p1, p2, p3, corner].iter().map(|p| *p + edge).collect();

    let mut hip: SmallVec<[Vec3; 5]> = SmallVec::new();
    hip.push(Vec3::new(cx, cy, p1.z + upturn) + edge);
    hip.extend(purlins.iter().map(|p| p.yz() + stack + Vec3::new(cx, 0.0, upturn)));

    Ok(TileCurves {
        main: open_curve(main, r.slope_curve_order),
        eave: open_curve(eave, r.edge_curve_order),
        hip: open_curve(hip, r.edge_curve_order),
        corner,
        upturn,
    })
}
