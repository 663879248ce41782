// The per-building Parameter Model.
//
// `BuildingParams` holds everything a user can set on one building: the
// module unit, platform size, bay counts and named bay widths, pillar size,
// wall arrangement, opening style, leaf and band counts, the clerestory and
// dwarf-wall flags, and the roof inputs that come from the external roof
// structure builder (`RoofFrame`).
//
// `BuildingParams::template(dk)` derives a complete default building from
// the module unit alone, using `TemplateRatios`. `validate()` runs the
// eager configuration checks and `validate_with(config)` adds the ones that
// need the proportion table; every rebuild entry point calls it before the
// first scene call, so a malformed input never leaves partial geometry.
//
// See also: `config.rs` for the fixed ratio table, `floor.rs` for the
// room-count rules, `building.rs` for the registry that stores these.

use crate::config::{LayoutConfig, PD_PER_DK, TemplateRatios};
use crate::error::{LayoutError, LayoutResult};
use crate::platform::COURSE_TOLERANCE;
use crate::types::{BandCount, WallLayout, WallStyle};
use crate::wall;
use serde::{Deserialize, Serialize};
use timberframe_scene::{Euler, Vec3};

// ---------------------------------------------------------------------------
// Room widths
// ---------------------------------------------------------------------------

/// Bay widths along X, from the centre outward. The flank width repeats for
/// the 9- and 11-bay layouts; the end width is always outermost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XRoomWidths {
    pub center: f64,
    pub side: f64,
    pub flank: f64,
    pub end: f64,
}

/// Bay widths along Y, from the centre outward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YRoomWidths {
    pub center: f64,
    pub side: f64,
    pub end: f64,
}

// ---------------------------------------------------------------------------
// Roof inputs
// ---------------------------------------------------------------------------

/// Geometry handed over by the roof structure builder, relative to the tile
/// root (see `tile_curve::tile_base_height`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoofFrame {
    /// Purlin locating points, eave purlin first, ridge last. With brackets
    /// the first entry is the bracket-carried eave purlin.
    pub purlins: Vec<Vec3>,
    /// Head of the front fly rafter.
    pub flyrafter_head: Vec3,
    /// Fly rafter slope angle (its Y rotation), in radians.
    pub flyrafter_pitch: f64,
    /// Centre and rotation of the front fascia board.
    pub fascia_location: Vec3,
    pub fascia_rotation: Euler,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoofParams {
    /// The eaves sit on bracket sets instead of a plain beam.
    pub use_brackets: bool,
    /// Height of the bracket layer, metres.
    pub bracket_height: f64,
    /// Horizontal projection added by the brackets, metres.
    pub bracket_extend: f64,
    /// Corner "rush" outward, in rafter diameters.
    pub chong: f64,
    /// Corner upturn, in rafter diameters.
    pub qiqiao: f64,
    #[serde(default)]
    pub frame: Option<RoofFrame>,
}

impl Default for RoofParams {
    fn default() -> Self {
        Self {
            use_brackets: false,
            bracket_height: 0.0,
            bracket_extend: 0.0,
            chong: 3.0,
            qiqiao: 4.0,
            frame: None,
        }
    }
}

// ---------------------------------------------------------------------------
// BuildingParams
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingParams {
    /// Module unit (dou-kou), metres.
    pub dk: f64,
    pub platform_height: f64,
    /// Distance the platform extends beyond the outer pillar line.
    pub platform_extend: f64,
    pub x_rooms: u32,
    pub x_room_widths: XRoomWidths,
    pub y_rooms: u32,
    pub y_room_widths: YRoomWidths,
    pub pillar_height: f64,
    pub pillar_diameter: f64,
    pub wall_layout: WallLayout,
    /// Style of the front bays other than the centre door.
    pub wall_style: WallStyle,
    /// Explicit opening list in `style#x/y#x/y,...` notation; overrides the
    /// openings generated from `wall_layout`.
    #[serde(default)]
    pub wall_net: Option<String>,
    /// Leaves per opening (2 or 4).
    pub door_num: u32,
    pub band_count: BandCount,
    pub use_clerestory: bool,
    /// Windows sit on a dwarf wall.
    pub use_dwarf_wall: bool,
    /// Height of the clerestory mid rail above the frame bottom.
    pub door_height: f64,
    /// Library asset used to fill lattice cores; `None` leaves cores empty.
    #[serde(default)]
    pub lattice_pattern: Option<String>,
    #[serde(default)]
    pub roof: RoofParams,
}

impl BuildingParams {
    /// The default building for a module unit.
    pub fn template(dk: f64) -> Self {
        Self::template_with(dk, &LayoutConfig::default())
    }

    pub fn template_with(dk: f64, config: &LayoutConfig) -> Self {
        let t: &TemplateRatios = &config.template;
        let pd = dk * PD_PER_DK;
        let [xc, xs, xf, xe] = t.x_room_widths;
        let [yc, ys, ye] = t.y_room_widths;
        Self {
            dk,
            platform_height: t.platform_height * pd,
            platform_extend: t.platform_extend * pd,
            x_rooms: 3,
            x_room_widths: XRoomWidths { center: xc * dk, side: xs * dk, flank: xf * dk, end: xe * dk },
            y_rooms: 3,
            y_room_widths: YRoomWidths { center: yc * dk, side: ys * dk, end: ye * dk },
            pillar_height: t.pillar_height * dk,
            pillar_diameter: t.pillar_diameter * dk,
            wall_layout: WallLayout::NoCorridor,
            wall_style: WallStyle::Window,
            wall_net: None,
            door_num: 4,
            band_count: BandCount::Five,
            use_clerestory: true,
            use_dwarf_wall: true,
            door_height: t.door_height * dk,
            lattice_pattern: Some(config.assets.lattice_core.clone()),
            roof: RoofParams::default(),
        }
    }

    pub fn from_json(json: &str) -> LayoutResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pillar module: the theoretical pillar diameter, `6 * dk`.
    pub fn pd(&self) -> f64 {
        self.dk * PD_PER_DK
    }

    /// Eager configuration checks. Does not touch any scene.
    pub fn validate(&self) -> LayoutResult<()> {
        positive("dk", self.dk)?;
        positive("platform_height", self.platform_height)?;
        positive("platform_extend", self.platform_extend)?;
        positive("pillar_height", self.pillar_height)?;
        positive("pillar_diameter", self.pillar_diameter)?;
        positive("x_room_widths.center", self.x_room_widths.center)?;
        positive("x_room_widths.side", self.x_room_widths.side)?;
        positive("x_room_widths.flank", self.x_room_widths.flank)?;
        positive("x_room_widths.end", self.x_room_widths.end)?;
        positive("y_room_widths.center", self.y_room_widths.center)?;
        positive("y_room_widths.side", self.y_room_widths.side)?;
        positive("y_room_widths.end", self.y_room_widths.end)?;

        if self.x_rooms == 0 || self.x_rooms > 11 {
            return Err(LayoutError::RoomCount { axis: 'x', count: self.x_rooms, allowed: "odd, 1-11" });
        }
        if self.x_rooms % 2 == 0 {
            return Err(LayoutError::EvenRoomCount(self.x_rooms));
        }
        if self.y_rooms == 0 || self.y_rooms > 5 {
            return Err(LayoutError::RoomCount { axis: 'y', count: self.y_rooms, allowed: "1-5" });
        }
        if self.door_num != 2 && self.door_num != 4 {
            return Err(LayoutError::DoorCount(self.door_num));
        }
        if self.use_clerestory {
            positive("door_height", self.door_height)?;
        }
        if self.platform_extend <= self.pillar_diameter {
            return Err(LayoutError::Degenerate {
                what: "edge stone width (platform_extend - pillar_diameter)",
                value: self.platform_extend - self.pillar_diameter,
            });
        }
        if self.roof.use_brackets {
            positive("roof.bracket_height", self.roof.bracket_height)?;
        }
        if let Some(frame) = &self.roof.frame {
            let needed = if self.roof.use_brackets { 3 } else { 2 };
            if frame.purlins.len() < needed {
                return Err(LayoutError::Degenerate { what: "purlin count", value: frame.purlins.len() as f64 });
            }
        }
        if let Some(net) = &self.wall_net {
            wall::parse_wall_net(net)?;
        }
        Ok(())
    }

    /// `validate()` plus the checks that depend on the proportion table:
    /// the platform must hold at least the pavement and footing courses.
    pub fn validate_with(&self, config: &LayoutConfig) -> LayoutResult<()> {
        self.validate()?;
        let courses = config.stone.step_height + config.stone.ground_border;
        if self.platform_height < courses - COURSE_TOLERANCE {
            return Err(LayoutError::Degenerate {
                what: "platform height (below pavement plus footing courses)",
                value: self.platform_height,
            });
        }
        Ok(())
    }

    /// One-line summary of the parameters that shape geometry, attached to
    /// scene-failure errors and logs.
    pub fn context(&self) -> String {
        format!(
            "dk={} rooms={}x{} pillar={}x{} platform={}+{} doors={} bands={} clerestory={} dwarf_wall={} door_height={}",
            self.dk,
            self.x_rooms,
            self.y_rooms,
            self.pillar_height,
            self.pillar_diameter,
            self.platform_height,
            self.platform_extend,
            self.door_num,
            u32::from(self.band_count),
            self.use_clerestory,
            self.use_dwarf_wall,
            self.door_height,
        )
    }
}

fn positive(name: &'static str, value: f64) -> LayoutResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_scales_with_module_unit() {
        let p = BuildingParams::template(0.08);
        assert!((p.pd() - 0.48).abs() < 1e-12);
        assert!((p.x_room_widths.center - 77.0 * 0.08).abs() < 1e-12);
        assert!((p.pillar_height - 57.0 * 0.08).abs() < 1e-12);
        assert!((p.platform_height - 0.96).abs() < 1e-12);
        p.validate().unwrap();
    }

    #[test]
    fn platform_must_hold_pavement_and_footing() {
        let config = LayoutConfig::default();
        let mut p = BuildingParams::template(0.08);
        p.platform_height = 0.2;
        p.validate_with(&config).unwrap();
        p.platform_height = 0.1;
        p.validate().unwrap();
        assert!(matches!(p.validate_with(&config), Err(LayoutError::Degenerate { .. })));
    }

    #[test]
    fn params_roundtrip_through_json() {
        let p = BuildingParams::template(0.1);
        let json = serde_json::to_string(&p).unwrap();
        let back = BuildingParams::from_json(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut v = serde_json::to_value(BuildingParams::template(0.08)).unwrap();
        v["colour"] = serde_json::json!("red");
        let err = BuildingParams::from_json(&v.to_string()).unwrap_err();
        assert!(matches!(err, LayoutError::Json(_)));
    }

    #[test]
    fn even_x_room_count_is_rejected() {
        let mut p = BuildingParams::template(0.08);
        p.x_rooms = 4;
        assert!(matches!(p.validate(), Err(LayoutError::EvenRoomCount(4))));
        p.x_rooms = 0;
        assert!(matches!(p.validate(), Err(LayoutError::RoomCount { axis: 'x', .. })));
    }

    #[test]
    fn y_room_count_allows_even_values() {
        let mut p = BuildingParams::template(0.08);
        p.y_rooms = 4;
        p.validate().unwrap();
        p.y_rooms = 6;
        assert!(p.validate().is_err());
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let mut p = BuildingParams::template(0.08);
        p.dk = 0.0;
        assert!(matches!(p.validate(), Err(LayoutError::NonPositive { name: "dk", .. })));
        let mut p = BuildingParams::template(0.08);
        p.x_room_widths.end = -1.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn odd_door_count_is_rejected() {
        let mut p = BuildingParams::template(0.08);
        p.door_num = 3;
        assert!(matches!(p.validate(), Err(LayoutError::DoorCount(3))));
    }

    #[test]
    fn platform_extension_must_clear_pillar() {
        let mut p = BuildingParams::template(0.08);
        p.platform_extend = p.pillar_diameter;
        assert!(matches!(p.validate(), Err(LayoutError::Degenerate { .. })));
    }

    #[test]
    fn roof_frame_needs_a_slope() {
        let mut p = BuildingParams::template(0.08);
        p.roof.frame = Some(RoofFrame {
            purlins: vec![Vec3::new(8.0, 5.0, 0.0), Vec3::new(4.0, 0.0, 3.0)],
            flyrafter_head: Vec3::ZERO,
            flyrafter_pitch: 0.3,
            fascia_location: Vec3::ZERO,
            fascia_rotation: Euler::IDENTITY,
        });
        p.validate().unwrap();
        p.roof.use_brackets = true;
        p.roof.bracket_height = 0.9;
        assert!(matches!(p.validate(), Err(LayoutError::Degenerate { what: "purlin count", .. })));
    }

    #[test]
    fn malformed_wall_net_is_rejected_eagerly() {
        let mut p = BuildingParams::template(0.08);
        p.wall_net = Some("door#0/0".into());
        assert!(matches!(p.validate(), Err(LayoutError::WallNet { .. })));
    }
}
