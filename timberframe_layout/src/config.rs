// Data-driven proportion tables.
//
// Every fixed ratio the layout engines use lives in `LayoutConfig`, grouped
// the way a carpenter's handbook groups them:
// - `Proportions`: joinery members of frames and leaves, in pillar-module
//   units ("PD", see below) unless a field says otherwise.
// - `StoneCourse`: platform and step masonry, in metres.
// - `RoofStack`: roof layer thicknesses and eave projections, in dou-kou
//   ("DK") units.
// - `TemplateRatios`: the default building's bay widths and heights, in DK.
// - `TileCourse`: spacing of the sampled tile grid, in metres.
// - `Finish`: bevel widths and material names.
// - `AssetNames`: library assets the engines instance.
//
// The pillar module is `pd = 6 * dk`, the theoretical pillar diameter. It
// is independent of the user-set pillar diameter, which is only used where
// geometry touches real pillars.
//
// The engines never hardcode these numbers; they read them from the config.
// `LayoutConfig::default()` reproduces the traditional table, and the whole
// structure loads from JSON so a different regional convention can be tried
// without recompiling.
//
// See also: `params.rs` for the per-building parameters that the ratios
// multiply, `frame.rs`, `leaf.rs`, `platform.rs` and `tile_curve.rs` for the
// consumers.

use serde::{Deserialize, Serialize};

/// Ratio of pillar module to dou-kou.
pub const PD_PER_DK: f64 = 6.0;

// ---------------------------------------------------------------------------
// Nested parameter groups
// ---------------------------------------------------------------------------

/// Joinery member proportions, in PD unless noted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proportions {
    /// Bottom sill height and depth.
    pub sill_height: f64,
    pub sill_depth: f64,
    /// Clerestory mid rail height and depth.
    pub mid_rail_height: f64,
    pub mid_rail_depth: f64,
    /// Top lintel height and depth.
    pub lintel_height: f64,
    pub lintel_depth: f64,
    /// Wind sill capping a dwarf wall.
    pub wind_sill_height: f64,
    pub wind_sill_depth: f64,
    /// Door-frame post width (along the wall) and depth.
    pub post_width: f64,
    pub post_depth: f64,
    /// Leaf border (stile and rail) width and depth.
    pub border_width: f64,
    pub border_depth: f64,
    /// Lattice-core border ring width and depth.
    pub lattice_border_width: f64,
    pub lattice_border_depth: f64,
    /// Fraction of the free leaf height given to the lattice core when the
    /// leaf has a dado below. The remainder goes to the dado.
    pub core_ratio: f64,
    /// Window board under a dwarf wall's wind sill.
    pub window_board_depth: f64,
    pub window_board_height: f64,
    /// Window board overhang beyond the wall on each side, in metres.
    pub window_board_overhang: f64,
    /// Solid wall thickness.
    pub wall_depth: f64,
    /// Pivot boss block.
    pub boss_width: f64,
    pub boss_depth: f64,
    pub boss_height: f64,
    /// Leaf pivot cylinder radius.
    pub pivot_radius: f64,
    /// Clearance around each leaf, in metres.
    pub leaf_gap: f64,
    /// Beam height carrying the roof when no brackets are used.
    pub beam_height: f64,
}

impl Default for Proportions {
    fn default() -> Self {
        Self {
            sill_height: 0.8,
            sill_depth: 0.3,
            mid_rail_height: 0.66,
            mid_rail_depth: 0.3,
            lintel_height: 0.5,
            lintel_depth: 0.3,
            wind_sill_height: 0.5,
            wind_sill_depth: 0.3,
            post_width: 0.66,
            post_depth: 0.3,
            border_width: 0.2,
            border_depth: 0.3,
            lattice_border_width: 0.1,
            lattice_border_depth: 0.1,
            core_ratio: 0.6,
            window_board_depth: 1.5,
            window_board_height: 3.0 / 8.0,
            window_board_overhang: 0.1,
            wall_depth: 1.5,
            boss_width: 0.3 * 1.8 * 2.0,
            boss_depth: 0.3 * 1.8,
            boss_height: 0.8 * 0.5,
            pivot_radius: 0.1,
            leaf_gap: 0.02,
            beam_height: 1.4,
        }
    }
}

/// Platform and step masonry, in metres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoneCourse {
    /// Maximum rise of one step; also the pavement and riser-board thickness.
    pub step_height: f64,
    /// Step run per unit of rise.
    pub step_ratio: f64,
    /// Footing border projecting around the platform and steps.
    pub ground_border: f64,
    /// Length of the first edge stone as a fraction of end bay + extension.
    pub first_stone_ratio: f64,
}

impl Default for StoneCourse {
    fn default() -> Self {
        Self { step_height: 0.15, step_ratio: 2.5, ground_border: 0.05, first_stone_ratio: 0.3 }
    }
}

/// Roof layers and projections, in DK.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoofStack {
    pub purlin_diameter: f64,
    pub rafter_diameter: f64,
    pub decking_height: f64,
    pub roof_mud_height: f64,
    pub fly_rafter_height: f64,
    /// Fascia board (eave batten) height and depth.
    pub fascia_height: f64,
    pub fascia_depth: f64,
    /// Horizontal projection of eave rafters and fly rafters.
    pub rafter_projection: f64,
    pub fly_rafter_projection: f64,
    /// Corner beam width; the hip line is pulled in by a quarter of it.
    pub corner_beam_width: f64,
    /// Notch setting the eave tiles back from the fascia.
    pub notch: f64,
    /// Smoothing order of the main-slope curve.
    pub slope_curve_order: u32,
    /// Smoothing order of the eave and hip curves.
    pub edge_curve_order: u32,
}

impl Default for RoofStack {
    fn default() -> Self {
        Self {
            purlin_diameter: 4.0,
            rafter_diameter: 1.5,
            decking_height: 0.5,
            roof_mud_height: 3.75,
            fly_rafter_height: 1.5,
            fascia_height: 3.0,
            fascia_depth: 1.5,
            rafter_projection: 14.0,
            fly_rafter_projection: 7.0,
            corner_beam_width: 3.0,
            notch: 0.3,
            slope_curve_order: 4,
            edge_curve_order: 3,
        }
    }
}

impl RoofStack {
    /// Height of the tile bed above a purlin centre, in DK.
    pub fn stack_height(&self) -> f64 {
        self.purlin_diameter / 2.0 + self.rafter_diameter + self.decking_height + self.roof_mud_height
    }
}

/// Default building dimensions, in DK.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateRatios {
    pub x_room_widths: [f64; 4],
    pub y_room_widths: [f64; 3],
    pub pillar_height: f64,
    pub pillar_diameter: f64,
    pub door_height: f64,
    /// Platform height and extension, in PD.
    pub platform_height: f64,
    pub platform_extend: f64,
}

impl Default for TemplateRatios {
    fn default() -> Self {
        Self {
            x_room_widths: [77.0, 66.0, 66.0, 22.0],
            y_room_widths: [44.0, 44.0, 22.0],
            pillar_height: 57.0,
            pillar_diameter: 6.0,
            door_height: 40.0,
            platform_height: 2.0,
            platform_extend: 2.4,
        }
    }
}

/// Tile grid sampling, in metres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileCourse {
    /// Spacing between tile courses along the eave.
    pub course_width: f64,
    /// Spacing between tile rows up the slope.
    pub course_length: f64,
    /// Flat tiles sit this far off the course centre along local X.
    pub flat_tile_offset: f64,
}

impl Default for TileCourse {
    fn default() -> Self {
        Self { course_width: 0.3, course_length: 0.3, flat_tile_offset: 0.2 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finish {
    pub frame_bevel: f64,
    pub leaf_bevel: f64,
    pub platform_bevel: f64,
    pub step_bevel: f64,
    pub structural_material: String,
    pub stone_material: String,
}

impl Default for Finish {
    fn default() -> Self {
        Self {
            frame_bevel: 0.02,
            leaf_bevel: 0.01,
            platform_bevel: 0.04,
            step_bevel: 0.03,
            structural_material: "structural_red".into(),
            stone_material: "stone".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetNames {
    pub lattice_core: String,
    pub flat_tile: String,
    pub round_tile: String,
}

impl Default for AssetNames {
    fn default() -> Self {
        Self {
            lattice_core: "lattice_core".into(),
            flat_tile: "flat_tile".into(),
            round_tile: "round_tile".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

/// The full proportion table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub proportions: Proportions,
    pub stone: StoneCourse,
    pub roof: RoofStack,
    pub template: TemplateRatios,
    pub tiles: TileCourse,
    pub finish: Finish,
    pub assets: AssetNames,
}

impl LayoutConfig {
    /// Parse a config from JSON. Missing groups fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = LayoutConfig::default();
        let json = config.to_json_pretty().unwrap();
        let restored = LayoutConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn config_loads_from_partial_json_string() {
        let json = r#"{
            "stone": {
                "step_height": 0.12,
                "step_ratio": 3.0,
                "ground_border": 0.04,
                "first_stone_ratio": 0.25
            }
        }"#;
        let config = LayoutConfig::from_json(json).unwrap();
        assert_eq!(config.stone.step_height, 0.12);
        assert_eq!(config.proportions, Proportions::default());
        assert_eq!(config.roof.slope_curve_order, 4);
    }

    #[test]
    fn stack_height_sums_roof_layers() {
        let roof = RoofStack::default();
        assert!((roof.stack_height() - (2.0 + 1.5 + 0.5 + 3.75)).abs() < 1e-12);
    }

    #[test]
    fn boss_dimensions_follow_traditional_table() {
        let p = Proportions::default();
        assert!((p.boss_width - 2.0 * p.boss_depth).abs() < 1e-12);
        assert!((p.boss_height - 0.4).abs() < 1e-12);
    }
}
