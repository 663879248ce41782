// Lattice-core fill.
//
// A lattice core is a rectangular panel in the XZ plane: a border ring of
// square section plus a grid of library-asset units. The grid is not plain
// tiling. It uses `ceil(inner / unit) + 1` rows and columns, then stretches
// the spacing so the grid exactly spans the inner region, which gives one
// extra row and column of overlap for visual density.
//
// Missing assets and empty regions are not errors: with no unit (or a
// computed row/column count of zero or less) the core is just its ring.
//
// Used by `leaf.rs` for leaf cores and by `frame.rs` for clerestory slots.

use crate::config::LayoutConfig;
use smallvec::smallvec;
use timberframe_scene::{CurveSpec, GridArray, Member, Shape, Vec3};

/// A resolved lattice pattern asset.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeUnit {
    pub name: String,
    /// Instance dimensions; x is the column pitch, z the row pitch.
    pub size: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LatticeLayout {
    pub ring: Member,
    pub fill: Option<Member>,
    pub rows: i64,
    pub cols: i64,
}

impl LatticeLayout {
    pub fn into_members(self) -> Vec<Member> {
        let mut v = vec![self.ring];
        v.extend(self.fill);
        v
    }
}

/// Lay out a lattice core of `size` (width, depth, height) centred at
/// `location`. `pd` is the pillar module.
pub fn layout_lattice(
    name: &str,
    size: Vec3,
    location: Vec3,
    unit: Option<&LatticeUnit>,
    pd: f64,
    config: &LayoutConfig,
) -> LatticeLayout {
    let zw = config.proportions.lattice_border_width * pd;
    let inner_h = size.z - 2.0 * zw;
    let inner_w = size.x - 2.0 * zw;

    let hx = (size.x - zw) / 2.0;
    let hz = (size.z - zw) / 2.0;
    let ring = Member::new(
        format!("{name} border"),
        Shape::Curve(CurveSpec {
            points: smallvec![
                Vec3::new(-hx, 0.0, -hz),
                Vec3::new(hx, 0.0, -hz),
                Vec3::new(hx, 0.0, hz),
                Vec3::new(-hx, 0.0, hz),
            ],
            order: 1,
            closed: true,
            bevel_depth: zw,
        }),
        location,
    );

    let Some(unit) = unit.filter(|u| u.size.x > 0.0 && u.size.z > 0.0) else {
        return LatticeLayout { ring, fill: None, rows: 0, cols: 0 };
    };

    let rows = (inner_h / unit.size.z).ceil() as i64 + 1;
    let cols = (inner_w / unit.size.x).ceil() as i64 + 1;
    if rows <= 0 || cols <= 0 || inner_h <= 0.0 || inner_w <= 0.0 {
        return LatticeLayout { ring, fill: None, rows, cols };
    }

    let origin = Vec3::new(location.x - size.x / 2.0 + zw, location.y, location.z - size.z / 2.0 + zw);
    let fill = Member::new(
        format!("{name} fill"),
        Shape::Asset {
            name: unit.name.clone(),
            unit: unit.size,
            array: Some(GridArray {
                rows: rows as u32,
                cols: cols as u32,
                row_span: inner_h / rows as f64,
                col_span: inner_w / cols as f64,
            }),
        },
        origin,
    );
    LatticeLayout { ring, fill: Some(fill), rows, cols }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> LatticeUnit {
        LatticeUnit { name: "lattice_core".into(), size: Vec3::new(0.1, 0.02, 0.15) }
    }

    #[test]
    fn fill_counts_add_one_extra_row_and_column() {
        let config = LayoutConfig::default();
        let pd = 0.48;
        let zw = 0.1 * pd;
        let size = Vec3::new(0.63 + 2.0 * zw, 0.05, 0.93 + 2.0 * zw);
        let l = layout_lattice("core", size, Vec3::ZERO, Some(&unit()), pd, &config);
        // ceil(6.3) + 1 and ceil(6.2) + 1.
        assert_eq!(l.cols, 8);
        assert_eq!(l.rows, 8);
        let Some(Member { shape: Shape::Asset { array: Some(a), .. }, location, .. }) = &l.fill else {
            panic!("expected a grid fill");
        };
        assert!((a.col_span * a.cols as f64 - 0.63).abs() < 1e-9);
        assert!((a.row_span * a.rows as f64 - 0.93).abs() < 1e-9);
        assert!((location.x - (-0.315)).abs() < 1e-9);
        assert!((location.z - (-0.465)).abs() < 1e-9);
    }

    #[test]
    fn missing_unit_gives_ring_only() {
        let config = LayoutConfig::default();
        let l = layout_lattice("core", Vec3::new(0.6, 0.05, 0.9), Vec3::ZERO, None, 0.48, &config);
        assert!(l.fill.is_none());
        assert_eq!(l.into_members().len(), 1);
    }

    #[test]
    fn degenerate_region_gives_ring_only() {
        let config = LayoutConfig::default();
        let pd = 0.48;
        // Narrower than the two border widths: nothing to fill.
        let l = layout_lattice("slot", Vec3::new(0.05, 0.05, 0.9), Vec3::ZERO, Some(&unit()), pd, &config);
        assert!(l.fill.is_none());
    }

    #[test]
    fn ring_outer_edge_matches_region() {
        let config = LayoutConfig::default();
        let pd = 0.48;
        let size = Vec3::new(0.6, 0.05, 0.9);
        let l = layout_lattice("core", size, Vec3::ZERO, None, pd, &config);
        let e = l.ring.extent();
        assert!((e.x - 0.6).abs() < 1e-9);
        assert!((e.z - 0.9).abs() < 1e-9);
    }
}
