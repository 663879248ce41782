// Immutable geometry descriptors produced by the layout engines.
//
// Layout engines never touch a scene. They return `Member`s (one primitive
// plus an ordered list of modifiers) grouped into `Assembly` trees, and
// `realize.rs` turns a finished tree into scene calls in a single explicit
// pass. Modifiers are data, not deferred state: a mirror, bevel or boolean
// subtraction is applied in list order when the member is realized, and
// later modifiers apply to every copy an earlier mirror produced.
//
// Primitive conventions (all centred on `location` unless noted):
// - `Box`: axis-aligned box of `size`.
// - `Cylinder`: axis along local Z, `depth` long.
// - `HexPrism`: long axis along local X; with `half` only the +Y half of
//   the prism is kept (a boss sitting on a face).
// - `Wedge`: right-triangular prism. Height is zero on the -Y face and
//   `size.z` on the +Y face, so the slope rises toward +Y.
// - `Curve`: polyline through `points`, optionally with a square section of
//   `bevel_depth`.
// - `Asset`: an instance of a named library asset. The origin sits at the
//   asset's minimum corner; an optional `GridArray` replicates it in rows
//   (along Z) and columns (along X).
//
// See also: `scene.rs` for the `Scene` trait, `realize.rs` for the
// descriptor-to-scene pass.

use crate::geom::{Axis, Euler, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ---------------------------------------------------------------------------
// Materials and modifier parameters
// ---------------------------------------------------------------------------

/// A material handle, resolved by name in the host scene.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRef(pub String);

impl MaterialRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for MaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Solver precision for boolean subtraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanPrecision {
    Fast,
    Exact,
}

/// Mirror across one or more axis planes through `about`. Every non-empty
/// combination of the selected axes produces a copy (X and Y together give
/// three copies: X, Y and XY). A bisect axis first clips the source to its
/// own side of the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MirrorSpec {
    pub axes: [bool; 3],
    pub bisect: [bool; 3],
    pub about: Vec3,
}

impl MirrorSpec {
    pub fn across(axis: Axis, about: Vec3) -> Self {
        let mut axes = [false; 3];
        axes[axis as usize] = true;
        Self { axes, bisect: [false; 3], about }
    }

    pub fn across_xy(about: Vec3) -> Self {
        Self { axes: [true, true, false], bisect: [false; 3], about }
    }

    pub fn with_bisect(mut self, axis: Axis) -> Self {
        self.bisect[axis as usize] = true;
        self
    }

    /// Number of copies the mirror produces (not counting the source).
    pub fn copy_count(&self) -> usize {
        let n = self.axes.iter().filter(|a| **a).count();
        (1usize << n) - 1
    }
}

/// Replication of an asset instance in a rows x cols grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridArray {
    pub rows: u32,
    pub cols: u32,
    /// Z distance between consecutive rows.
    pub row_span: f64,
    /// X distance between consecutive columns.
    pub col_span: f64,
}

/// Control polyline for a curve primitive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    pub points: SmallVec<[Vec3; 5]>,
    /// Smoothing order of the spline through the points.
    pub order: u32,
    pub closed: bool,
    /// Side of the square section swept along the curve; 0 for a bare curve.
    pub bevel_depth: f64,
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { size: Vec3 },
    Cylinder { radius: f64, depth: f64 },
    HexPrism { size: Vec3, half: bool },
    Wedge { size: Vec3 },
    Curve(CurveSpec),
    Asset { name: String, unit: Vec3, array: Option<GridArray> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    Subtract { tool: Box<Member>, precision: BooleanPrecision },
    Mirror(MirrorSpec),
    Bevel { width: f64 },
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// One named primitive with its placement and modifier stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub shape: Shape,
    pub location: Vec3,
    pub rotation: Euler,
    pub scale: Vec3,
    pub modifiers: SmallVec<[Modifier; 3]>,
    pub material: Option<MaterialRef>,
}

impl Member {
    pub fn new(name: impl Into<String>, shape: Shape, location: Vec3) -> Self {
        Self {
            name: name.into(),
            shape,
            location,
            rotation: Euler::IDENTITY,
            scale: Vec3::ONE,
            modifiers: SmallVec::new(),
            material: None,
        }
    }

    pub fn cuboid(name: impl Into<String>, location: Vec3, size: Vec3) -> Self {
        Self::new(name, Shape::Box { size }, location)
    }

    pub fn rotated(mut self, rotation: Euler) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn mirrored(mut self, spec: MirrorSpec) -> Self {
        self.modifiers.push(Modifier::Mirror(spec));
        self
    }

    pub fn beveled(mut self, width: f64) -> Self {
        self.modifiers.push(Modifier::Bevel { width });
        self
    }

    pub fn subtracting(mut self, tool: Member, precision: BooleanPrecision) -> Self {
        self.modifiers.push(Modifier::Subtract { tool: Box::new(tool), precision });
        self
    }

    pub fn with_material(mut self, material: &MaterialRef) -> Self {
        self.material = Some(material.clone());
        self
    }

    /// Size of the primitive's local bounding box (before scale).
    pub fn extent(&self) -> Vec3 {
        match &self.shape {
            Shape::Box { size } | Shape::HexPrism { size, .. } | Shape::Wedge { size } => *size,
            Shape::Cylinder { radius, depth } => Vec3::new(radius * 2.0, radius * 2.0, *depth),
            Shape::Curve(c) => {
                let b = crate::geom::Aabb::from_points(c.points.iter().copied());
                b.map(|b| b.size() + Vec3::ONE * c.bevel_depth).unwrap_or(Vec3::ZERO)
            }
            Shape::Asset { unit, array, .. } => match array {
                Some(a) => Vec3::new(
                    a.col_span * f64::from(a.cols.saturating_sub(1)) + unit.x,
                    unit.y,
                    a.row_span * f64::from(a.rows.saturating_sub(1)) + unit.z,
                ),
                None => *unit,
            },
        }
    }

    /// Number of scene objects this member produces once realized (mirror
    /// copies included, boolean tools excluded).
    pub fn object_count(&self) -> usize {
        let mut n = 1;
        for m in &self.modifiers {
            if let Modifier::Mirror(spec) = m {
                n += n * spec.copy_count();
            }
        }
        n
    }

    /// True if any modifier on this member mirrors across `axis`.
    pub fn is_mirrored_across(&self, axis: Axis) -> bool {
        self.modifiers
            .iter()
            .any(|m| matches!(m, Modifier::Mirror(s) if s.axes[axis as usize]))
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// A named group of members and sub-assemblies placed as one scene node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub name: String,
    pub location: Vec3,
    pub rotation: Euler,
    pub members: Vec<Member>,
    pub children: Vec<Assembly>,
    /// Merge all members into one object after realization.
    pub join: bool,
    /// Bevel applied to the joined object.
    pub join_bevel: Option<f64>,
    /// When joined, restrict rotation to this single axis.
    pub rotation_lock: Option<Axis>,
}

impl Assembly {
    pub fn new(name: impl Into<String>, location: Vec3) -> Self {
        Self { name: name.into(), location, ..Default::default() }
    }

    pub fn rotated(mut self, rotation: Euler) -> Self {
        self.rotation = rotation;
        self
    }

    /// Total scene objects produced by this tree, excluding group nodes.
    pub fn object_count(&self) -> usize {
        let own = if self.join && !self.members.is_empty() {
            1
        } else {
            self.members.iter().map(Member::object_count).sum()
        };
        own + self.children.iter().map(Assembly::object_count).sum::<usize>()
    }

    /// Depth-first iterator over every member in the tree.
    pub fn all_members(&self) -> Vec<&Member> {
        let mut out: Vec<&Member> = self.members.iter().collect();
        for c in &self.children {
            out.extend(c.all_members());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_copy_counts() {
        assert_eq!(MirrorSpec::across(Axis::X, Vec3::ZERO).copy_count(), 1);
        assert_eq!(MirrorSpec::across_xy(Vec3::ZERO).copy_count(), 3);
    }

    #[test]
    fn mirrored_member_object_count() {
        let m = Member::cuboid("post", Vec3::ZERO, Vec3::ONE)
            .mirrored(MirrorSpec::across(Axis::X, Vec3::ZERO))
            .beveled(0.02);
        assert_eq!(m.object_count(), 2);
        assert!(m.is_mirrored_across(Axis::X));
        assert!(!m.is_mirrored_across(Axis::Y));
    }

    #[test]
    fn grid_array_extent() {
        let m = Member::new(
            "fill",
            Shape::Asset {
                name: "unit".into(),
                unit: Vec3::new(0.1, 0.02, 0.2),
                array: Some(GridArray { rows: 3, cols: 4, row_span: 0.5, col_span: 0.25 }),
            },
            Vec3::ZERO,
        );
        let e = m.extent();
        assert!((e.x - (0.75 + 0.1)).abs() < 1e-12);
        assert!((e.z - (1.0 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn joined_assembly_counts_as_one_object() {
        let mut a = Assembly::new("leaf", Vec3::ZERO);
        a.members.push(Member::cuboid("a", Vec3::ZERO, Vec3::ONE));
        a.members.push(Member::cuboid("b", Vec3::ZERO, Vec3::ONE));
        assert_eq!(a.object_count(), 2);
        a.join = true;
        assert_eq!(a.object_count(), 1);
    }
}
