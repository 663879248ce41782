// The scene/geometry API boundary.
//
// Every geometry side effect of the layout crate goes through the `Scene`
// trait. Calls take explicit node handles; there is no ambient "active
// object". Backends are not transactional: when a call fails half-way
// through a build, the caller removes the partial output with
// `delete_hierarchy`.
//
// `MemoryScene` (see `memory.rs`) is the in-crate backend. A host
// application implements the same trait over its own object model.

use crate::error::SceneResult;
use crate::geom::{Aabb, Axis, Euler, Vec3};
use crate::shape::{BooleanPrecision, CurveSpec, GridArray, MaterialRef, MirrorSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a scene node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A library asset resolved by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub name: String,
    /// Bounding dimensions of one instance.
    pub dimensions: Vec3,
}

pub trait Scene {
    /// Create a grouping node with no geometry.
    fn create_empty(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId>;

    fn create_box(
        &mut self,
        parent: NodeId,
        name: &str,
        size: Vec3,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId>;

    fn create_cylinder(
        &mut self,
        parent: NodeId,
        name: &str,
        radius: f64,
        depth: f64,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId>;

    fn create_hex_prism(
        &mut self,
        parent: NodeId,
        name: &str,
        size: Vec3,
        location: Vec3,
        half: bool,
    ) -> SceneResult<NodeId>;

    /// Right-triangular prism rising toward +Y.
    fn create_wedge(
        &mut self,
        parent: NodeId,
        name: &str,
        size: Vec3,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId>;

    fn create_polyline_curve(
        &mut self,
        parent: NodeId,
        name: &str,
        curve: &CurveSpec,
        location: Vec3,
    ) -> SceneResult<NodeId>;

    /// Look up a library asset. `Ok(None)` means the asset is not available.
    fn load_named_asset(&mut self, name: &str) -> SceneResult<Option<AssetInfo>>;

    fn instance_asset(
        &mut self,
        parent: NodeId,
        asset: &AssetInfo,
        location: Vec3,
        rotation: Euler,
        array: Option<GridArray>,
    ) -> SceneResult<NodeId>;

    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> SceneResult<()>;

    /// Non-destructive mirror: returns a new sibling node holding the
    /// mirrored copies. `spec.about` is expressed in the parent's frame.
    fn mirror(&mut self, node: NodeId, spec: &MirrorSpec) -> SceneResult<NodeId>;

    /// Subtract `tool` from `target`. The tool is consumed.
    fn boolean_subtract(
        &mut self,
        target: NodeId,
        tool: NodeId,
        precision: BooleanPrecision,
    ) -> SceneResult<()>;

    fn bevel_edges(&mut self, node: NodeId, width: f64) -> SceneResult<()>;

    fn assign_material(&mut self, node: NodeId, material: &MaterialRef) -> SceneResult<()>;

    /// Merge objects sharing one parent into a single new object. The inputs
    /// are consumed.
    fn join(&mut self, nodes: &[NodeId]) -> SceneResult<NodeId>;

    /// Allow rotation about `free_axis` only.
    fn lock_rotation(&mut self, node: NodeId, free_axis: Axis) -> SceneResult<()>;

    /// World-space bounds of a node and all its descendants. `None` if the
    /// hierarchy carries no geometry.
    fn bounds_of_hierarchy(&self, root: NodeId) -> SceneResult<Option<Aabb>>;

    fn delete_hierarchy(&mut self, root: NodeId, include_root: bool) -> SceneResult<()>;

    /// `count` points evenly spaced by arc length along a curve, in the
    /// curve's parent frame.
    fn axis_aligned_spacing_points(&self, curve: NodeId, count: usize) -> SceneResult<Vec<Vec3>>;
}
