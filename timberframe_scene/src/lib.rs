// timberframe_scene: geometry descriptors and the scene API boundary.
//
// Layout engines in `timberframe_layout` are pure functions that return
// immutable descriptors from this crate; the only code that talks to a scene
// is `realize.rs`. Keeping the descriptor types and the `Scene` trait in a
// leaf crate lets host integrations depend on them without pulling in the
// layout rules.
//
// Module overview:
// - `geom.rs`:    Vec3, Euler, Axis, Transform, Aabb.
// - `shape.rs`:   Shape, Member, Modifier, Assembly, MaterialRef, MirrorSpec.
// - `scene.rs`:   The `Scene` trait (primitive creation, mirror, boolean,
//                 bevel, material, join, bounds, delete, asset lookup,
//                 curve sampling) and `NodeId`.
// - `realize.rs`: Descriptor tree -> scene calls.
// - `memory.rs`:  MemoryScene, a deterministic in-memory arena backend.
// - `error.rs`:   SceneError.

pub mod error;
pub mod geom;
pub mod memory;
pub mod realize;
pub mod scene;
pub mod shape;

pub use error::{SceneError, SceneResult};
pub use geom::{Aabb, Axis, Euler, Transform, Vec3};
pub use memory::MemoryScene;
pub use scene::{AssetInfo, NodeId, Scene};
pub use shape::{
    Assembly, BooleanPrecision, CurveSpec, GridArray, MaterialRef, Member, MirrorSpec, Modifier,
    Shape,
};
