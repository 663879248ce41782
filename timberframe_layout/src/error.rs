// Error hierarchy for the layout crate.
//
// Configuration errors are raised eagerly, before any scene call. Scene
// failures are wrapped with a description of the build that produced them
// so a failing geometry can be reproduced from the log alone.

use crate::types::{BuildingId, ComponentKind};
use thiserror::Error;
use timberframe_scene::SceneError;

#[derive(Error, Debug)]
pub enum LayoutError {
    /// Room count outside the supported range on one axis.
    #[error("{axis} room count {count} is out of range ({allowed})")]
    RoomCount { axis: char, count: u32, allowed: &'static str },

    /// The x axis always has a centre bay, so its room count must be odd.
    #[error("x room count must be odd, got {0}")]
    EvenRoomCount(u32),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("door leaf count must be 2 or 4, got {0}")]
    DoorCount(u32),

    /// A derived dimension collapsed to zero or below.
    #[error("degenerate {what}: computed {value}")]
    Degenerate { what: &'static str, value: f64 },

    #[error("invalid wall net entry {entry:?}: {reason}")]
    WallNet { entry: String, reason: &'static str },

    #[error("wall layout {layout} needs {needed}")]
    WallLayout { layout: &'static str, needed: &'static str },

    #[error("no building registered as {0}")]
    MissingBuilding(BuildingId),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A scene call failed part-way through a build.
    #[error("scene failure while building {component:?} of {building} ({context}): {source}")]
    Scene {
        building: BuildingId,
        component: ComponentKind,
        context: String,
        #[source]
        source: SceneError,
    },
}

pub type LayoutResult<T> = Result<T, LayoutError>;
