// timberframe_layout: parametric layout of timber-frame buildings.
//
// Turns a small set of building parameters (module unit, bay counts and
// widths, pillar size, wall arrangement, leaf and band counts) into the
// members of a traditional timber-frame hall: door and window frames,
// lattice leaves, dwarf walls, the stone platform and stairs, and the roof
// tile surface. Every engine is a pure function from parameters to
// `timberframe_scene` descriptors; only `building.rs` talks to a `Scene`.
//
// Module overview:
// - `config.rs`:     LayoutConfig: every fixed proportion, stone course,
//                    roof layer, finish and asset name, loadable from JSON.
// - `params.rs`:     BuildingParams: the per-building Parameter Model,
//                    template defaults and eager validation.
// - `types.rs`:      BuildingId, ComponentKind, WallLayout, WallStyle,
//                    Orientation, Side, BandCount.
// - `error.rs`:      LayoutError.
// - `floor.rs`:      Pillar grid from bay counts and widths.
// - `frame.rs`:      Door frame: sill, posts, lintel, clerestory.
// - `leaf.rs`:       Leaf band decomposition, stiles and pivot.
// - `lattice.rs`:    Lattice-core ring and stretched unit grid.
// - `door.rs`:       One opening: frame, leaves and dwarf wall.
// - `wall.rs`:       Wall-net notation and opening placement on the grid.
// - `platform.rs`:   Platform stone courses.
// - `steps.rs`:      Stairs in front of centred doors.
// - `tile_curve.rs`: Main, eave and hip curves of the tile surface.
// - `tile_grid.rs`:  Lofted tile grid, per-face frames, tile placement.
// - `building.rs`:   BuildingRegistry and the rebuild entry points.
// - `progress.rs`:   Progress reporting for rebuilds.
//
// Logging goes through `tracing`; the library never installs a
// subscriber. The `rebuild` binary does.

pub mod building;
pub mod config;
pub mod door;
pub mod error;
pub mod floor;
pub mod frame;
pub mod lattice;
pub mod leaf;
pub mod params;
pub mod platform;
pub mod progress;
pub mod steps;
pub mod tile_curve;
pub mod tile_grid;
pub mod types;
pub mod wall;

pub use building::{BuildingInstance, BuildingRegistry};
pub use config::LayoutConfig;
pub use error::{LayoutError, LayoutResult};
pub use params::{BuildingParams, RoofFrame, RoofParams};
pub use progress::{BuildStage, NullProgress, ProgressLog, ProgressSink};
pub use types::{BandCount, BuildingId, ComponentKind, WallLayout, WallStyle};
