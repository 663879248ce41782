// Building registry and the rebuild entry points.
//
// `BuildingRegistry` owns one `BuildingInstance` (parameters plus solved
// floor net) per building, keyed by `BuildingId` in a `BTreeMap` so
// iteration is deterministic. Each building has up to three component
// roots in the scene, one per `ComponentKind`, tracked in an FxHashMap
// index keyed by `(BuildingId, ComponentKind)`:
//
//   platform  at half the platform height: stone courses plus one stair
//             child per centred door
//   walls     on the platform top: one child per wall opening
//   tiles     at `tile_base_height`: the three tile curves and the placed
//             tiles
//
// A rebuild runs in two phases. Planning calls the pure layout engines for
// every requested component (asset lookups are the only scene calls), so
// any configuration or degenerate-geometry error surfaces before the scene
// changes. Applying then replaces each component root: the old hierarchy
// is deleted and the new one realized under a fresh root. Rebuilding with
// the same parameters therefore leaves an equivalent scene.
//
// A scene failure while applying deletes the partial root, drops the
// component from the index, logs the error with the building's parameter
// context, and returns `LayoutError::Scene`. Components applied earlier in
// the same rebuild stay in place.
//
// Missing optional inputs degrade instead of failing: no lattice asset
// leaves lattice cores as bare rings, no roof frame skips the tiles
// component, and no tile assets keep the curves without placing tiles.
//
// See also: `progress.rs` for the stage reports, `params.rs` for the eager
// validation, and the `timberframe_scene::realize` pass that turns layouts
// into scene calls.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::floor::FloorNet;
use crate::lattice::LatticeUnit;
use crate::params::BuildingParams;
use crate::platform::layout_platform;
use crate::progress::{BuildStage, Monotonic, ProgressSink};
use crate::steps::{layout_stair, stair_sites};
use crate::tile_curve::{TileCurves, fit_tile_curves, tile_base_height};
use crate::tile_grid::{loft, place_tiles, sample_counts};
use crate::types::{BuildingId, ComponentKind};
use crate::wall::{layout_walls, openings_for};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use timberframe_scene::realize::{realize_assembly, realize_member};
use timberframe_scene::{Assembly, Member, NodeId, Scene, SceneError, Vec3};
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingInstance {
    pub params: BuildingParams,
    pub floor: FloorNet,
}

/// A component's layout, ready to realize.
struct ComponentPlan {
    kind: ComponentKind,
    root: Assembly,
    tiles: Option<TileCurves>,
}

pub struct BuildingRegistry {
    config: LayoutConfig,
    buildings: BTreeMap<BuildingId, BuildingInstance>,
    components: FxHashMap<(BuildingId, ComponentKind), NodeId>,
    next_id: u32,
}

impl Default for BuildingRegistry {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

fn scene_error(building: BuildingId, component: ComponentKind, params: &BuildingParams, source: SceneError) -> LayoutError {
    LayoutError::Scene { building, component, context: params.context(), source }
}

impl BuildingRegistry {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config, buildings: BTreeMap::new(), components: FxHashMap::default(), next_id: 1 }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn get(&self, id: BuildingId) -> Option<&BuildingInstance> {
        self.buildings.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = BuildingId> + '_ {
        self.buildings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Scene root of one component, if it is currently built.
    pub fn component_root(&self, id: BuildingId, kind: ComponentKind) -> Option<NodeId> {
        self.components.get(&(id, kind)).copied()
    }

    fn instance(&self, id: BuildingId) -> LayoutResult<&BuildingInstance> {
        self.buildings.get(&id).ok_or(LayoutError::MissingBuilding(id))
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Register a building and build all of its components. Invalid
    /// parameters are rejected before anything is registered; a failed
    /// first build unregisters the building again.
    pub fn add_building<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        params: BuildingParams,
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<BuildingId> {
        params.validate_with(&self.config)?;
        let floor = FloorNet::solve(&params)?;
        let id = BuildingId(self.next_id);
        self.next_id += 1;
        self.buildings.insert(id, BuildingInstance { params, floor });
        info!(building = %id, "building added");

        if let Err(err) = self.rebuild(scene, id, progress) {
            if let Err(cleanup) = self.remove_building(scene, id) {
                warn!(building = %id, error = %cleanup, "could not remove building after failed build");
            }
            self.buildings.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Rebuild every component.
    pub fn rebuild<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<()> {
        self.run(scene, id, &ComponentKind::ALL, progress)
    }

    /// Rebuild door/window frames, leaves and walls.
    pub fn rebuild_frame_only<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<()> {
        self.run(scene, id, &[ComponentKind::Walls], progress)
    }

    /// Rebuild the platform and its stairs.
    pub fn rebuild_platform_only<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<()> {
        self.run(scene, id, &[ComponentKind::Platform], progress)
    }

    pub fn rebuild_tiles_only<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<()> {
        self.run(scene, id, &[ComponentKind::Tiles], progress)
    }

    /// Replace a building's parameters and rebuild it. Parameters that fail
    /// validation are rejected and the stored ones kept.
    pub fn set_params<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        params: BuildingParams,
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<()> {
        self.instance(id)?;
        params.validate_with(&self.config)?;
        let floor = FloorNet::solve(&params)?;
        self.buildings.insert(id, BuildingInstance { params, floor });
        self.rebuild(scene, id, progress)
    }

    /// Delete every component of a building and forget it.
    pub fn remove_building<S: Scene + ?Sized>(&mut self, scene: &mut S, id: BuildingId) -> LayoutResult<()> {
        let instance = self.buildings.remove(&id).ok_or(LayoutError::MissingBuilding(id))?;
        for kind in ComponentKind::ALL {
            if let Some(root) = self.components.remove(&(id, kind)) {
                scene
                    .delete_hierarchy(root, true)
                    .map_err(|source| scene_error(id, kind, &instance.params, source))?;
            }
        }
        info!(building = %id, "building removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    fn run<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        kinds: &[ComponentKind],
        progress: &mut dyn ProgressSink,
    ) -> LayoutResult<()> {
        let mut progress = Monotonic::new(progress);
        progress.report(BuildStage::Validate, 0.0);

        let instance = self.instance(id)?;
        instance.params.validate_with(&self.config)?;
        debug!(building = %id, params = %instance.params.context(), "planning rebuild");

        let mut plans = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            plans.push((kind, self.plan_component(scene, id, kind)?));
        }

        let total = kinds.len() as f32;
        for (n, (kind, plan)) in plans.into_iter().enumerate() {
            self.apply_plan(scene, id, kind, plan)?;
            progress.report(kind.into(), (n + 1) as f32 / total);
        }
        progress.report(BuildStage::Done, 1.0);
        Ok(())
    }

    fn plan_component<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        id: BuildingId,
        kind: ComponentKind,
    ) -> LayoutResult<Option<ComponentPlan>> {
        let instance = self.instance(id)?;
        let (params, floor, config) = (&instance.params, &instance.floor, &self.config);
        let name = format!("{id} {}", kind.node_name());

        match kind {
            ComponentKind::Platform => {
                let platform = layout_platform(params, floor, config)?;
                let mut root = Assembly::new(name, Vec3::new(0.0, 0.0, params.platform_height / 2.0));
                root.members = platform.members;
                let openings = openings_for(params, floor)?;
                for site in stair_sites(&openings, floor) {
                    let stair = layout_stair(site, params, floor, config)?;
                    debug!(building = %id, side = ?site.side, steps = stair.count, "stair planned");
                    root.children.push(stair.into_assembly());
                }
                Ok(Some(ComponentPlan { kind, root, tiles: None }))
            }
            ComponentKind::Walls => {
                let lattice = self.lattice_unit(scene, id, params)?;
                let mut root = Assembly::new(name, Vec3::new(0.0, 0.0, params.platform_height));
                root.children = layout_walls(params, floor, lattice.as_ref(), config)?;
                debug!(building = %id, openings = root.children.len(), "walls planned");
                Ok(Some(ComponentPlan { kind, root, tiles: None }))
            }
            ComponentKind::Tiles => {
                let Some(frame) = &params.roof.frame else {
                    warn!(building = %id, "no roof frame; tiles skipped");
                    return Ok(None);
                };
                let curves = fit_tile_curves(params, floor, frame, config)?;
                let root = Assembly::new(name, Vec3::new(0.0, 0.0, tile_base_height(params, config)));
                Ok(Some(ComponentPlan { kind, root, tiles: Some(curves) }))
            }
        }
    }

    fn lattice_unit<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        id: BuildingId,
        params: &BuildingParams,
    ) -> LayoutResult<Option<LatticeUnit>> {
        let Some(name) = &params.lattice_pattern else {
            return Ok(None);
        };
        let asset = scene
            .load_named_asset(name)
            .map_err(|source| scene_error(id, ComponentKind::Walls, params, source))?;
        if asset.is_none() {
            warn!(building = %id, asset = %name, "lattice asset missing; cores left as bare rings");
        }
        Ok(asset.map(|a| LatticeUnit { name: a.name, size: a.dimensions }))
    }

    // -----------------------------------------------------------------------
    // Applying
    // -----------------------------------------------------------------------

    fn apply_plan<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        id: BuildingId,
        kind: ComponentKind,
        plan: Option<ComponentPlan>,
    ) -> LayoutResult<()> {
        let params = &self.instance(id)?.params;
        let context = params.context();
        let fail = |source: SceneError| LayoutError::Scene {
            building: id,
            component: kind,
            context: context.clone(),
            source,
        };

        if let Some(old) = self.components.remove(&(id, kind)) {
            scene.delete_hierarchy(old, true).map_err(fail)?;
        }
        let Some(plan) = plan else {
            return Ok(());
        };

        let root = plan.root;
        let built = scene
            .create_empty(None, &root.name, root.location, root.rotation)
            .map_err(fail)
            .and_then(|node| match fill(scene, node, &root, plan.tiles.as_ref(), &self.config, &fail) {
                Ok(objects) => Ok((node, objects)),
                Err(err) => {
                    if let Err(cleanup) = scene.delete_hierarchy(node, true) {
                        error!(building = %id, error = %cleanup, "could not remove partial component");
                    }
                    Err(err)
                }
            });

        match built {
            Ok((node, objects)) => {
                self.components.insert((id, plan.kind), node);
                info!(building = %id, component = kind.node_name(), objects, "component rebuilt");
                Ok(())
            }
            Err(err) => {
                error!(building = %id, component = kind.node_name(), %context, error = %err, "component rebuild failed");
                Err(err)
            }
        }
    }
}

/// Realize a planned component under its root. Returns the number of
/// objects created.
fn fill<S: Scene + ?Sized>(
    scene: &mut S,
    root: NodeId,
    plan: &Assembly,
    tiles: Option<&TileCurves>,
    config: &LayoutConfig,
    fail: &dyn Fn(SceneError) -> LayoutError,
) -> LayoutResult<usize> {
    for m in &plan.members {
        realize_member(scene, root, m).map_err(fail)?;
    }
    for child in &plan.children {
        realize_assembly(scene, Some(root), child).map_err(fail)?;
    }
    let mut objects = plan.object_count();
    if let Some(curves) = tiles {
        objects += fill_tiles(scene, root, curves, config, fail)?;
    }
    Ok(objects)
}

/// Realize the tile curves, sample them into a grid and place the tiles.
fn fill_tiles<S: Scene + ?Sized>(
    scene: &mut S,
    root: NodeId,
    curves: &TileCurves,
    config: &LayoutConfig,
    fail: &dyn Fn(SceneError) -> LayoutError,
) -> LayoutResult<usize> {
    let mut nodes = Vec::with_capacity(3);
    for m in curves.members() {
        nodes.extend(realize_member(scene, root, &m).map_err(fail)?.first().copied());
    }
    let [main, eave, hip] = nodes[..] else {
        return Err(LayoutError::Degenerate { what: "tile curve count", value: nodes.len() as f64 });
    };

    let (rows, cols) = sample_counts(curves, &config.tiles)?;
    let main = scene.axis_aligned_spacing_points(main, rows).map_err(fail)?;
    let eave = scene.axis_aligned_spacing_points(eave, cols).map_err(fail)?;
    let hip = scene.axis_aligned_spacing_points(hip, rows).map_err(fail)?;
    let frames = loft(&main, &eave, &hip)?.face_frames();

    let flat = scene.load_named_asset(&config.assets.flat_tile).map_err(fail)?;
    let round = scene.load_named_asset(&config.assets.round_tile).map_err(fail)?;
    let (Some(flat), Some(round)) = (flat, round) else {
        warn!(
            flat = %config.assets.flat_tile,
            round = %config.assets.round_tile,
            "tile assets missing; curves kept, no tiles placed"
        );
        return Ok(nodes.len());
    };

    let tiles = place_tiles(&frames, &flat, &round, &config.tiles);
    for m in &tiles {
        realize_member(scene, root, m).map_err(fail)?;
    }
    debug!(rows, cols, faces = frames.len(), "tiles placed");
    Ok(nodes.len() + tiles.iter().map(Member::object_count).sum::<usize>())
}
