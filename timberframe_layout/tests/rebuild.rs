// End-to-end rebuilds against the in-memory scene.
//
// Drives the public registry entry points the way a host application
// would: register a building, rebuild parts of it, inject scene failures,
// and check what is left in the scene afterwards.

use timberframe_layout::{
    BuildingId, BuildingParams, BuildingRegistry, ComponentKind, LayoutError, NullProgress, ProgressLog,
    WallStyle,
};
use timberframe_scene::memory::NodeKind;
use timberframe_scene::{MemoryScene, Scene, Vec3};

const DEMO: &str = include_str!("../../demos/building.json");

fn library() -> MemoryScene {
    MemoryScene::new()
        .with_asset("lattice_core", Vec3::new(0.1, 0.02, 0.15))
        .with_asset("flat_tile", Vec3::new(0.25, 0.3, 0.03))
        .with_asset("round_tile", Vec3::new(0.12, 0.3, 0.08))
}

fn demo() -> BuildingParams {
    BuildingParams::from_json(DEMO).unwrap()
}

fn build(scene: &mut MemoryScene, params: BuildingParams) -> (BuildingRegistry, BuildingId) {
    let mut reg = BuildingRegistry::default();
    let id = reg.add_building(scene, params, &mut NullProgress).unwrap();
    (reg, id)
}

fn count_kind(scene: &MemoryScene, root: timberframe_scene::NodeId, kind: NodeKind) -> usize {
    scene.descendants(root).into_iter().filter(|id| scene.node(*id).is_some_and(|n| n.kind == kind)).count()
}

#[test]
fn demo_building_builds_all_components() {
    let mut scene = library();
    let (reg, id) = build(&mut scene, demo());
    let tiles = reg.component_root(id, ComponentKind::Tiles).unwrap();
    assert!(count_kind(&scene, tiles, NodeKind::Asset) > 0);
    assert_eq!(count_kind(&scene, tiles, NodeKind::Curve), 3);

    // The tiles sit above the walls, the walls above the platform.
    let z = |kind| {
        let root = reg.component_root(id, kind).unwrap();
        scene.bounds_of_hierarchy(root).unwrap().unwrap()
    };
    let platform = z(ComponentKind::Platform);
    let walls = z(ComponentKind::Walls);
    assert!(walls.min.z >= platform.max.z - 1e-9);
    assert!(z(ComponentKind::Tiles).max.z > walls.max.z);
}

#[test]
fn rebuild_twice_gives_the_same_scene() {
    let mut scene = library();
    let (mut reg, id) = build(&mut scene, demo());
    let measure = |scene: &MemoryScene, reg: &BuildingRegistry| {
        ComponentKind::ALL
            .iter()
            .map(|k| {
                let root = reg.component_root(id, *k).unwrap();
                (scene.object_count(root), scene.bounds_of_hierarchy(root).unwrap().unwrap())
            })
            .collect::<Vec<_>>()
    };
    let first = measure(&scene, &reg);
    let nodes = scene.len();
    reg.rebuild(&mut scene, id, &mut NullProgress).unwrap();
    reg.rebuild(&mut scene, id, &mut NullProgress).unwrap();
    let second = measure(&scene, &reg);
    assert_eq!(scene.len(), nodes);
    for ((a_count, a_box), (b_count, b_box)) in first.iter().zip(&second) {
        assert_eq!(a_count, b_count);
        assert!(a_box.approx_eq(b_box, 1e-9));
    }
}

#[test]
fn failed_platform_rebuild_cleans_up_after_itself() {
    let mut scene = library();
    let (mut reg, id) = build(&mut scene, demo());
    let walls = reg.component_root(id, ComponentKind::Walls);
    let nodes = scene.len();

    scene.fail_on_name("cheek stone");
    let err = reg.rebuild_platform_only(&mut scene, id, &mut NullProgress).unwrap_err();
    assert!(matches!(err, LayoutError::Scene { component: ComponentKind::Platform, .. }));
    assert!(reg.component_root(id, ComponentKind::Platform).is_none());
    assert_eq!(reg.component_root(id, ComponentKind::Walls), walls);
    assert!(scene.len() < nodes);

    scene.clear_failures();
    reg.rebuild_platform_only(&mut scene, id, &mut NullProgress).unwrap();
    assert_eq!(scene.len(), nodes);
}

#[test]
fn missing_assets_degrade_instead_of_failing() {
    let mut bare = MemoryScene::new();
    let (reg, id) = build(&mut bare, demo());
    let walls = reg.component_root(id, ComponentKind::Walls).unwrap();
    assert_eq!(count_kind(&bare, walls, NodeKind::Asset), 0);
    let tiles = reg.component_root(id, ComponentKind::Tiles).unwrap();
    assert_eq!(bare.object_count(tiles), 3);

    let mut full = library();
    let (reg, id) = build(&mut full, demo());
    let walls = reg.component_root(id, ComponentKind::Walls).unwrap();
    assert!(count_kind(&full, walls, NodeKind::Asset) > 0);
}

#[test]
fn higher_platforms_never_get_fewer_steps() {
    let mut last = 0;
    for height in [0.6, 0.75, 0.96, 1.2, 1.4] {
        let mut p = demo();
        p.platform_height = height;
        let mut scene = library();
        let (reg, id) = build(&mut scene, p);
        let platform = reg.component_root(id, ComponentKind::Platform).unwrap();
        let treads = scene.find_named(platform, "tread").len();
        assert!(treads >= last, "height {height}: {treads} < {last}");
        last = treads;
    }
    assert!(last > 0);
}

#[test]
fn one_course_plinth_still_builds() {
    let mut p = demo();
    p.platform_height = 0.2;
    let mut scene = library();
    let (reg, id) = build(&mut scene, p);
    let platform = reg.component_root(id, ComponentKind::Platform).unwrap();
    assert!(scene.find_named(platform, "corner post").is_empty());
    assert!(scene.find_named(platform, "tread").is_empty());
    assert!(scene.find_named(platform, "elephant-eye stone").is_empty());
    assert!(!scene.find_named(platform, "cheek stone").is_empty());

    let mut p = demo();
    p.platform_height = 0.1;
    let mut reg = BuildingRegistry::default();
    let mut empty = library();
    assert!(matches!(
        reg.add_building(&mut empty, p, &mut NullProgress),
        Err(LayoutError::Degenerate { .. })
    ));
    assert!(empty.is_empty());
}

#[test]
fn invalid_parameters_touch_nothing() {
    let mut scene = library();
    let mut reg = BuildingRegistry::default();
    let mut p = demo();
    p.x_rooms = 4;
    assert!(matches!(
        reg.add_building(&mut scene, p, &mut NullProgress),
        Err(LayoutError::EvenRoomCount(4))
    ));
    let mut p = demo();
    p.wall_net = Some("door#0/0#9/0".into());
    assert!(reg.add_building(&mut scene, p, &mut NullProgress).is_err());
    assert!(scene.is_empty());
    assert!(reg.is_empty());
}

#[test]
fn wider_halls_get_more_openings() {
    let mut p = demo();
    p.x_rooms = 5;
    p.wall_style = WallStyle::Door;
    let mut scene = library();
    let (reg, id) = build(&mut scene, p);
    let walls = reg.component_root(id, ComponentKind::Walls).unwrap();
    // 6 x 4 pillars: 2 * (5 + 3) bays round the ring.
    assert_eq!(scene.node(walls).unwrap().children.len(), 16);
}

#[test]
fn set_params_reports_progress_to_completion() {
    let mut scene = library();
    let (mut reg, id) = build(&mut scene, demo());
    let mut p = demo();
    p.door_num = 2;
    let mut log = ProgressLog::new();
    reg.set_params(&mut scene, id, p, &mut log).unwrap();
    assert_eq!(reg.get(id).unwrap().params.door_num, 2);
    let fractions: Vec<f32> = log.entries.iter().map(|e| e.1).collect();
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fractions.last(), Some(&1.0));
}
