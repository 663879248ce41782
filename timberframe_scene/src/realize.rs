// Descriptor-to-scene pass.
//
// Walks an `Assembly` tree depth first, creating one empty per assembly and
// one primitive per member, then applies each member's modifiers in list
// order. A mirror adds copies to the member's working set, and every later
// modifier (and the material) applies to the whole set. A boolean tool is
// realized fresh for each target because the subtraction consumes it.
//
// Realization stops at the first failing call and returns the error. The
// nodes created so far are left in place; callers own cleanup via
// `Scene::delete_hierarchy`.

use crate::error::SceneResult;
use crate::geom::Vec3;
use crate::scene::{AssetInfo, NodeId, Scene};
use crate::shape::{Assembly, Member, Modifier, Shape};
use smallvec::{SmallVec, smallvec};

/// Realize an assembly tree under `parent` and return its root node.
pub fn realize_assembly<S: Scene + ?Sized>(
    scene: &mut S,
    parent: Option<NodeId>,
    assembly: &Assembly,
) -> SceneResult<NodeId> {
    let root = scene.create_empty(parent, &assembly.name, assembly.location, assembly.rotation)?;

    let mut objects = Vec::new();
    for member in &assembly.members {
        objects.extend(realize_member(scene, root, member)?);
    }
    if assembly.join && !objects.is_empty() {
        let joined = scene.join(&objects)?;
        if let Some(width) = assembly.join_bevel {
            scene.bevel_edges(joined, width)?;
        }
        if let Some(axis) = assembly.rotation_lock {
            scene.lock_rotation(joined, axis)?;
        }
    }

    for child in &assembly.children {
        realize_assembly(scene, Some(root), child)?;
    }
    Ok(root)
}

/// Realize one member and its modifier stack. Returns every object the
/// member produced (the primitive first, then mirror copies).
pub fn realize_member<S: Scene + ?Sized>(
    scene: &mut S,
    parent: NodeId,
    member: &Member,
) -> SceneResult<SmallVec<[NodeId; 4]>> {
    let primary = create_primitive(scene, parent, member)?;
    let mut nodes: SmallVec<[NodeId; 4]> = smallvec![primary];

    for modifier in &member.modifiers {
        match modifier {
            Modifier::Subtract { tool, precision } => {
                for &target in &nodes {
                    for t in realize_member(scene, parent, tool)? {
                        scene.boolean_subtract(target, t, *precision)?;
                    }
                }
            }
            Modifier::Mirror(spec) => {
                let mut copies: SmallVec<[NodeId; 4]> = SmallVec::new();
                for &n in &nodes {
                    copies.push(scene.mirror(n, spec)?);
                }
                nodes.extend(copies);
            }
            Modifier::Bevel { width } => {
                for &n in &nodes {
                    scene.bevel_edges(n, *width)?;
                }
            }
        }
    }

    if let Some(material) = &member.material {
        for &n in &nodes {
            scene.assign_material(n, material)?;
        }
    }
    Ok(nodes)
}

fn create_primitive<S: Scene + ?Sized>(
    scene: &mut S,
    parent: NodeId,
    m: &Member,
) -> SceneResult<NodeId> {
    let id = match &m.shape {
        Shape::Box { size } => scene.create_box(parent, &m.name, *size, m.location, m.rotation)?,
        Shape::Cylinder { radius, depth } => {
            scene.create_cylinder(parent, &m.name, *radius, *depth, m.location, m.rotation)?
        }
        Shape::HexPrism { size, half } => {
            scene.create_hex_prism(parent, &m.name, *size, m.location, *half)?
        }
        Shape::Wedge { size } => scene.create_wedge(parent, &m.name, *size, m.location, m.rotation)?,
        Shape::Curve(spec) => scene.create_polyline_curve(parent, &m.name, spec, m.location)?,
        Shape::Asset { name, unit, array } => {
            let asset = AssetInfo { name: name.clone(), dimensions: *unit };
            scene.instance_asset(parent, &asset, m.location, m.rotation, *array)?
        }
    };
    if m.scale != Vec3::ONE {
        scene.set_scale(id, m.scale)?;
    }
    Ok(id)
}
