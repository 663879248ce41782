// In-memory arena implementation of `Scene`.
//
// Each node stores its local transform and a hull: a small set of
// local-space points whose bounding box is the node's geometric extent
// (box corners, wedge vertices, curve control points padded by the bevel).
// That is enough to answer every query the layout crate makes (bounds,
// object counts, curve sampling) without a mesh kernel, which makes the
// arena the backend for tests, the `rebuild` binary and benchmarks.
//
// Mirror and join evaluate eagerly: the new node's hull is computed in the
// parent frame at call time, so later edits to the source do not leak into
// the copy. Boolean subtraction is recorded on the target and consumes the
// tool; a subtraction can only shrink the target, so the recorded hull stays
// a valid bound.
//
// Nodes live in a `BTreeMap` keyed by monotonically increasing ids, so
// iteration order (and therefore every derived report) is deterministic.
//
// `fail_on_name` injects a kernel failure for any primitive whose name
// contains a fragment; integration tests use it to exercise cleanup of
// partial builds.

use crate::error::{SceneError, SceneResult};
use crate::geom::{Aabb, Axis, Euler, Transform, Vec3};
use crate::scene::{AssetInfo, NodeId, Scene};
use crate::shape::{BooleanPrecision, CurveSpec, GridArray, MaterialRef, MirrorSpec};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Empty,
    Box,
    Cylinder,
    HexPrism,
    Wedge,
    Curve,
    Asset,
    Mirror,
    Joined,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    /// Local-space points bounding the geometry. Empty for group nodes.
    pub hull: Vec<Vec3>,
    pub curve: Option<CurveSpec>,
    pub asset: Option<String>,
    /// Instances carried by an asset node (rows x cols for arrays).
    pub instances: u32,
    pub bevel: Option<f64>,
    pub material: Option<MaterialRef>,
    pub subtractions: Vec<BooleanPrecision>,
    pub rotation_lock: Option<Axis>,
}

impl Node {
    fn new(name: &str, kind: NodeKind, parent: Option<NodeId>, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parent,
            children: Vec::new(),
            transform,
            hull: Vec::new(),
            curve: None,
            asset: None,
            instances: 0,
            bevel: None,
            material: None,
            subtractions: Vec::new(),
            rotation_lock: None,
        }
    }

    pub fn has_geometry(&self) -> bool {
        !self.hull.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MemoryScene
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
    assets: BTreeMap<String, Vec3>,
    fail_on: Option<String>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a library asset with its instance dimensions.
    pub fn with_asset(mut self, name: &str, dimensions: Vec3) -> Self {
        self.add_asset(name, dimensions);
        self
    }

    pub fn add_asset(&mut self, name: &str, dimensions: Vec3) {
        self.assets.insert(name.to_string(), dimensions);
    }

    /// Make every primitive whose name contains `fragment` fail.
    pub fn fail_on_name(&mut self, fragment: &str) {
        self.fail_on = Some(fragment.to_string());
    }

    pub fn clear_failures(&mut self) {
        self.fail_on = None;
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All descendants of `root` (excluding `root`), depth first.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&root)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = self.nodes.get(&id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    /// Number of geometry-bearing nodes under `root` (inclusive).
    pub fn object_count(&self, root: NodeId) -> usize {
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|id| self.nodes.get(id).is_some_and(Node::has_geometry))
            .count()
    }

    /// Nodes under `root` (inclusive) whose name equals `name`.
    pub fn find_named(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
            .collect()
    }

    /// World-space bounds of a single node's own geometry.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let n = self.nodes.get(&id)?;
        Aabb::from_points(n.hull.iter().map(|p| self.lift(id, *p, None)))
    }

    // -- internals ----------------------------------------------------------

    fn get(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))
    }

    /// Carry a point from `id`'s local frame up the hierarchy, stopping
    /// once the frame of `frame` is reached (`None` = world).
    fn lift(&self, id: NodeId, p: Vec3, frame: Option<NodeId>) -> Vec3 {
        let mut p = p;
        let mut cur = Some(id);
        while let Some(c) = cur {
            if Some(c) == frame {
                break;
            }
            let Some(n) = self.nodes.get(&c) else { break };
            p = n.transform.apply(p);
            cur = n.parent;
        }
        p
    }

    /// Hull points of `id` and its subtree, expressed in `id`'s parent frame.
    fn subtree_points_in_parent(&self, id: NodeId) -> Vec<Vec3> {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        let mut out = Vec::new();
        for nid in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(n) = self.nodes.get(&nid) {
                out.extend(n.hull.iter().map(|p| self.lift(nid, *p, parent)));
            }
        }
        out
    }

    fn check_name(&self, name: &str) -> SceneResult<()> {
        match &self.fail_on {
            Some(fragment) if name.contains(fragment.as_str()) => {
                Err(SceneError::Kernel(format!("injected failure creating {name:?}")))
            }
            _ => Ok(()),
        }
    }

    fn check_positive(name: &str, what: &'static str, value: f64) -> SceneResult<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(SceneError::InvalidDimension { name: name.to_string(), what, value })
        }
    }

    fn check_size(name: &str, size: Vec3) -> SceneResult<()> {
        Self::check_positive(name, "width", size.x)?;
        Self::check_positive(name, "depth", size.y)?;
        Self::check_positive(name, "height", size.z)
    }

    fn insert(&mut self, node: Node) -> SceneResult<NodeId> {
        if let Some(p) = node.parent {
            self.get(p)?;
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn insert_primitive(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        transform: Transform,
        hull: Vec<Vec3>,
    ) -> SceneResult<NodeId> {
        self.check_name(name)?;
        let mut node = Node::new(name, kind, Some(parent), transform);
        node.hull = hull;
        self.insert(node)
    }

    fn remove_subtree(&mut self, root: NodeId) {
        for id in self.descendants(root) {
            self.nodes.remove(&id);
        }
        let parent = self.nodes.remove(&root).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != root);
        }
    }
}

fn box_hull(min: Vec3, max: Vec3) -> Vec<Vec3> {
    Aabb { min, max }.corners().to_vec()
}

fn centered_hull(size: Vec3) -> Vec<Vec3> {
    box_hull(size * -0.5, size * 0.5)
}

fn reflect(p: Vec3, mask: usize, about: Vec3) -> Vec3 {
    let mut q = p;
    for axis in Axis::ALL {
        if mask & (1 << axis as usize) != 0 {
            q = q.with(axis, 2.0 * about.get(axis) - q.get(axis));
        }
    }
    q
}

impl Scene for MemoryScene {
    fn create_empty(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId> {
        self.insert(Node::new(name, NodeKind::Empty, parent, Transform::at(location, rotation)))
    }

    fn create_box(
        &mut self,
        parent: NodeId,
        name: &str,
        size: Vec3,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId> {
        Self::check_size(name, size)?;
        let t = Transform::at(location, rotation);
        self.insert_primitive(parent, name, NodeKind::Box, t, centered_hull(size))
    }

    fn create_cylinder(
        &mut self,
        parent: NodeId,
        name: &str,
        radius: f64,
        depth: f64,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId> {
        Self::check_positive(name, "radius", radius)?;
        Self::check_positive(name, "depth", depth)?;
        let t = Transform::at(location, rotation);
        let hull = centered_hull(Vec3::new(radius * 2.0, radius * 2.0, depth));
        self.insert_primitive(parent, name, NodeKind::Cylinder, t, hull)
    }

    fn create_hex_prism(
        &mut self,
        parent: NodeId,
        name: &str,
        size: Vec3,
        location: Vec3,
        half: bool,
    ) -> SceneResult<NodeId> {
        Self::check_size(name, size)?;
        let h = size * 0.5;
        let hull = if half {
            box_hull(Vec3::new(-h.x, 0.0, -h.z), Vec3::new(h.x, h.y, h.z))
        } else {
            centered_hull(size)
        };
        let t = Transform::at(location, Euler::IDENTITY);
        self.insert_primitive(parent, name, NodeKind::HexPrism, t, hull)
    }

    fn create_wedge(
        &mut self,
        parent: NodeId,
        name: &str,
        size: Vec3,
        location: Vec3,
        rotation: Euler,
    ) -> SceneResult<NodeId> {
        Self::check_size(name, size)?;
        let h = size * 0.5;
        let hull = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
        ];
        let t = Transform::at(location, rotation);
        self.insert_primitive(parent, name, NodeKind::Wedge, t, hull)
    }

    fn create_polyline_curve(
        &mut self,
        parent: NodeId,
        name: &str,
        curve: &CurveSpec,
        location: Vec3,
    ) -> SceneResult<NodeId> {
        if curve.points.len() < 2 {
            return Err(SceneError::InvalidDimension {
                name: name.to_string(),
                what: "point count",
                value: curve.points.len() as f64,
            });
        }
        let r = curve.bevel_depth * 0.5;
        let mut hull = Vec::with_capacity(curve.points.len() * 6);
        for p in &curve.points {
            if r > 0.0 {
                for axis in Axis::ALL {
                    hull.push(p.with(axis, p.get(axis) - r));
                    hull.push(p.with(axis, p.get(axis) + r));
                }
            } else {
                hull.push(*p);
            }
        }
        let t = Transform::at(location, Euler::IDENTITY);
        let id = self.insert_primitive(parent, name, NodeKind::Curve, t, hull)?;
        if let Some(n) = self.nodes.get_mut(&id) {
            n.curve = Some(curve.clone());
        }
        Ok(id)
    }

    fn load_named_asset(&mut self, name: &str) -> SceneResult<Option<AssetInfo>> {
        Ok(self
            .assets
            .get(name)
            .map(|d| AssetInfo { name: name.to_string(), dimensions: *d }))
    }

    fn instance_asset(
        &mut self,
        parent: NodeId,
        asset: &AssetInfo,
        location: Vec3,
        rotation: Euler,
        array: Option<GridArray>,
    ) -> SceneResult<NodeId> {
        let u = asset.dimensions;
        let (extent, instances) = match array {
            Some(a) => (
                Vec3::new(
                    a.col_span * f64::from(a.cols.saturating_sub(1)) + u.x,
                    u.y,
                    a.row_span * f64::from(a.rows.saturating_sub(1)) + u.z,
                ),
                a.rows * a.cols,
            ),
            None => (u, 1),
        };
        let t = Transform::at(location, rotation);
        let hull = box_hull(Vec3::ZERO, extent);
        let id = self.insert_primitive(parent, &asset.name, NodeKind::Asset, t, hull)?;
        if let Some(n) = self.nodes.get_mut(&id) {
            n.asset = Some(asset.name.clone());
            n.instances = instances;
        }
        Ok(id)
    }

    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> SceneResult<()> {
        self.get_mut(node)?.transform.scale = scale;
        Ok(())
    }

    fn mirror(&mut self, node: NodeId, spec: &MirrorSpec) -> SceneResult<NodeId> {
        let src = self.get(node)?;
        let parent = src.parent;
        let mut points = self.subtree_points_in_parent(node);

        for axis in Axis::ALL {
            if !spec.bisect[axis as usize] || points.is_empty() {
                continue;
            }
            let plane = spec.about.get(axis);
            let mean = points.iter().map(|p| p.get(axis)).sum::<f64>() / points.len() as f64;
            for p in &mut points {
                let v = p.get(axis);
                let clipped = if mean >= plane { v.max(plane) } else { v.min(plane) };
                *p = p.with(axis, clipped);
            }
        }

        let axes_mask = (0..3).filter(|i| spec.axes[*i]).fold(0usize, |m, i| m | (1 << i));
        let mut hull = Vec::new();
        for mask in 1..8usize {
            if mask & !axes_mask == 0 {
                hull.extend(points.iter().map(|p| reflect(*p, mask, spec.about)));
            }
        }

        let mut copy = Node::new(&format!("{}.mirror", src.name), NodeKind::Mirror, parent, Transform::IDENTITY);
        copy.hull = hull;
        copy.bevel = src.bevel;
        copy.material = src.material.clone();
        copy.subtractions = src.subtractions.clone();
        copy.asset = src.asset.clone();
        copy.instances = src.instances * spec.copy_count() as u32;
        self.insert(copy)
    }

    fn boolean_subtract(
        &mut self,
        target: NodeId,
        tool: NodeId,
        precision: BooleanPrecision,
    ) -> SceneResult<()> {
        if target == tool {
            return Err(SceneError::SelfSubtract(target));
        }
        self.get(tool)?;
        self.get_mut(target)?.subtractions.push(precision);
        self.remove_subtree(tool);
        Ok(())
    }

    fn bevel_edges(&mut self, node: NodeId, width: f64) -> SceneResult<()> {
        self.get_mut(node)?.bevel = Some(width);
        Ok(())
    }

    fn assign_material(&mut self, node: NodeId, material: &MaterialRef) -> SceneResult<()> {
        self.get_mut(node)?.material = Some(material.clone());
        Ok(())
    }

    fn join(&mut self, nodes: &[NodeId]) -> SceneResult<NodeId> {
        let (&first, rest) = nodes.split_first().ok_or(SceneError::JoinEmpty)?;
        let parent = self.get(first)?.parent;
        for &other in rest {
            if self.get(other)?.parent != parent {
                return Err(SceneError::JoinAcrossParents(first, other));
            }
        }

        let name = self.get(first)?.name.clone();
        let mut merged = Node::new(&name, NodeKind::Joined, parent, Transform::IDENTITY);
        for &id in nodes {
            merged.hull.extend(self.subtree_points_in_parent(id));
            let n = self.get(id)?;
            if merged.material.is_none() {
                merged.material = n.material.clone();
            }
            merged.bevel = match (merged.bevel, n.bevel) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            merged.subtractions.extend(n.subtractions.iter().copied());
        }
        for &id in nodes {
            self.remove_subtree(id);
        }
        self.insert(merged)
    }

    fn lock_rotation(&mut self, node: NodeId, free_axis: Axis) -> SceneResult<()> {
        self.get_mut(node)?.rotation_lock = Some(free_axis);
        Ok(())
    }

    fn bounds_of_hierarchy(&self, root: NodeId) -> SceneResult<Option<Aabb>> {
        self.get(root)?;
        let points = std::iter::once(root).chain(self.descendants(root)).flat_map(|id| {
            self.nodes
                .get(&id)
                .map(|n| n.hull.iter().map(move |p| self.lift(id, *p, None)).collect::<Vec<_>>())
                .unwrap_or_default()
        });
        Ok(Aabb::from_points(points))
    }

    fn delete_hierarchy(&mut self, root: NodeId, include_root: bool) -> SceneResult<()> {
        self.get(root)?;
        if include_root {
            self.remove_subtree(root);
        } else {
            for id in self.descendants(root) {
                self.nodes.remove(&id);
            }
            self.get_mut(root)?.children.clear();
        }
        Ok(())
    }

    fn axis_aligned_spacing_points(&self, curve: NodeId, count: usize) -> SceneResult<Vec<Vec3>> {
        let n = self.get(curve)?;
        let spec = n.curve.as_ref().ok_or(SceneError::NotACurve(curve))?;
        let pts: Vec<Vec3> = spec.points.iter().map(|p| n.transform.apply(*p)).collect();
        if count == 0 {
            return Ok(Vec::new());
        }
        match pts.as_slice() {
            [] => return Err(SceneError::Kernel(format!("curve {curve} has no control points"))),
            [only] => return Ok(vec![*only; count]),
            [first, ..] if count == 1 => return Ok(vec![*first]),
            _ => {}
        }

        let seg_lens: Vec<f64> = pts.windows(2).map(|w| (w[1] - w[0]).length()).collect();
        let total: f64 = seg_lens.iter().sum();
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let mut target = total * i as f64 / (count - 1) as f64;
            let mut seg = 0;
            while seg + 1 < seg_lens.len() && target > seg_lens[seg] {
                target -= seg_lens[seg];
                seg += 1;
            }
            let len = seg_lens[seg];
            let t = if len > 0.0 { (target / len).clamp(0.0, 1.0) } else { 0.0 };
            out.push(pts[seg] + (pts[seg + 1] - pts[seg]) * t);
        }
        Ok(out)
    }
}
