// extensions/transform.rs
//
// Transform hierarchy — tracks parent-child relationships by SceneGraphHandle.
// Labels and rings hang off their body here: the child stores only a local
// offset and the body's transform positions it. Children built with
// `without_parent_rotation` take the parent's position but not its spin.
//
// Usage:
//   let mut graph = TransformGraph::new();
//   graph.register_with(label, LocalTransform::new().with_translation(offset));
//   graph.set_parent(label, Some(body));
//   graph.propagate();  // Updates world matrices from local transforms

use std::collections::HashMap;

use glam::{Affine3A, Quat, Vec3};

use crate::api::types::SceneGraphHandle;

/// Local transform relative to the parent (or world if no parent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    /// Spin about the local Y axis, radians.
    pub rotation_y: f32,
    /// Tilt about the local X axis, applied before the spin.
    pub tilt_x: f32,
    pub scale: f32,
    /// When false, only the parent's translation applies to this node.
    pub inherit_rotation: bool,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_y: 0.0,
            tilt_x: 0.0,
            scale: 1.0,
            inherit_rotation: true,
        }
    }
}

impl LocalTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation_y(mut self, rotation_y: f32) -> Self {
        self.rotation_y = rotation_y;
        self
    }

    pub fn with_tilt_x(mut self, tilt_x: f32) -> Self {
        self.tilt_x = tilt_x;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Follow the parent's position while keeping a world-fixed orientation.
    pub fn without_parent_rotation(mut self) -> Self {
        self.inherit_rotation = false;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite()
            && self.rotation_y.is_finite()
            && self.tilt_x.is_finite()
            && self.scale.is_finite()
    }

    pub fn to_affine(&self) -> Affine3A {
        let rotation = Quat::from_rotation_y(self.rotation_y) * Quat::from_rotation_x(self.tilt_x);
        Affine3A::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
struct TransformNode {
    parent: Option<SceneGraphHandle>,
    children: Vec<SceneGraphHandle>,
    local: LocalTransform,
    world: Affine3A,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local: LocalTransform::default(),
            world: Affine3A::IDENTITY,
        }
    }
}

/// Transform hierarchy graph — manages parent-child relationships and
/// caches world matrices.
#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: HashMap<SceneGraphHandle, TransformNode>,
    /// Nodes with no parent, in registration order.
    roots: Vec<SceneGraphHandle>,
    /// Set when a local transform or the hierarchy changes.
    dirty: bool,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node as a root with the given local transform.
    pub fn register_with(&mut self, id: SceneGraphHandle, local: LocalTransform) {
        let node = self.nodes.entry(id).or_default();
        node.local = local;
        if node.parent.is_none() && !self.roots.contains(&id) {
            self.roots.push(id);
        }
        self.dirty = true;
    }

    /// Set the parent of a node. Pass `None` to make it a root.
    pub fn set_parent(&mut self, child: SceneGraphHandle, parent: Option<SceneGraphHandle>) {
        self.nodes.entry(child).or_default();
        if let Some(p) = parent {
            self.nodes.entry(p).or_default();
        }

        if let Some(old_parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(old_node) = self.nodes.get_mut(&old_parent) {
                old_node.children.retain(|&c| c != child);
            }
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }

        if let Some(p) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&p) {
                if !parent_node.children.contains(&child) {
                    parent_node.children.push(child);
                }
            }
            self.roots.retain(|&r| r != child);
        } else if !self.roots.contains(&child) {
            self.roots.push(child);
        }

        self.dirty = true;
    }

    /// Replace a node's local transform. Returns false for unknown nodes.
    pub fn set_local(&mut self, id: SceneGraphHandle, local: LocalTransform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.local = local;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn get_local(&self, id: SceneGraphHandle) -> Option<&LocalTransform> {
        self.nodes.get(&id).map(|n| &n.local)
    }

    pub fn get_parent(&self, id: SceneGraphHandle) -> Option<SceneGraphHandle> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn get_children(&self, id: SceneGraphHandle) -> Option<&[SceneGraphHandle]> {
        self.nodes.get(&id).map(|n| n.children.as_slice())
    }

    /// World matrix as of the last `propagate`.
    pub fn world(&self, id: SceneGraphHandle) -> Option<Affine3A> {
        self.nodes.get(&id).map(|n| n.world)
    }

    /// Remove a node. Its children become roots.
    pub fn remove(&mut self, id: SceneGraphHandle) {
        if let Some(node) = self.nodes.remove(&id) {
            if let Some(parent) = node.parent {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            for child in node.children {
                if let Some(child_node) = self.nodes.get_mut(&child) {
                    child_node.parent = None;
                }
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
            self.roots.retain(|&r| r != id);
        }
        self.dirty = true;
    }

    /// Recompute world matrices from the roots down.
    pub fn propagate(&mut self) {
        if !self.dirty {
            return;
        }
        let roots = self.roots.clone();
        for root in roots {
            self.propagate_recursive(root, Affine3A::IDENTITY);
        }
        self.dirty = false;
    }

    fn propagate_recursive(&mut self, id: SceneGraphHandle, parent_world: Affine3A) {
        let Some(node) = self.nodes.get_mut(&id) else { return };
        let parent = if node.local.inherit_rotation {
            parent_world
        } else {
            Affine3A::from_translation(parent_world.translation.into())
        };
        let world = parent * node.local.to_affine();
        node.world = world;
        let children = node.children.clone();
        for child in children {
            self.propagate_recursive(child, world);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: SceneGraphHandle = SceneGraphHandle(1);
    const LABEL: SceneGraphHandle = SceneGraphHandle(2);

    #[test]
    fn parent_child_relationship() {
        let mut graph = TransformGraph::new();
        graph.register_with(BODY, LocalTransform::new());
        graph.register_with(LABEL, LocalTransform::new());
        graph.set_parent(LABEL, Some(BODY));

        assert_eq!(graph.get_parent(LABEL), Some(BODY));
        assert_eq!(graph.get_children(BODY), Some([LABEL].as_slice()));
    }

    #[test]
    fn child_follows_parent_translation() {
        let mut graph = TransformGraph::new();
        graph.register_with(BODY, LocalTransform::new().with_translation(Vec3::new(40.0, 0.0, 0.0)));
        graph.register_with(LABEL, LocalTransform::new().with_translation(Vec3::new(0.0, 5.0, 0.0)));
        graph.set_parent(LABEL, Some(BODY));
        graph.propagate();

        let p = graph.world(LABEL).unwrap().translation;
        assert!((Vec3::from(p) - Vec3::new(40.0, 5.0, 0.0)).length() < 1e-5);

        graph.set_local(BODY, LocalTransform::new().with_translation(Vec3::new(0.0, 0.0, 40.0)));
        graph.propagate();
        let p = graph.world(LABEL).unwrap().translation;
        assert!((Vec3::from(p) - Vec3::new(0.0, 5.0, 40.0)).length() < 1e-5);
    }

    #[test]
    fn offset_above_body_is_unaffected_by_spin() {
        let mut graph = TransformGraph::new();
        graph.register_with(
            BODY,
            LocalTransform::new()
                .with_translation(Vec3::new(10.0, 0.0, 0.0))
                .with_rotation_y(1.234),
        );
        graph.register_with(LABEL, LocalTransform::new().with_translation(Vec3::Y * 3.0));
        graph.set_parent(LABEL, Some(BODY));
        graph.propagate();
        let p = Vec3::from(graph.world(LABEL).unwrap().translation);
        assert!((p - Vec3::new(10.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn translation_only_child_ignores_parent_spin() {
        const RING: SceneGraphHandle = SceneGraphHandle(3);
        let mut graph = TransformGraph::new();
        graph.register_with(RING, LocalTransform::new().with_tilt_x(0.47).without_parent_rotation());
        graph.register_with(BODY, LocalTransform::new());
        graph.set_parent(RING, Some(BODY));

        let mut normals = Vec::new();
        for spin in [0.0, 1.0, 2.5, 4.0] {
            let body = LocalTransform::new()
                .with_translation(Vec3::new(90.0, 0.0, 0.0))
                .with_rotation_y(spin);
            graph.set_local(BODY, body);
            graph.propagate();
            let world = graph.world(RING).unwrap();
            assert!((Vec3::from(world.translation) - Vec3::new(90.0, 0.0, 0.0)).length() < 1e-4);
            normals.push(world.transform_vector3(Vec3::Y));
        }
        for n in &normals[1..] {
            assert!((*n - normals[0]).length() < 1e-5, "ring normal moved: {n:?}");
        }
    }

    #[test]
    fn remove_orphans_children() {
        let mut graph = TransformGraph::new();
        graph.register_with(BODY, LocalTransform::new());
        graph.register_with(LABEL, LocalTransform::new());
        graph.set_parent(LABEL, Some(BODY));

        graph.remove(BODY);

        assert_eq!(graph.get_parent(LABEL), None);
        assert!(graph.roots.contains(&LABEL));
    }

    #[test]
    fn set_local_on_unknown_node_is_rejected() {
        let mut graph = TransformGraph::new();
        assert!(!graph.set_local(SceneGraphHandle(99), LocalTransform::new()));
    }
}
