//! Scene graph and picking geometry
//!
//! A lightweight retained scene: nodes carry a transform, an opacity, a
//! bounding-sphere radius and an optional parent. The game core mutates
//! transforms every tick from physics poses; a GPU backend draws the graph
//! through the [`SceneRenderer`] trait. Ray casting against node bounding
//! spheres backs pointer picking.

use glam::{Mat4, Quat, Vec3};

/// Handle to a node in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A renderable node: transform, bounding sphere, opacity, optional parent
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Bounding-sphere radius in local units, scaled by the node's transform
    pub bounding_radius: f32,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
    /// Packed 0xRRGGBB tint for untextured nodes (particles, bursts)
    pub color: u32,
}

impl Node {
    pub fn new(position: Vec3, bounding_radius: f32) -> Self {
        Self {
            parent: None,
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            bounding_radius,
            opacity: 1.0,
            color: 0xffffff,
        }
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}

/// A world-space ray for picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// A ray hit against a node's bounding sphere
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
}

/// Retained scene graph with insertion-ordered, id-keyed nodes
#[derive(Debug, Default)]
pub struct Scene {
    nodes: std::collections::BTreeMap<NodeId, Node>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the scene, returning its handle
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node, returning it so callers may retain the visual.
    /// Children are removed along with it.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        let orphans: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(child, _)| *child)
            .collect();
        for child in orphans {
            self.remove(child);
        }
        Some(node)
    }

    /// Re-insert a previously removed node under a fresh handle
    pub fn reinsert(&mut self, node: Node) -> NodeId {
        self.insert(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Write a pose read back from physics onto a node
    pub fn set_pose(&mut self, id: NodeId, position: Vec3, rotation: Quat) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
            node.rotation = rotation;
        }
    }

    pub fn set_uniform_scale(&mut self, id: NodeId, scale: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scale = Vec3::splat(scale);
        }
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Walk parent links to the root of a node's hierarchy
    pub fn resolve_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(node) = self.nodes.get(&current) {
            match node.parent {
                Some(parent) if self.nodes.contains_key(&parent) => current = parent,
                _ => break,
            }
        }
        current
    }

    /// World-space position and maximum world scale of a node, composing
    /// parent transforms
    pub fn world_pose(&self, id: NodeId) -> Option<(Vec3, f32)> {
        let node = self.nodes.get(&id)?;
        let mut matrix =
            Mat4::from_scale_rotation_translation(node.scale, node.rotation, node.position);
        let mut current = node;
        while let Some(parent_id) = current.parent {
            let parent = self.nodes.get(&parent_id)?;
            matrix = Mat4::from_scale_rotation_translation(
                parent.scale,
                parent.rotation,
                parent.position,
            ) * matrix;
            current = parent;
        }
        let (scale, _, translation) = matrix.to_scale_rotation_translation();
        Some((translation, scale.max_element()))
    }

    /// Cast a ray against the bounding spheres of the given nodes (and their
    /// children), returning hits ordered nearest-first. Child hits report the
    /// child's id; callers resolve composites with [`Scene::resolve_root`].
    pub fn raycast(&self, ray: Ray, candidates: &[NodeId]) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = Vec::new();
        for (&id, node) in &self.nodes {
            let root = self.resolve_root(id);
            if !candidates.contains(&root) {
                continue;
            }
            let Some((center, scale)) = self.world_pose(id) else {
                continue;
            };
            let radius = node.bounding_radius * scale;
            if let Some(distance) = ray_sphere(ray, center, radius) {
                hits.push(RayHit { node: id, distance });
            }
        }
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }
}

/// Ray/sphere intersection; returns the nearest non-negative hit distance
fn ray_sphere(ray: Ray, center: Vec3, radius: f32) -> Option<f32> {
    if radius <= 0.0 {
        return None;
    }
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t0 = (-half_b - sqrt_d) / a;
    let t1 = (-half_b + sqrt_d) / a;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        // Ray origin is inside the sphere
        Some(0.0)
    } else {
        None
    }
}

/// Perspective camera used for picking and rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 8.0, 12.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        proj * view
    }

    /// Unproject normalized device coordinates (x, y in [-1, 1], +y up) into
    /// a world-space ray
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inverse = self.view_projection().inverse();
        let near_point = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far_point = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray {
            origin: near_point,
            direction: (far_point - near_point).normalize_or_zero(),
        }
    }
}

/// Drawing capability a GPU backend provides; the core only mutates the
/// scene graph and never talks to the GPU directly
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera);
}
