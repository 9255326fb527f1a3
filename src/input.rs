//! Pointer-to-item picking
//!
//! A click becomes a camera ray, tested against the bounding spheres of the
//! active items' node hierarchies. Hits come back nearest-first and child
//! meshes resolve to their composite root, so at most one item is picked.

use glam::Vec2;

use crate::scene::{Camera, Scene};
use crate::sim::item::{ItemId, ItemRegistry};

/// Convert client-space pointer coordinates to normalized device coordinates
/// (x right, y up, both in [-1, 1])
pub fn client_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(x / width * 2.0 - 1.0, -(y / height * 2.0 - 1.0))
}

/// Resolve a click to at most one active item, or `None` on a miss
pub fn pick(
    scene: &Scene,
    camera: &Camera,
    registry: &ItemRegistry,
    ndc: Vec2,
) -> Option<ItemId> {
    let ray = camera.ray_from_ndc(ndc.x, ndc.y);
    let candidates = registry.node_ids();
    scene
        .raycast(ray, &candidates)
        .first()
        .and_then(|hit| registry.find_by_node(hit.node, scene))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::scene::Node;
    use crate::sim::item::ItemKind;
    use crate::sim::physics::PhysicsWorld;
    use glam::Vec3;

    fn fixtures() -> (Scene, PhysicsWorld, ItemRegistry, Camera) {
        (
            Scene::new(),
            PhysicsWorld::new(Vec3::new(0.0, GRAVITY_Y, 0.0)),
            ItemRegistry::new(8),
            Camera::default(),
        )
    }

    #[test]
    fn test_client_to_ndc_corners() {
        let center = client_to_ndc(400.0, 300.0, 800.0, 600.0);
        assert!(center.length() < 0.001);
        let top_left = client_to_ndc(0.0, 0.0, 800.0, 600.0);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
        let bottom_right = client_to_ndc(800.0, 600.0, 800.0, 600.0);
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_center_click_picks_item_at_target() {
        let (mut scene, mut physics, mut registry, camera) = fixtures();
        let node = scene.insert(Node::new(Vec3::ZERO, 0.5));
        let body = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::ZERO);
        let id = registry.insert(ItemKind::Apple, node, body, &mut scene, &mut physics);

        assert_eq!(pick(&scene, &camera, &registry, Vec2::ZERO), Some(id));
    }

    #[test]
    fn test_child_mesh_click_resolves_to_item() {
        let (mut scene, mut physics, mut registry, camera) = fixtures();
        // Root has no geometry of its own; only the child mesh is hittable
        let node = scene.insert(Node::new(Vec3::ZERO, 0.0));
        scene.insert(Node::new(Vec3::ZERO, 0.5).with_parent(node));
        let body = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::ZERO);
        let id = registry.insert(ItemKind::Tomato, node, body, &mut scene, &mut physics);

        assert_eq!(pick(&scene, &camera, &registry, Vec2::ZERO), Some(id));
    }

    #[test]
    fn test_nearest_item_wins() {
        let (mut scene, mut physics, mut registry, camera) = fixtures();
        // Both items sit on the center ray; the nearer one is closer to the eye
        let toward_eye = (camera.eye - camera.target).normalize() * 2.0;
        let near_node = scene.insert(Node::new(toward_eye, 0.5));
        let far_node = scene.insert(Node::new(Vec3::ZERO, 0.5));
        let near_body = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, toward_eye);
        let far_body = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::ZERO);
        let near_id = registry.insert(ItemKind::Apple, near_node, near_body, &mut scene, &mut physics);
        registry.insert(ItemKind::Tomato, far_node, far_body, &mut scene, &mut physics);

        assert_eq!(pick(&scene, &camera, &registry, Vec2::ZERO), Some(near_id));
    }

    #[test]
    fn test_miss_is_none() {
        let (mut scene, mut physics, mut registry, camera) = fixtures();
        let node = scene.insert(Node::new(Vec3::ZERO, 0.3));
        let body = physics.add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, Vec3::ZERO);
        registry.insert(ItemKind::Apple, node, body, &mut scene, &mut physics);

        // A click at the far corner aims nowhere near the bowl
        assert_eq!(pick(&scene, &camera, &registry, Vec2::new(1.0, 1.0)), None);
    }
}
