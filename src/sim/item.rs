//! Items and the active-item registry
//!
//! An item pairs a scene node with a rigid body. The registry owns every
//! clickable item; picking, culling and eviction all detach the body and
//! release the visual in one place so no half-removed item can linger.

use glam::Vec3;
use rand::Rng;

use super::physics::{BodyHandle, PhysicsWorld};
use crate::scene::{NodeId, Scene};

/// The fixed set of fruit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Apple,
    Pineapple,
    Tomato,
    Watermelon,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Apple,
        ItemKind::Pineapple,
        ItemKind::Tomato,
        ItemKind::Watermelon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Apple => "apple",
            ItemKind::Pineapple => "pineapple",
            ItemKind::Tomato => "tomato",
            ItemKind::Watermelon => "watermelon",
        }
    }
}

/// Identity of an item; doubles as creation order (monotonically increasing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

/// An active (falling or settled, clickable) item
#[derive(Debug)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub node: NodeId,
    pub body: BodyHandle,
}

/// An item pulled out of the registry with its body already detached
#[derive(Debug)]
pub struct TakenItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub node: NodeId,
}

/// Tracks all clickable items, in creation order
pub struct ItemRegistry {
    items: Vec<Item>,
    next_id: u32,
    max_items: usize,
}

impl ItemRegistry {
    pub fn new(max_items: usize) -> Self {
        Self {
            items: Vec::with_capacity(max_items),
            next_id: 1,
            max_items,
        }
    }

    /// Register a freshly spawned item. If the registry is at the population
    /// ceiling the oldest item is evicted first: body detached, visual
    /// removed, before the new item is added.
    pub fn insert(
        &mut self,
        kind: ItemKind,
        node: NodeId,
        body: BodyHandle,
        scene: &mut Scene,
        physics: &mut PhysicsWorld,
    ) -> ItemId {
        while self.items.len() >= self.max_items {
            let oldest = self.items.remove(0);
            physics.remove_body(oldest.body);
            scene.remove(oldest.node);
            log::debug!("evicted item {:?} at population ceiling", oldest.id);
        }
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(Item {
            id,
            kind,
            node,
            body,
        });
        id
    }

    /// Remove an item for collection: detaches its body and unregisters it in
    /// one operation, so a mid-transit item can never be re-picked. The scene
    /// node is left in place for the caller to animate or retain.
    pub fn take(&mut self, id: ItemId, physics: &mut PhysicsWorld) -> Option<TakenItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.remove(index);
        physics.remove_body(item.body);
        Some(TakenItem {
            id: item.id,
            kind: item.kind,
            node: item.node,
        })
    }

    /// Remove every item whose body dropped below `floor_y`, releasing both
    /// the body and the visual. Returns how many were culled so the caller
    /// can schedule exactly one replacement each.
    pub fn cull(&mut self, floor_y: f32, scene: &mut Scene, physics: &mut PhysicsWorld) -> usize {
        let mut culled = 0;
        let mut index = 0;
        while index < self.items.len() {
            let below = physics
                .pose(self.items[index].body)
                .is_some_and(|(pos, _)| pos.y < floor_y);
            if below {
                let item = self.items.remove(index);
                physics.remove_body(item.body);
                scene.remove(item.node);
                log::debug!("culled item {:?} below y = {}", item.id, floor_y);
                culled += 1;
            } else {
                index += 1;
            }
        }
        culled
    }

    /// Resolve a picked scene node (possibly a child mesh of a composite
    /// model) up its hierarchy to the owning item
    pub fn find_by_node(&self, node: NodeId, scene: &Scene) -> Option<ItemId> {
        let root = scene.resolve_root(node);
        self.items
            .iter()
            .find(|item| item.node == root)
            .map(|item| item.id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Root node ids of all active items, for ray casting
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.items.iter().map(|item| item.node).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn oldest(&self) -> Option<ItemId> {
        self.items.first().map(|item| item.id)
    }

    /// Release every item (restart/teardown)
    pub fn clear(&mut self, scene: &mut Scene, physics: &mut PhysicsWorld) {
        for item in self.items.drain(..) {
            physics.remove_body(item.body);
            scene.remove(item.node);
        }
    }
}

/// Predefined elevated drop positions for the initial batch, staggered so the
/// first items do not spawn intersecting each other
pub const DROP_POSITIONS: [[f32; 3]; 8] = [
    [0.0, 5.0, 0.0],
    [1.5, 5.5, 0.0],
    [-1.5, 6.0, 0.0],
    [0.0, 6.5, 1.5],
    [0.0, 7.0, -1.5],
    [1.0, 7.5, 1.0],
    [-1.0, 8.0, -1.0],
    [0.8, 8.5, -0.8],
];

/// Random position above the bowl for replacement spawns
pub fn drop_position(rng: &mut impl Rng, bowl_radius: f32) -> Vec3 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let radius = rng.random_range(0.0..bowl_radius * 0.8);
    Vec3::new(
        angle.cos() * radius,
        5.0 + rng.random_range(0.0..2.0),
        angle.sin() * radius,
    )
}

/// Random position low inside the bowl, for returns from the tray
pub fn bowl_return_position(rng: &mut impl Rng, bowl_radius: f32) -> Vec3 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let radius = rng.random_range(0.0..bowl_radius * 0.6);
    Vec3::new(
        angle.cos() * radius,
        1.5 + rng.random_range(0.0..1.0),
        angle.sin() * radius,
    )
}
