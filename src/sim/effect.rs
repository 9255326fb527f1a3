//! Time-boxed visual effects
//!
//! Every effect owns its transient particle nodes and an optional central
//! burst node, advances on the per-frame tick from elapsed wall-clock time,
//! and yields its completion payload exactly once: when primary progress
//! reaches 1 and every particle has expired. Particles have a zero bounding
//! radius so they are invisible to picking.

use glam::{Quat, Vec3};
use rand::Rng;

use super::item::ItemKind;
use crate::consts::*;
use crate::elastic_out;
use crate::scene::{Node, NodeId, Scene};

/// Star tint palette for collect/return bursts
const STAR_COLORS: [u32; 4] = [0xffff00, 0xffffff, 0xff9900, 0xff00ff];

/// Downward drift applied to collect-star directions, per second
const PARTICLE_GRAVITY: f32 = 0.18;

/// A transient visual-only particle owned by an effect
#[derive(Debug)]
struct Particle {
    node: NodeId,
    direction: Vec3,
    speed: f32,
    spin: f32,
    age: f32,
    lifetime: f32,
    base_opacity: f32,
    gravity: f32,
    shrinks: bool,
}

impl Particle {
    /// Advance one tick; returns false once expired (node already removed)
    fn advance(&mut self, scene: &mut Scene, dt: f32) -> bool {
        self.age += dt;
        if self.age >= self.lifetime {
            scene.remove(self.node);
            return false;
        }
        let progress = self.age / self.lifetime;
        self.direction.y -= self.gravity * dt;
        if let Some(node) = scene.get_mut(self.node) {
            node.position += self.direction * self.speed * dt;
            node.rotation *= Quat::from_rotation_z(self.spin * dt);
            node.opacity = self.base_opacity * (1.0 - progress);
            if self.shrinks {
                node.scale = Vec3::splat(1.0 - progress * 0.8);
            }
        }
        true
    }
}

/// Item kind plus the retained original visual, carried from pick to tray
#[derive(Debug)]
pub struct CollectPayload {
    pub kind: ItemKind,
    pub visual: Node,
}

/// Slot content on its way back into the simulation
#[derive(Debug)]
pub struct ReturnPayload {
    pub kind: ItemKind,
    pub node: NodeId,
    pub position: Vec3,
}

enum EffectKind {
    /// Elastic pop-in of a freshly spawned item
    SpawnPop { item_node: NodeId, target_scale: f32 },
    /// Explosion burst where an item was picked; completion places the payload
    Collect { burst: NodeId, payload: CollectPayload },
    /// Elastic pop-in of a returned item; completion re-registers it
    Return {
        item_node: NodeId,
        target_scale: f32,
        payload: ReturnPayload,
    },
}

/// Yielded exactly once per completed effect
#[derive(Debug)]
pub enum EffectOutcome {
    SpawnSettled,
    Collected(CollectPayload),
    Returned(ReturnPayload),
}

struct Effect {
    kind: EffectKind,
    elapsed: f32,
    duration: f32,
    particles: Vec<Particle>,
}

/// Advances all in-flight effects once per game tick
#[derive(Default)]
pub struct EffectScheduler {
    effects: Vec<Effect>,
}

impl EffectScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects currently carrying an item between registry and tray
    pub fn carried_items(&self) -> usize {
        self.effects
            .iter()
            .filter(|effect| {
                matches!(
                    effect.kind,
                    EffectKind::Collect { .. } | EffectKind::Return { .. }
                )
            })
            .count()
    }

    /// Pop-in for a spawned item: white sparks, elastic scale from zero
    pub fn start_spawn_pop(
        &mut self,
        scene: &mut Scene,
        rng: &mut impl Rng,
        item_node: NodeId,
        origin: Vec3,
        target_scale: f32,
    ) {
        scene.set_uniform_scale(item_node, 0.0);
        let particles = (0..EFFECT_PARTICLE_COUNT)
            .map(|_| {
                let direction = Vec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(0.0..2.0),
                    rng.random_range(-1.0..1.0),
                )
                .normalize_or_zero();
                let node = scene.insert(Node::new(origin, 0.0).with_color(0xffffff));
                Particle {
                    node,
                    direction,
                    speed: rng.random_range(3.0..9.0),
                    spin: 0.0,
                    age: 0.0,
                    lifetime: SPAWN_POP_DURATION,
                    base_opacity: 0.8,
                    gravity: 0.0,
                    shrinks: true,
                }
            })
            .collect();
        self.effects.push(Effect {
            kind: EffectKind::SpawnPop {
                item_node,
                target_scale,
            },
            elapsed: 0.0,
            duration: SPAWN_POP_DURATION,
            particles,
        });
    }

    /// Explosion burst at a picked item's last pose: expanding flash sphere
    /// plus colored stars that drift down
    pub fn start_collect(
        &mut self,
        scene: &mut Scene,
        rng: &mut impl Rng,
        origin: Vec3,
        payload: CollectPayload,
    ) {
        let burst = {
            let mut node = Node::new(origin, 0.0).with_color(0xffff00);
            node.scale = Vec3::splat(0.1);
            node.opacity = 0.8;
            scene.insert(node)
        };
        let particles = (0..EFFECT_PARTICLE_COUNT)
            .map(|_| {
                let direction = Vec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(0.0..1.5),
                    rng.random_range(-1.0..1.0),
                )
                .normalize_or_zero();
                let color = STAR_COLORS[rng.random_range(0..STAR_COLORS.len())];
                let node = scene.insert(Node::new(origin, 0.0).with_color(color));
                Particle {
                    node,
                    direction,
                    speed: rng.random_range(3.0..12.0),
                    spin: rng.random_range(-6.0..6.0),
                    age: 0.0,
                    lifetime: rng.random_range(0.3..0.5),
                    base_opacity: 0.9,
                    gravity: PARTICLE_GRAVITY,
                    shrinks: false,
                }
            })
            .collect();
        self.effects.push(Effect {
            kind: EffectKind::Collect { burst, payload },
            elapsed: 0.0,
            duration: COLLECT_DURATION,
            particles,
        });
    }

    /// Pop-in of a slot's retained visual back inside the bowl, with stars
    /// streaming from the tray toward the landing spot
    pub fn start_return(
        &mut self,
        scene: &mut Scene,
        rng: &mut impl Rng,
        stream_origin: Vec3,
        target_scale: f32,
        payload: ReturnPayload,
    ) {
        scene.set_uniform_scale(payload.node, 0.0);
        let particles = (0..EFFECT_PARTICLE_COUNT)
            .map(|_| {
                let scatter = Vec3::new(
                    rng.random_range(-0.3..0.3),
                    rng.random_range(0.0..0.2),
                    rng.random_range(-0.3..0.3),
                );
                let direction =
                    ((payload.position - stream_origin).normalize_or_zero() + scatter)
                        .normalize_or_zero();
                let color = STAR_COLORS[rng.random_range(0..STAR_COLORS.len())];
                let node = scene.insert(Node::new(stream_origin, 0.0).with_color(color));
                Particle {
                    node,
                    direction,
                    speed: rng.random_range(9.0..18.0),
                    spin: rng.random_range(0.0..18.0),
                    age: 0.0,
                    lifetime: rng.random_range(0.3..0.45),
                    base_opacity: 0.9,
                    gravity: 0.0,
                    shrinks: false,
                }
            })
            .collect();
        self.effects.push(Effect {
            kind: EffectKind::Return {
                item_node: payload.node,
                target_scale,
                payload,
            },
            elapsed: 0.0,
            duration: RETURN_DURATION,
            particles,
        });
    }

    /// Advance every in-flight effect, yielding each completion exactly once
    pub fn advance(&mut self, scene: &mut Scene, dt: f32) -> Vec<EffectOutcome> {
        let mut outcomes = Vec::new();
        let mut index = 0;
        while index < self.effects.len() {
            let effect = &mut self.effects[index];
            effect.elapsed += dt;
            let progress = (effect.elapsed / effect.duration).min(1.0);

            match &effect.kind {
                EffectKind::SpawnPop {
                    item_node,
                    target_scale,
                } => {
                    // Culled or evicted items leave a dangling node id; the
                    // scale write is then a no-op and the effect winds down
                    scene.set_uniform_scale(*item_node, elastic_out(progress) * target_scale);
                }
                EffectKind::Collect { burst, .. } => {
                    if progress < 0.3 {
                        // Rapid linear expansion for the first 30 %
                        scene.set_uniform_scale(*burst, progress / 0.3 * 2.0);
                    } else {
                        // Then fade over the remaining 70 %
                        scene.set_opacity(*burst, 0.8 * (1.0 - (progress - 0.3) / 0.7));
                    }
                }
                EffectKind::Return {
                    item_node,
                    target_scale,
                    ..
                } => {
                    scene.set_uniform_scale(*item_node, elastic_out(progress) * target_scale);
                }
            }

            effect
                .particles
                .retain_mut(|particle| particle.advance(scene, dt));

            if progress >= 1.0 && effect.particles.is_empty() {
                let effect = self.effects.remove(index);
                outcomes.push(match effect.kind {
                    EffectKind::SpawnPop { .. } => EffectOutcome::SpawnSettled,
                    EffectKind::Collect { burst, payload } => {
                        scene.remove(burst);
                        EffectOutcome::Collected(payload)
                    }
                    EffectKind::Return { payload, .. } => EffectOutcome::Returned(payload),
                });
            } else {
                index += 1;
            }
        }
        outcomes
    }

    /// Tear down every in-flight effect and its scene resources. In-transit
    /// collect payloads are dropped with the effect; return items are removed
    /// from the scene since they have no body yet.
    pub fn clear(&mut self, scene: &mut Scene) {
        for effect in self.effects.drain(..) {
            for particle in effect.particles {
                scene.remove(particle.node);
            }
            match effect.kind {
                EffectKind::SpawnPop { .. } => {}
                EffectKind::Collect { burst, .. } => {
                    scene.remove(burst);
                }
                EffectKind::Return { item_node, .. } => {
                    scene.remove(item_node);
                }
            }
        }
    }
}
