//! Game session aggregate and per-frame driver
//!
//! `GameSession` owns the physics world, scene, registry, tray, effects and
//! timer as one explicit unit; the shell passes it to the frame loop and
//! input handlers instead of sharing globals. `tick` is the whole per-frame
//! sequence: step physics, sync poses, cull and replenish, advance effects
//! and settle their completions. Nothing in it blocks and every stage is
//! bounded per call.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effect::{CollectPayload, EffectOutcome, EffectScheduler, ReturnPayload};
use super::item::{bowl_return_position, drop_position, ItemId, ItemRegistry, DROP_POSITIONS};
use super::physics::PhysicsWorld;
use super::timer::SessionTimer;
use super::tray::{CollectionTray, SlotContent};
use crate::assets::AssetCatalog;
use crate::consts::*;
use crate::scene::{Camera, Scene};
use crate::settings::GameConfig;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    GameOver,
}

/// A spawn waiting on the batch-stagger delay
struct PendingSpawn {
    delay: f32,
    /// Predefined drop position, or `None` for a random one
    position: Option<Vec3>,
}

/// Everything one play session owns
pub struct GameSession {
    pub config: GameConfig,
    catalog: AssetCatalog,
    pub physics: PhysicsWorld,
    pub scene: Scene,
    pub camera: Camera,
    pub registry: ItemRegistry,
    pub tray: CollectionTray,
    pub timer: SessionTimer,
    effects: EffectScheduler,
    rng: Pcg32,
    pub phase: SessionPhase,
    pub score: u64,
    pub matches_cleared: u32,
    pending_spawns: Vec<PendingSpawn>,
}

impl GameSession {
    pub fn new(config: GameConfig, catalog: AssetCatalog, seed: u64) -> Self {
        let mut physics = PhysicsWorld::new(Vec3::new(0.0, GRAVITY_Y, 0.0));
        physics.add_bowl(BOWL_RADIUS);

        let mut session = Self {
            registry: ItemRegistry::new(config.max_items),
            tray: CollectionTray::new(config.tray_size, config.match_threshold),
            timer: SessionTimer::new(config.session_seconds),
            effects: EffectScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            phase: SessionPhase::Playing,
            score: 0,
            matches_cleared: 0,
            pending_spawns: Vec::new(),
            scene: Scene::new(),
            camera: Camera::default(),
            physics,
            catalog,
            config,
        };
        session.queue_initial_batch();
        session.timer.start();
        session
    }

    /// One frame of the game loop
    pub fn tick(&mut self, dt: f32) {
        if self.phase == SessionPhase::GameOver {
            return;
        }

        self.physics.step(dt, MAX_SUBSTEPS);

        // Write physics poses back onto item visuals
        for item in self.registry.iter() {
            if let Some((position, rotation)) = self.physics.pose(item.body) {
                self.scene.set_pose(item.node, position, rotation);
            }
        }

        // Items that escaped the bowl get culled and replaced one-for-one
        let culled = self
            .registry
            .cull(self.config.floor_y, &mut self.scene, &mut self.physics);
        for _ in 0..culled {
            self.queue_replacement();
        }

        // Drain spawns whose stagger delay has elapsed
        let mut ready = Vec::new();
        self.pending_spawns.retain_mut(|pending| {
            pending.delay -= dt;
            if pending.delay <= 0.0 {
                ready.push(pending.position);
                false
            } else {
                true
            }
        });
        for position in ready {
            self.spawn_now(position);
        }

        for outcome in self.effects.advance(&mut self.scene, dt) {
            match outcome {
                EffectOutcome::SpawnSettled => {}
                EffectOutcome::Collected(payload) => self.place_in_tray(payload),
                EffectOutcome::Returned(payload) => self.finish_return(payload),
            }
        }
    }

    /// Route a pointer click (normalized device coordinates). Returns whether
    /// an item was picked; a miss is a no-op.
    pub fn handle_click(&mut self, ndc: Vec2) -> bool {
        if self.phase == SessionPhase::GameOver {
            return false;
        }
        match crate::input::pick(&self.scene, &self.camera, &self.registry, ndc) {
            Some(id) => {
                self.collect_item(id);
                true
            }
            None => false,
        }
    }

    /// Pull an item out of the simulation and start its collect burst. The
    /// registry removal and body detach happen here, atomically, so the item
    /// cannot be re-picked mid-transit.
    pub fn collect_item(&mut self, id: ItemId) {
        let Some(item) = self.registry.get(id) else {
            return;
        };
        let origin = self
            .scene
            .world_pose(item.node)
            .map(|(position, _)| position)
            .unwrap_or(Vec3::ZERO);
        let Some(taken) = self.registry.take(id, &mut self.physics) else {
            return;
        };
        let Some(mut visual) = self.scene.remove(taken.node) else {
            return;
        };
        visual.opacity = 1.0;
        self.effects.start_collect(
            &mut self.scene,
            &mut self.rng,
            origin,
            CollectPayload {
                kind: taken.kind,
                visual,
            },
        );
    }

    /// Player clicked a filled tray slot: send its content back to the bowl
    pub fn return_slot(&mut self, index: usize) -> bool {
        if self.phase == SessionPhase::GameOver {
            return false;
        }
        match self.tray.take(index) {
            Some(content) => {
                self.begin_return(content);
                true
            }
            None => false,
        }
    }

    /// Advance the countdown by one second (driven by the shell's 1 Hz
    /// interval). Returns true on the call that ends the session.
    pub fn tick_timer(&mut self) -> bool {
        let expired = self.timer.advance(1.0);
        if expired {
            self.phase = SessionPhase::GameOver;
            // Outstanding animations are torn down; items and tray stay
            // visible behind the overlay until restart
            self.effects.clear(&mut self.scene);
            log::info!("session over, final score {}", self.score);
        }
        expired
    }

    /// Full teardown and fresh start
    pub fn restart(&mut self, seed: u64) {
        self.effects.clear(&mut self.scene);
        self.registry.clear(&mut self.scene, &mut self.physics);
        self.tray.clear_all();
        self.pending_spawns.clear();
        self.score = 0;
        self.matches_cleared = 0;
        self.rng = Pcg32::seed_from_u64(seed);
        self.phase = SessionPhase::Playing;
        self.timer.reset(Some(self.config.session_seconds));
        self.timer.start();
        self.queue_initial_batch();
        log::info!("session restarted with seed {seed}");
    }

    /// Items anywhere in the pipeline: active, mid-effect, or in the tray.
    /// Conserved across pick/place/return operations.
    pub fn total_item_count(&self) -> usize {
        self.registry.len() + self.effects.carried_items() + self.tray.filled_count()
    }

    fn queue_initial_batch(&mut self) {
        for i in 0..self.config.max_items {
            self.pending_spawns.push(PendingSpawn {
                delay: i as f32 * self.config.spawn_batch_delay,
                position: Some(Vec3::from_array(DROP_POSITIONS[i % DROP_POSITIONS.len()])),
            });
        }
    }

    fn queue_replacement(&mut self) {
        self.pending_spawns.push(PendingSpawn {
            delay: 0.0,
            position: None,
        });
    }

    fn spawn_now(&mut self, position: Option<Vec3>) {
        let kinds = self.catalog.available_kinds();
        let kind = kinds[self.rng.random_range(0..kinds.len())];
        let position = position.unwrap_or_else(|| drop_position(&mut self.rng, BOWL_RADIUS));

        let Some(node) = self.catalog.instantiate(kind, &mut self.scene, position) else {
            log::warn!("no prototype for {}, skipping spawn", kind.as_str());
            return;
        };
        let body = self
            .physics
            .add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, position);
        self.registry
            .insert(kind, node, body, &mut self.scene, &mut self.physics);

        // Small sideways nudge so stacked drops spread out
        let nudge = Vec3::new(
            self.rng.random_range(-0.25..0.25),
            0.0,
            self.rng.random_range(-0.25..0.25),
        );
        self.physics.apply_impulse(body, nudge);

        let target_scale = self.catalog.target_scale(kind);
        self.effects
            .start_spawn_pop(&mut self.scene, &mut self.rng, node, position, target_scale);
    }

    /// A collect burst finished: the item lands in the tray, or bounces back
    /// to the bowl when the tray is full
    fn place_in_tray(&mut self, payload: CollectPayload) {
        match self.tray.place(payload.kind, payload.visual) {
            Ok(index) => {
                log::debug!("{} placed in slot {index}", payload.kind.as_str());
                self.settle_matches();
            }
            Err(content) => {
                // Never drop the item: back into the simulation it goes
                log::debug!("tray full, returning {} to the bowl", content.kind.as_str());
                self.begin_return(content);
            }
        }
    }

    fn settle_matches(&mut self) {
        for group in self.tray.check_matches() {
            self.score += group.slots.len() as u64 * POINTS_PER_SLOT;
            self.matches_cleared += 1;
            log::info!(
                "matched {} x{}, score {}",
                group.kind.as_str(),
                group.slots.len(),
                self.score
            );
            self.tray.clear(&group);
            for _ in 0..REPLACEMENTS_PER_MATCH {
                self.queue_replacement();
            }
        }
    }

    fn begin_return(&mut self, content: SlotContent) {
        let position = bowl_return_position(&mut self.rng, BOWL_RADIUS);
        let mut visual = content.visual;
        visual.position = position;
        visual.opacity = 1.0;
        let node = self.scene.reinsert(visual);

        // Stars stream from tray-side space toward the landing spot
        let stream_origin = self.camera.eye + (position - self.camera.eye) * 0.25;
        let target_scale = self.catalog.target_scale(content.kind);
        self.effects.start_return(
            &mut self.scene,
            &mut self.rng,
            stream_origin,
            target_scale,
            ReturnPayload {
                kind: content.kind,
                node,
                position,
            },
        );
    }

    /// A return animation finished: give the item its body back and make it
    /// clickable again
    fn finish_return(&mut self, payload: ReturnPayload) {
        if !self.scene.contains(payload.node) {
            return;
        }
        let body = self
            .physics
            .add_dynamic_sphere(ITEM_RADIUS, ITEM_MASS, payload.position);
        self.registry.insert(
            payload.kind,
            payload.node,
            body,
            &mut self.scene,
            &mut self.physics,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetCatalog, ItemTypeSpec, ProceduralSource, ITEM_TYPES};
    use crate::sim::item::ItemKind;

    const DT: f32 = 1.0 / 60.0;

    fn apple_only_catalog() -> AssetCatalog {
        let specs: Vec<ItemTypeSpec> = ITEM_TYPES
            .iter()
            .copied()
            .filter(|spec| spec.kind == ItemKind::Apple)
            .collect();
        AssetCatalog::load(&ProceduralSource, &specs).unwrap()
    }

    fn quick_config() -> GameConfig {
        GameConfig {
            spawn_batch_delay: 0.0,
            ..GameConfig::default()
        }
    }

    fn session_with(config: GameConfig) -> GameSession {
        let mut session = GameSession::new(config, apple_only_catalog(), 42);
        // First tick drains the whole (zero-delay) initial batch
        session.tick(DT);
        session
    }

    fn run(session: &mut GameSession, seconds: f32) {
        let mut remaining = seconds;
        while remaining > 0.0 {
            session.tick(DT);
            remaining -= DT;
        }
    }

    #[test]
    fn test_initial_batch_fills_to_ceiling() {
        let session = session_with(quick_config());
        assert_eq!(session.registry.len(), session.config.max_items);
        assert_eq!(session.total_item_count(), session.config.max_items);
    }

    #[test]
    fn test_collect_three_scores_one_match() {
        let mut session = session_with(quick_config());
        let ids: Vec<ItemId> = session.registry.iter().map(|item| item.id).take(3).collect();
        for id in ids {
            session.collect_item(id);
        }
        assert_eq!(session.effects.carried_items(), 3);

        // Let collect bursts finish and replacements spawn
        run(&mut session, 2.0);

        assert_eq!(session.matches_cleared, 1);
        assert_eq!(session.score, 3 * POINTS_PER_SLOT);
        assert_eq!(session.tray.filled_count(), 0);
        // Two replacements per match, bounded by the ceiling
        assert!(session.registry.len() <= session.config.max_items);
        assert!(session.registry.len() >= session.config.max_items - 1);
    }

    #[test]
    fn test_full_tray_loses_no_items() {
        let config = GameConfig {
            tray_size: 2,
            spawn_batch_delay: 0.0,
            ..GameConfig::default()
        };
        let mut session = session_with(config);
        let before = session.total_item_count();

        let ids: Vec<ItemId> = session.registry.iter().map(|item| item.id).take(3).collect();
        for id in ids {
            session.collect_item(id);
        }
        assert_eq!(session.total_item_count(), before);

        // Two land in the tray; the third finds it full and returns
        run(&mut session, 3.0);
        assert_eq!(session.tray.filled_count(), 2);
        assert_eq!(session.effects.carried_items(), 0);
        assert_eq!(session.total_item_count(), before);
        assert_eq!(
            session.registry.len(),
            before - session.tray.filled_count()
        );
    }

    #[test]
    fn test_cull_replaces_within_a_tick() {
        let mut session = session_with(quick_config());
        let before = session.registry.len();
        let victim = session.registry.iter().next().unwrap();
        let (victim_id, victim_body) = (victim.id, victim.body);
        session
            .physics
            .set_translation(victim_body, Vec3::new(0.0, -6.0, 0.0));

        session.tick(DT);
        assert!(!session.registry.contains(victim_id));
        // Exactly one replacement spawned in the same tick
        assert_eq!(session.registry.len(), before);
    }

    #[test]
    fn test_return_slot_round_trip() {
        let mut session = session_with(quick_config());
        let first = session.registry.iter().next().unwrap().id;
        session.collect_item(first);
        run(&mut session, 2.0);
        assert_eq!(session.tray.filled_count(), 1);
        let active_before = session.registry.len();

        assert!(session.return_slot(0));
        assert_eq!(session.tray.filled_count(), 0);
        run(&mut session, 2.0);
        assert_eq!(session.registry.len(), active_before + 1);
        // Returning an empty slot is a no-op
        assert!(!session.return_slot(0));
    }

    #[test]
    fn test_timer_expiry_ends_session() {
        let config = GameConfig {
            session_seconds: 2,
            spawn_batch_delay: 0.0,
            ..GameConfig::default()
        };
        let mut session = session_with(config);
        assert!(!session.tick_timer());
        assert!(session.tick_timer());
        assert_eq!(session.phase, SessionPhase::GameOver);
        assert!(session.effects.is_empty());
        // Expired session ignores input and further timer ticks
        assert!(!session.tick_timer());
        assert!(!session.handle_click(Vec2::ZERO));
        assert!(!session.return_slot(0));
    }

    #[test]
    fn test_restart_rebuilds_from_scratch() {
        let mut session = session_with(quick_config());
        let first = session.registry.iter().next().unwrap().id;
        session.collect_item(first);
        run(&mut session, 2.0);
        session.score = 130;

        session.restart(7);
        assert_eq!(session.score, 0);
        assert_eq!(session.matches_cleared, 0);
        assert_eq!(session.phase, SessionPhase::Playing);
        assert!(session.registry.is_empty());
        assert_eq!(session.tray.filled_count(), 0);
        assert!(session.timer.is_running());

        session.tick(DT);
        assert_eq!(session.registry.len(), session.config.max_items);
    }

    #[test]
    fn test_click_through_camera_picks_an_item() {
        let mut session = session_with(quick_config());
        // Let items settle into the bowl near the origin
        run(&mut session, 2.0);
        let before = session.registry.len();
        // The center ray aims at the bowl; with eight settled items it hits one
        let picked = session.handle_click(Vec2::ZERO);
        if picked {
            assert_eq!(session.registry.len(), before - 1);
            assert_eq!(session.effects.carried_items(), 1);
        }
    }
}
