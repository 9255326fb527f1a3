//! Fruit Bowl - a 3D fruit-matching bowl game
//!
//! Core modules:
//! - `sim`: game core (physics world, item lifecycle, tray matching, effects, session)
//! - `scene`: scene graph, camera, ray casting, renderer trait
//! - `input`: pointer-to-item picking
//! - `assets`: item model catalog and loading capability
//! - `settings`: gameplay tunables and preferences
//! - `highscores`: LocalStorage leaderboard

pub mod assets;
pub mod highscores;
pub mod input;
pub mod scene;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{GameConfig, Settings};

/// Game configuration constants
pub mod consts {
    /// Downward gravity (m/s²)
    pub const GRAVITY_Y: f32 = -9.8;
    /// Fixed physics timestep the solver subdivides frames into
    pub const PHYS_DT: f32 = 1.0 / 60.0;
    /// Maximum solver substeps per frame to bound cost on frame-time spikes
    pub const MAX_SUBSTEPS: u32 = 10;

    /// Bowl centerline radius
    pub const BOWL_RADIUS: f32 = 2.0;
    /// Wall lattice: concentric rings approximating the bowl's curvature
    pub const BOWL_RINGS: usize = 6;
    /// Cylinder segments per ring
    pub const BOWL_RING_SEGMENTS: usize = 16;
    /// Total wall height as a fraction of the bowl radius
    pub const BOWL_WALL_HEIGHT_FACTOR: f32 = 1.5;
    /// Radial half-thickness of a wall segment
    pub const BOWL_WALL_SEGMENT_RADIUS: f32 = 0.15;

    /// Collision sphere radius for items
    pub const ITEM_RADIUS: f32 = 0.3;
    /// Item mass (anything > 0 marks the body dynamic)
    pub const ITEM_MASS: f32 = 1.0;
    pub const ITEM_RESTITUTION: f32 = 0.2;
    pub const ITEM_FRICTION: f32 = 0.9;
    /// Visual scale items pop in to
    pub const ITEM_SCALE: f32 = 0.7;

    /// Effect durations (seconds)
    pub const SPAWN_POP_DURATION: f32 = 0.5;
    pub const COLLECT_DURATION: f32 = 0.4;
    pub const RETURN_DURATION: f32 = 0.35;
    /// Transient particles per effect
    pub const EFFECT_PARTICLE_COUNT: usize = 15;

    /// Points awarded per cleared tray slot
    pub const POINTS_PER_SLOT: u64 = 10;
    /// Replacement items spawned after each cleared match group
    pub const REPLACEMENTS_PER_MATCH: usize = 2;
}

/// Elastic ease-out with one overshoot/settle, used for pop-in growth
#[inline]
pub fn elastic_out(t: f32) -> f32 {
    use std::f32::consts::PI;
    (-13.0 * (t + 1.0) * PI / 2.0).sin() * 2.0_f32.powf(-10.0 * t) + 1.0
}

#[cfg(test)]
mod tests {
    use super::elastic_out;

    #[test]
    fn test_elastic_out_settles_at_one() {
        assert!((elastic_out(1.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_elastic_out_starts_at_zero() {
        assert!(elastic_out(0.0).abs() < 0.001);
    }

    #[test]
    fn test_elastic_out_overshoots() {
        // The curve must exceed 1.0 somewhere in (0, 1) for the pop feel
        let overshoot = (1..100)
            .map(|i| elastic_out(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(overshoot > 1.0);
    }
}
