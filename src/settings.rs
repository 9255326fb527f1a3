//! Gameplay tunables and preferences
//!
//! Persisted in LocalStorage on wasm. `GameConfig` carries the knobs the
//! game core consumes; `Settings` wraps it with presentation preferences.

use serde::{Deserialize, Serialize};

/// Core gameplay tunables
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of collection-tray slots (legacy deployments ran 5)
    pub tray_size: usize,
    /// Active-item population ceiling; FIFO eviction enforces it
    pub max_items: usize,
    /// Session length in seconds
    pub session_seconds: u32,
    /// Same-kind occurrences needed for a match
    pub match_threshold: usize,
    /// Items below this height are culled and respawned
    pub floor_y: f32,
    /// Delay between initial-batch spawns, seconds
    pub spawn_batch_delay: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tray_size: 8,
            max_items: 8,
            session_seconds: 180,
            match_threshold: 3,
            floor_y: -5.0,
            spawn_batch_delay: 1.0,
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub config: GameConfig,
    /// Particle effects (spawn sparks, collect stars)
    pub particles: bool,
    /// Minimize shake/flash treatments
    pub reduced_motion: bool,
    /// Show FPS counter in the HUD
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            particles: true,
            reduced_motion: false,
            show_fps: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "fruit_bowl_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
