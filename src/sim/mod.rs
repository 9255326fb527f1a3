//! Game core
//!
//! All gameplay logic lives here: the physics world, the item lifecycle, the
//! collection tray, time-boxed effects and the session driver. This module
//! has no platform or GPU dependencies: the shell feeds it frame deltas and
//! pointer events, and reads the scene back for drawing.

pub mod effect;
pub mod item;
pub mod physics;
pub mod session;
pub mod timer;
pub mod tray;

pub use effect::{EffectOutcome, EffectScheduler};
pub use item::{Item, ItemId, ItemKind, ItemRegistry};
pub use physics::{BodyHandle, PhysicsWorld};
pub use session::{GameSession, SessionPhase};
pub use timer::SessionTimer;
pub use tray::{CollectionTray, MatchGroup};
