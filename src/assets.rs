//! Item model catalog
//!
//! Model files are an external capability: a [`ModelSource`] resolves a path
//! to a [`ModelPrototype`] the scene can instantiate. A type whose model
//! fails to load is logged and excluded from the spawn pool for the session;
//! the session only aborts when no type loaded at all.

use glam::Vec3;

use crate::scene::{Node, NodeId, Scene};
use crate::sim::item::ItemKind;

/// How an item type is sourced and presented
#[derive(Debug, Clone, Copy)]
pub struct ItemTypeSpec {
    pub kind: ItemKind,
    pub model_path: &'static str,
    pub scale: f32,
}

/// The default spawn pool
pub const ITEM_TYPES: [ItemTypeSpec; 4] = [
    ItemTypeSpec {
        kind: ItemKind::Apple,
        model_path: "models/apple-cat-colored.glb",
        scale: crate::consts::ITEM_SCALE,
    },
    ItemTypeSpec {
        kind: ItemKind::Pineapple,
        model_path: "models/pineapple-cat-colored.glb",
        scale: crate::consts::ITEM_SCALE,
    },
    ItemTypeSpec {
        kind: ItemKind::Tomato,
        model_path: "models/tomato-cat-colored.glb",
        scale: crate::consts::ITEM_SCALE,
    },
    ItemTypeSpec {
        kind: ItemKind::Watermelon,
        model_path: "models/watermelon-cat-colored.glb",
        scale: crate::consts::ITEM_SCALE,
    },
];

/// One mesh part of a composite model, relative to the model root
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub offset: Vec3,
    pub radius: f32,
}

/// A loaded, instantiable model
#[derive(Debug, Clone)]
pub struct ModelPrototype {
    pub bounding_radius: f32,
    pub parts: Vec<ModelPart>,
}

/// Asset pipeline failures
#[derive(Debug)]
pub enum AssetError {
    NotFound(String),
    Malformed(String),
    /// Every model in the spawn pool failed; the session cannot start
    NoTypesAvailable,
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::NotFound(path) => write!(f, "model not found: {path}"),
            AssetError::Malformed(path) => write!(f, "model failed to parse: {path}"),
            AssetError::NoTypesAvailable => write!(f, "no item models could be loaded"),
        }
    }
}

impl std::error::Error for AssetError {}

/// Model-loading capability. Loading happens before gameplay starts; the
/// wasm shell fetches asynchronously and hands results through this trait.
pub trait ModelSource {
    fn load(&self, path: &str) -> Result<ModelPrototype, AssetError>;
}

/// Placeholder source producing one-part sphere models, used until a
/// GLB-backed source is wired to the renderer and by the native smoke run
pub struct ProceduralSource;

impl ModelSource for ProceduralSource {
    fn load(&self, _path: &str) -> Result<ModelPrototype, AssetError> {
        Ok(ModelPrototype {
            bounding_radius: crate::consts::ITEM_RADIUS,
            parts: vec![ModelPart {
                offset: Vec3::ZERO,
                radius: crate::consts::ITEM_RADIUS,
            }],
        })
    }
}

/// The loaded spawn pool
#[derive(Debug)]
pub struct AssetCatalog {
    entries: Vec<(ItemTypeSpec, ModelPrototype)>,
}

impl AssetCatalog {
    /// Load every spec through the source. Per-type failures are logged and
    /// excluded; an empty pool is fatal.
    pub fn load(source: &dyn ModelSource, specs: &[ItemTypeSpec]) -> Result<Self, AssetError> {
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            match source.load(spec.model_path) {
                Ok(prototype) => entries.push((*spec, prototype)),
                Err(err) => {
                    log::warn!(
                        "excluding {} from the spawn pool: {err}",
                        spec.kind.as_str()
                    );
                }
            }
        }
        if entries.is_empty() {
            return Err(AssetError::NoTypesAvailable);
        }
        log::info!("loaded {} of {} item models", entries.len(), specs.len());
        Ok(Self { entries })
    }

    /// Kinds that loaded and may be spawned
    pub fn available_kinds(&self) -> Vec<ItemKind> {
        self.entries.iter().map(|(spec, _)| spec.kind).collect()
    }

    pub fn target_scale(&self, kind: ItemKind) -> f32 {
        self.entries
            .iter()
            .find(|(spec, _)| spec.kind == kind)
            .map(|(spec, _)| spec.scale)
            .unwrap_or(crate::consts::ITEM_SCALE)
    }

    /// Build the scene nodes for one item: a root node plus one child per
    /// mesh part. Returns `None` for a kind that is not in the pool.
    pub fn instantiate(&self, kind: ItemKind, scene: &mut Scene, position: Vec3) -> Option<NodeId> {
        let (_, prototype) = self.entries.iter().find(|(spec, _)| spec.kind == kind)?;
        let root = scene.insert(Node::new(position, prototype.bounding_radius));
        for part in &prototype.parts {
            scene.insert(Node::new(part.offset, part.radius).with_parent(root));
        }
        Some(root)
    }
}
