use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;
use crate::geometry::Rect;

/// One rendered grid item, snapshotted once per layout pass.
///
/// `group_key` is the logical identity of the day the item belongs to
/// (typically an ISO date). `category_key` is a coarser label (weekday name)
/// used only to pick a display color, never for grouping.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSnapshot {
    pub id: String,
    #[serde(default)]
    pub group_key: Option<String>,
    #[serde(default)]
    pub category_key: Option<String>,
    pub rect: Rect,
    /// ISO-8601 timestamp. Kept as text; ISO strings order correctly under
    /// lexicographic comparison.
    #[serde(default)]
    pub occurs_at: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

/// One physical grid region. The same logical day may span several of these.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSnapshot {
    /// Explicit group-key attribute on the container, when the host provides
    /// one. Falls back to the first visible member's key otherwise.
    #[serde(default)]
    pub group_key: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemSnapshot>,
}

/// Narrow host abstraction: everything the engine reads from the page.
///
/// Keeps geometry, classification and shape generation free of any DOM or
/// CSS specifics, so the whole pipeline is testable against [`StaticScene`].
pub trait Scene {
    fn containers(&self) -> Vec<ContainerSnapshot>;

    /// Read one numeric grid variable (host equivalent: a CSS custom
    /// property). `None` means the host does not define it.
    fn grid_metric(&self, name: &str) -> Option<f32>;

    fn container_width(&self) -> f32;

    /// Whether the dedicated overlay surface exists in the host markup. The
    /// engine never creates it; a pass aborts when it is missing.
    fn overlay_present(&self) -> bool;
}

/// In-memory scene, deserializable from JSON. Backs the CLI and the tests.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticScene {
    pub container_width: f32,
    #[serde(default)]
    pub metrics: HashMap<String, f32>,
    #[serde(default)]
    pub containers: Vec<ContainerSnapshot>,
    #[serde(default = "default_true")]
    pub overlay_present: bool,
}

impl StaticScene {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl Scene for StaticScene {
    fn containers(&self) -> Vec<ContainerSnapshot> {
        self.containers.clone()
    }

    fn grid_metric(&self, name: &str) -> Option<f32> {
        self.metrics.get(name).copied()
    }

    fn container_width(&self) -> f32 {
        self.container_width
    }

    fn overlay_present(&self) -> bool {
        self.overlay_present
    }
}
