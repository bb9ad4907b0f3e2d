use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// A circular defect region inside a scene image.
///
/// A hotspot has no identifier of its own; its position within the owning
/// scene's hotspot list is its identity, so the list order is part of the
/// format and must never change after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub tag: String,
    pub desc: String,
}

/// One still image with the defects hidden in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub file: String,
    pub title: String,
    pub hotspots: Vec<Hotspot>,
}

impl Scene {
    pub fn hotspot_count(&self) -> usize {
        self.hotspots.len()
    }
}

/// Ordered scene list plus the shared click tolerance margin.
///
/// Loaded once at startup and treated as read-only afterwards. The
/// tolerance margin widens every hotspot's hit radius by the same amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCatalog {
    pub tolerance: f32,
    pub scenes: Vec<Scene>,
}

const BUILTIN_SCENES: &str = include_str!("../data/scenes.json");

/// Loads the scene set that ships with the crate.
pub fn builtin_catalog() -> Result<SceneCatalog> {
    SceneCatalog::from_json_str(BUILTIN_SCENES).context("loading built-in scene catalog")
}

impl SceneCatalog {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let catalog: SceneCatalog =
            serde_json::from_str(input).context("parsing scene catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scene catalog {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("loading scene catalog {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    fn validate(&self) -> Result<()> {
        if self.scenes.is_empty() {
            bail!("scene catalog contains no scenes");
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            bail!("tolerance margin must be finite and >= 0, got {}", self.tolerance);
        }
        for (scene_index, scene) in self.scenes.iter().enumerate() {
            for (hotspot_index, hotspot) in scene.hotspots.iter().enumerate() {
                if !hotspot.r.is_finite() || hotspot.r <= 0.0 {
                    bail!(
                        "scene {} ({}) hotspot {} has invalid radius {}",
                        scene_index,
                        scene.title,
                        hotspot_index,
                        hotspot.r
                    );
                }
                if !hotspot.x.is_finite() || !hotspot.y.is_finite() {
                    bail!(
                        "scene {} ({}) hotspot {} has a non-finite centre",
                        scene_index,
                        scene.title,
                        hotspot_index
                    );
                }
            }
        }
        Ok(())
    }
}
