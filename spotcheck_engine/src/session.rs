use std::collections::BTreeSet;
use std::rc::Rc;

use serde::Serialize;
use spotcheck_catalog::{Hotspot, Scene, SceneCatalog};

use crate::events::{EventLog, SessionObserver};
use crate::geometry::{self, Point};

/// Where the active scene is in its load/interact/score cycle.
///
/// Clicks are accepted while still `Loading` because hotspot geometry does
/// not depend on the bitmap; after `Scored` they are reported but no longer
/// change the found set. Any navigation returns to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Loading,
    Ready,
    Scored,
}

/// Outcome of a single click, reported regardless of novelty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickReport {
    /// Index of the hotspot hit, if any.
    pub hit: Option<usize>,
    /// True when the hit added a new entry to the found set.
    pub newly_found: bool,
}

/// Scored snapshot of the active scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub total: usize,
    pub found_count: usize,
    pub missed: Vec<String>,
}

/// Tracks the active scene and which hotspots were already found.
///
/// The session owns all mutable interaction state. Navigation wraps modulo
/// the catalog length, and every scene change starts from an empty found
/// set, so stale indices from a previous scene can never leak in.
#[derive(Debug)]
pub struct SceneSession<'a> {
    catalog: &'a SceneCatalog,
    observer: Rc<dyn SessionObserver>,
    events: EventLog,
    active: usize,
    found: BTreeSet<usize>,
    phase: ScenePhase,
}

impl<'a> SceneSession<'a> {
    pub fn new(
        catalog: &'a SceneCatalog,
        observer: Rc<dyn SessionObserver>,
        events: EventLog,
    ) -> Self {
        Self {
            catalog,
            observer,
            events,
            active: 0,
            found: BTreeSet::new(),
            phase: ScenePhase::Loading,
        }
    }

    /// Activates the scene at `index`, wrapping modulo the catalog length.
    ///
    /// Negative input wraps from the front, so "previous" from the first
    /// scene lands on the last one.
    pub fn load(&mut self, index: i64) {
        let len = self.catalog.len() as i64;
        let wrapped = index.rem_euclid(len) as usize;
        self.active = wrapped;
        self.found.clear();
        self.phase = ScenePhase::Loading;
        let scene = &self.catalog.scenes[wrapped];
        self.events
            .record(format!("scene.load {}/{} {}", wrapped + 1, len, scene.title));
        self.observer.scene_loading(wrapped, &scene.title);
    }

    /// Marks the pending scene rendered once the presentation resolves it.
    pub fn mark_ready(&mut self) {
        if self.phase != ScenePhase::Loading {
            return;
        }
        self.phase = ScenePhase::Ready;
        let scene = &self.catalog.scenes[self.active];
        self.events.record(format!(
            "scene.ready {}/{} {}",
            self.active + 1,
            self.catalog.len(),
            scene.file
        ));
        self.observer.scene_ready(self.active, &scene.file);
    }

    pub fn next(&mut self) {
        self.load(self.active as i64 + 1);
    }

    pub fn prev(&mut self) {
        self.load(self.active as i64 - 1);
    }

    /// Re-shows the same scene with an empty found set.
    pub fn reset(&mut self) {
        self.load(self.active as i64);
    }

    /// Delegates a click to the matcher and tracks first-time finds.
    ///
    /// Re-clicking an already-found hotspot is a harmless no-op; the report
    /// still says which hotspot was hit so debug tooling can trace clicks.
    pub fn register_click(&mut self, point: Point) -> ClickReport {
        let scene = &self.catalog.scenes[self.active];
        let hit = geometry::match_hotspot(point, &scene.hotspots, self.catalog.tolerance);
        let mut newly_found = false;
        if let Some(index) = hit {
            if self.phase != ScenePhase::Scored && self.found.insert(index) {
                newly_found = true;
                let hotspot = &scene.hotspots[index];
                self.events
                    .record(format!("scene.found {} {}", index, hotspot.tag));
                self.observer.hotspot_found(index, &hotspot.desc);
            }
        }
        self.observer.click_observed(point, hit);
        ClickReport { hit, newly_found }
    }

    /// Scored snapshot of the active scene; never marks it finished.
    pub fn summarize(&self) -> SceneSummary {
        let scene = &self.catalog.scenes[self.active];
        let missed = scene
            .hotspots
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.found.contains(index))
            .map(|(_, hotspot)| hotspot.desc.clone())
            .collect();
        SceneSummary {
            total: scene.hotspots.len(),
            found_count: self.found.len(),
            missed,
        }
    }

    /// Freezes the scene and returns the final summary.
    pub fn finish(&mut self) -> SceneSummary {
        let summary = self.summarize();
        self.phase = ScenePhase::Scored;
        self.events.record(format!(
            "scene.finish {}/{} score={}/{}",
            self.active + 1,
            self.catalog.len(),
            summary.found_count,
            summary.total
        ));
        self.observer.scene_scored(&summary);
        summary
    }

    /// Hotspots not yet found, in stored order, for hint affordances.
    pub fn remaining(&self) -> Vec<(usize, &Hotspot)> {
        self.catalog.scenes[self.active]
            .hotspots
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.found.contains(index))
            .collect()
    }

    /// Header label in the "title (Scene i/N)" form.
    pub fn progress_label(&self) -> String {
        format!(
            "{} (Scene {}/{})",
            self.scene().title,
            self.active + 1,
            self.catalog.len()
        )
    }

    pub fn scene(&self) -> &Scene {
        &self.catalog.scenes[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn found_count(&self) -> usize {
        self.found.len()
    }
}
