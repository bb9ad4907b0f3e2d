use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::geometry::Point;
use crate::session::SceneSummary;

/// Presentation hooks driven by the scene session.
///
/// The engine stays headless; a viewer implements whichever callbacks it
/// cares about and ignores the rest.
pub trait SessionObserver {
    /// A scene change started; any pending found affordances are stale.
    fn scene_loading(&self, _index: usize, _title: &str) {}
    /// The scene asset resolved and should be rendered.
    fn scene_ready(&self, _index: usize, _file: &str) {}
    /// A hotspot entered the found set for the first time.
    fn hotspot_found(&self, _index: usize, _desc: &str) {}
    /// Every click is reported here with its match outcome, found or not.
    fn click_observed(&self, _point: Point, _hit: Option<usize>) {}
    /// The scene was finished and scored.
    fn scene_scored(&self, _summary: &SceneSummary) {}
}

impl fmt::Debug for dyn SessionObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionObserver")
    }
}

/// Ordered transcript of dotted run markers.
///
/// Entries are printed as they are recorded so scripted runs can be asserted
/// from the process output alone; the collected list feeds the JSON event
/// log artifact.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        let entry = entry.into();
        println!("{entry}");
        self.entries.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}
