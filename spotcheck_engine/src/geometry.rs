use spotcheck_catalog::Hotspot;

/// A click location in scene-native pixel space.
///
/// Callers own the transform from screen coordinates; everything in here
/// assumes the same space the hotspot centres are declared in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Returns the first hotspot whose padded radius contains the point.
///
/// A hit requires the Euclidean distance to the centre to be at most
/// `r + tolerance`; the boundary itself counts. Hotspots are tried in their
/// stored order, so the earlier declaration wins when two regions overlap.
/// The matcher is stateless: filtering already-found indices is the
/// session's job.
pub fn match_hotspot(point: Point, hotspots: &[Hotspot], tolerance: f32) -> Option<usize> {
    hotspots
        .iter()
        .position(|hotspot| point.distance_to(hotspot.x, hotspot.y) <= hotspot.r + tolerance)
}
