pub mod scene;

pub use scene::{Hotspot, Scene, SceneCatalog, builtin_catalog};
