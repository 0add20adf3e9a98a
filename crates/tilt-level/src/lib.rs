pub mod indicator;
pub mod remap;

pub use indicator::{LevelIndicator, LevelLayout, LevelStatus};
pub use remap::{is_level, remap, VisualTilt, LEVEL_THRESHOLD_DEG};
