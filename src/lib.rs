//! Map markers for Bevy: entities tagged with a `MapMarker` are tracked by
//! every `Minimap` in the world and drawn onto it, either centered on the
//! player or stretched over the detected world bounds.

pub mod color;
pub mod map;
pub mod markers;
pub mod persist;

pub use map::{MinimapPlugin, MinimapRenderPlugin};
