use super::MapBounds;
use bevy::prelude::*;

/// Maps world positions to map-local pixels.
///
/// Map-local space has its origin at the map's bottom-left corner and keeps
/// the world's axis directions; the presentation layer flips Y for the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projector {
    /// Pans with `origin` and scales uniformly by `zoom`
    Minimap { origin: Vec2, zoom: f32, center: Vec2 },
    /// Stretches `bounds` over a `size` sized area
    WorldMap { bounds: MapBounds, size: Vec2 },
}

impl Projector {
    pub fn minimap(origin: Vec2, zoom: f32, map_size: Vec2) -> Self {
        Projector::Minimap {
            origin,
            zoom,
            center: map_size / 2.0,
        }
    }

    pub fn world_map(bounds: MapBounds, map_size: Vec2) -> Self {
        Projector::WorldMap {
            bounds,
            size: map_size,
        }
    }

    pub fn world_to_map(&self, world: Vec2) -> Vec2 {
        match *self {
            Projector::Minimap { origin, zoom, center } => center + (world - origin) * zoom,
            Projector::WorldMap { bounds, size } => {
                if bounds.is_degenerate() {
                    return Vec2::ZERO;
                }
                let normalized = Vec2::new(
                    (world.x - bounds.min.x) / bounds.width(),
                    (world.y - bounds.min.y) / bounds.height(),
                );
                normalized * size
            }
        }
    }
}
