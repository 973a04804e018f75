use super::BOUNDS_PADDING;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// World-space rectangle covered by a map in WorldMap mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl MapBounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            min: rect.min,
            max: rect.max,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// True when the rectangle cannot be used for normalization
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// Compute the region a map should cover: the viewport expanded to enclose
/// every marked entity, then padded on all sides.
///
/// A union with zero area is returned unpadded so that the projector's
/// zero-area guard applies to it.
pub fn detect_bounds(viewport: Option<Rect>, marked: impl IntoIterator<Item = Rect>) -> MapBounds {
    let union = marked
        .into_iter()
        .fold(viewport, |acc, rect| match acc {
            Some(acc) => Some(acc.union(rect)),
            None => Some(rect),
        });

    let Some(union) = union else {
        return MapBounds::default();
    };

    if union.width() <= 0.0 || union.height() <= 0.0 {
        return MapBounds::from_rect(union);
    }

    MapBounds::from_rect(union.inflate(BOUNDS_PADDING))
}
