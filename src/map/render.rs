use super::{resolve_style, MapShape, Minimap, TrackedEntity, TypeDefaults, ICON_FALLBACK_COLOR};
use crate::color::Rgb;
use crate::markers::MarkerType;
use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI};

/// What fills the map area behind the markers
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Image { name: String, opacity: f32 },
    Fill { color: Rgb, opacity: f32 },
}

/// Geometry of one drawn marker. Sizes are in map pixels, rotations in
/// radians, clockwise in top-left UI space.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerShape {
    /// Obstacle footprint
    Rect { size: Vec2, color: Rgb, opacity: f32 },
    Circle { size: f32, color: Rgb },
    Triangle { size: f32, color: Rgb, rotation: f32 },
    Star { size: f32, color: Rgb },
    Icon { name: String, size: f32, rotation: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDraw {
    pub entity: Entity,
    /// Center in map-local UI space (origin top-left, Y down)
    pub position: Vec2,
    pub shape: MarkerShape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeRect {
    pub color: Rgb,
    pub width: f32,
}

/// Everything one map pass decided to draw, back to front
#[derive(Component, Debug, Clone, PartialEq)]
pub struct MapDrawList {
    pub size: Vec2,
    pub shape: MapShape,
    pub background: Background,
    pub markers: Vec<MarkerDraw>,
    pub border: Option<StrokeRect>,
    pub frame: Option<String>,
}

impl Default for MapDrawList {
    fn default() -> Self {
        Self {
            size: Vec2::ZERO,
            shape: MapShape::Rectangle,
            background: Background::Fill {
                color: Rgb::BLACK,
                opacity: 0.0,
            },
            markers: Vec::new(),
            border: None,
            frame: None,
        }
    }
}

impl MapDrawList {
    pub fn marker_for(&self, entity: Entity) -> Option<&MarkerDraw> {
        self.markers.iter().find(|m| m.entity == entity)
    }
}

#[derive(Debug, Clone, Copy)]
struct HeadingEntry {
    position: Vec2,
    heading: f32,
}

/// Per-entity movement memory used to orient markers of entities that do
/// not carry a `Heading`. Headings are degrees, counter-clockwise from +X.
#[derive(Component, Debug, Default, Clone)]
pub struct HeadingTracker {
    entries: HashMap<Entity, HeadingEntry>,
}

impl HeadingTracker {
    /// Record this pass's position and return the entity's heading.
    /// Zero displacement keeps the previous heading.
    pub fn observe(&mut self, entity: Entity, position: Vec2, explicit: Option<f32>) -> f32 {
        let entry = self.entries.entry(entity).or_insert(HeadingEntry {
            position,
            heading: 0.0,
        });

        if let Some(heading) = explicit {
            entry.heading = heading;
        } else {
            let delta = position - entry.position;
            if delta != Vec2::ZERO {
                entry.heading = delta.y.atan2(delta.x).to_degrees();
            }
        }
        entry.position = position;
        entry.heading
    }

    pub fn heading(&self, entity: Entity) -> Option<f32> {
        self.entries.get(&entity).map(|e| e.heading)
    }

    /// Forget entities that were not part of the latest pass
    pub fn retain(&mut self, seen: &HashSet<Entity>) {
        self.entries.retain(|entity, _| seen.contains(entity));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Marker rotation for a world heading: the heading as seen on screen
/// (Y flipped) plus a quarter turn, since shapes point up at rest.
pub fn marker_rotation(heading_degrees: f32) -> f32 {
    (-heading_degrees + 90.0).to_radians()
}

/// Triangle of height `size` and base `size * 0.8`, pointing up, centered
/// on the origin (Y down).
pub fn triangle_points(size: f32) -> [Vec2; 3] {
    let half = size / 2.0;
    let half_base = size * 0.4;
    [
        Vec2::new(0.0, -half),
        Vec2::new(half_base, half),
        Vec2::new(-half_base, half),
    ]
}

/// Five-point star with its first point up (Y down)
pub fn star_points(size: f32) -> [Vec2; 10] {
    let outer = size / 2.0;
    let inner = size / 4.0;
    std::array::from_fn(|i| {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = -FRAC_PI_2 + i as f32 * PI / 5.0;
        Vec2::new(angle.cos(), angle.sin()) * radius
    })
}

/// Drawn in place of an icon whose image could not be loaded
pub fn icon_fallback(size: f32) -> MarkerShape {
    MarkerShape::Circle {
        size,
        color: ICON_FALLBACK_COLOR,
    }
}

fn inside_ellipse(point: Vec2, size: Vec2) -> bool {
    let radii = size / 2.0;
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    let d = (point - radii) / radii;
    d.length_squared() <= 1.0
}

/// Build the draw list for one map pass.
///
/// `tracked` must be the visible markers in collection order. Every tracked
/// entity updates `headings`, drawn or not.
pub fn build_draw_list(
    map: &Minimap,
    tracked: &[TrackedEntity],
    headings: &mut HeadingTracker,
    now: f32,
    camera_center: Vec2,
) -> MapDrawList {
    let config = map.config();
    let size = Vec2::new(map.width(), map.height());
    let projector = map.projector(tracked, camera_center);
    let defaults = TypeDefaults::from_config(config);

    let background = if config.background_image.is_empty() {
        Background::Fill {
            color: config.background_color,
            opacity: config.background_opacity,
        }
    } else {
        Background::Image {
            name: config.background_image.clone(),
            opacity: config.background_opacity,
        }
    };

    let mut markers = Vec::with_capacity(tracked.len());
    let mut seen = HashSet::default();

    for entry in tracked {
        seen.insert(entry.entity);
        let observed = headings.observe(entry.entity, entry.center, entry.heading);
        let marker = entry.marker;
        // Markers without rotation always face up
        let heading = if marker.show_rotation() { observed } else { 0.0 };

        if !marker.should_show_flash(now) {
            continue;
        }

        let is_obstacle = *marker.marker_type() == MarkerType::Obstacle;
        if is_obstacle && !config.show_obstacles {
            continue;
        }

        let local = projector.world_to_map(entry.center);
        if map.shape() == MapShape::Circle && !inside_ellipse(local, size) {
            continue;
        }
        let position = Vec2::new(local.x, size.y - local.y);
        let style = resolve_style(marker, &defaults);

        let shape = if is_obstacle && config.use_object_shape {
            MarkerShape::Rect {
                size: entry.footprint * map.zoom_level(),
                color: style.color,
                opacity: config.obstacle_opacity,
            }
        } else if let Some(name) = style.icon {
            MarkerShape::Icon {
                name,
                size: style.size,
                rotation: if marker.show_rotation() {
                    marker_rotation(heading)
                } else {
                    0.0
                },
            }
        } else {
            match marker.marker_type() {
                MarkerType::Player => MarkerShape::Triangle {
                    size: style.size,
                    color: style.color,
                    rotation: marker_rotation(heading),
                },
                MarkerType::Item => MarkerShape::Star {
                    size: style.size,
                    color: style.color,
                },
                _ => MarkerShape::Circle {
                    size: style.size,
                    color: style.color,
                },
            }
        };

        markers.push(MarkerDraw {
            entity: entry.entity,
            position,
            shape,
        });
    }

    headings.retain(&seen);

    MapDrawList {
        size,
        shape: map.shape(),
        background,
        markers,
        border: (config.border_width > 0.0).then_some(StrokeRect {
            color: config.border_color,
            width: config.border_width,
        }),
        frame: (!config.frame_image.is_empty()).then(|| config.frame_image.clone()),
    }
}
