use super::{
    MinimapConfig, ALLY_COLOR, ALLY_SIZE, DEFAULT_MARKER_SIZE, NEUTRAL_COLOR, OBJECTIVE_COLOR,
    OBJECTIVE_SIZE, OBSTACLE_SIZE, WAYPOINT_COLOR, WAYPOINT_SIZE,
};
use crate::color::Rgb;
use crate::markers::{MapMarker, MarkerType};

/// Per-type defaults a map configures for its markers
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefaults {
    pub player_color: Rgb,
    pub player_size: f32,
    pub player_image: String,
    pub enemy_color: Rgb,
    pub enemy_size: f32,
    pub enemy_image: String,
    pub item_color: Rgb,
    pub item_size: f32,
    pub item_image: String,
    pub obstacle_color: Rgb,
}

impl Default for TypeDefaults {
    fn default() -> Self {
        Self::from_config(&MinimapConfig::default())
    }
}

impl TypeDefaults {
    pub fn from_config(config: &MinimapConfig) -> Self {
        Self {
            player_color: config.player_color,
            player_size: config.player_size,
            player_image: config.player_marker_image.clone(),
            enemy_color: config.enemy_color,
            enemy_size: config.enemy_size,
            enemy_image: config.enemy_marker_image.clone(),
            item_color: config.item_color,
            item_size: config.item_size,
            item_image: config.item_marker_image.clone(),
            obstacle_color: config.obstacle_color,
        }
    }
}

/// Fully resolved appearance of one marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: Rgb,
    pub size: f32,
    /// Image to draw instead of a shape
    pub icon: Option<String>,
}

pub fn resolve_color(marker: &MapMarker, defaults: &TypeDefaults) -> Rgb {
    if let Some(color) = marker.custom_color() {
        return color;
    }
    match marker.marker_type() {
        MarkerType::Player => defaults.player_color,
        MarkerType::Enemy => defaults.enemy_color,
        MarkerType::Item => defaults.item_color,
        MarkerType::Obstacle => defaults.obstacle_color,
        MarkerType::Ally => ALLY_COLOR,
        MarkerType::Objective => OBJECTIVE_COLOR,
        MarkerType::Waypoint => WAYPOINT_COLOR,
        MarkerType::Neutral | MarkerType::Custom | MarkerType::Other(_) => NEUTRAL_COLOR,
    }
}

pub fn resolve_size(marker: &MapMarker, defaults: &TypeDefaults) -> f32 {
    if marker.custom_size() > 0.0 {
        return marker.custom_size();
    }
    match marker.marker_type() {
        MarkerType::Player => defaults.player_size,
        MarkerType::Enemy => defaults.enemy_size,
        MarkerType::Item => defaults.item_size,
        MarkerType::Ally => ALLY_SIZE,
        MarkerType::Objective => OBJECTIVE_SIZE,
        MarkerType::Waypoint => WAYPOINT_SIZE,
        MarkerType::Obstacle => OBSTACLE_SIZE,
        MarkerType::Neutral | MarkerType::Custom | MarkerType::Other(_) => DEFAULT_MARKER_SIZE,
    }
}

/// Icon to draw, or `None` to fall back to the type's shape
pub fn resolve_icon(marker: &MapMarker, defaults: &TypeDefaults) -> Option<String> {
    if !marker.custom_icon().is_empty() {
        return Some(marker.custom_icon().to_string());
    }
    let image = match marker.marker_type() {
        MarkerType::Player => &defaults.player_image,
        MarkerType::Enemy => &defaults.enemy_image,
        MarkerType::Item => &defaults.item_image,
        _ => return None,
    };
    (!image.is_empty()).then(|| image.clone())
}

pub fn resolve_style(marker: &MapMarker, defaults: &TypeDefaults) -> MarkerStyle {
    MarkerStyle {
        color: resolve_color(marker, defaults),
        size: resolve_size(marker, defaults),
        icon: resolve_icon(marker, defaults),
    }
}
