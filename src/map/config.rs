use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// How world positions are placed onto the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Centered on the player, scaled by the zoom factor
    #[default]
    Minimap,
    /// Detected bounds stretched over the whole map area
    WorldMap,
}

/// Outline of the map display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapShape {
    #[default]
    Rectangle,
    Circle,
}

/// Persisted map object configuration.
/// Partial documents are merged against the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MinimapConfig {
    pub width: f32,
    pub height: f32,
    /// Legacy square size; when present it sets both width and height
    pub size: Option<f32>,
    pub zoom: f32,
    pub stay_on_screen: bool,
    pub background_image: String,
    pub frame_image: String,
    pub background_color: Rgb,
    pub background_opacity: f32,
    pub border_color: Rgb,
    pub border_width: f32,
    pub player_marker_image: String,
    pub player_color: Rgb,
    pub player_size: f32,
    pub enemy_marker_image: String,
    pub enemy_color: Rgb,
    pub enemy_size: f32,
    pub item_marker_image: String,
    pub item_color: Rgb,
    pub item_size: f32,
    pub show_obstacles: bool,
    pub obstacle_color: Rgb,
    pub obstacle_opacity: f32,
    pub use_object_shape: bool,
    pub auto_detect_bounds: bool,
    /// Map passes per second
    pub update_rate: f32,
    pub mode: ProjectionMode,
    pub shape: MapShape,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 200.0,
            size: None,
            zoom: 0.1,
            stay_on_screen: true,
            background_image: String::new(),
            frame_image: String::new(),
            background_color: Rgb::BLACK,
            background_opacity: 0.7,
            border_color: Rgb::WHITE,
            border_width: 2.0,
            player_marker_image: String::new(),
            player_color: Rgb::new(0, 255, 0),
            player_size: 12.0,
            enemy_marker_image: String::new(),
            enemy_color: Rgb::new(255, 0, 0),
            enemy_size: 8.0,
            item_marker_image: String::new(),
            item_color: Rgb::new(255, 255, 0),
            item_size: 6.0,
            show_obstacles: true,
            obstacle_color: Rgb::new(128, 128, 128),
            obstacle_opacity: 0.5,
            use_object_shape: true,
            auto_detect_bounds: true,
            update_rate: 30.0,
            mode: ProjectionMode::Minimap,
            shape: MapShape::Rectangle,
        }
    }
}

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid map configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl MinimapConfig {
    /// Parse a JSON document. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Width and height after applying the legacy `size` field
    pub fn dimensions(&self) -> (f32, f32) {
        match self.size {
            Some(size) => (size, size),
            None => (self.width, self.height),
        }
    }

    /// Update rate with non-positive values replaced by the default
    pub fn effective_update_rate(&self) -> f32 {
        if self.update_rate > 0.0 {
            self.update_rate
        } else {
            super::DEFAULT_UPDATE_RATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = MinimapConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MinimapConfig::default());

        let config = MinimapConfig::from_json_str("").unwrap();
        assert_eq!(config.dimensions(), (200.0, 200.0));
    }

    #[test]
    fn test_partial_document_merges_defaults() {
        let config = MinimapConfig::from_json_str(r#"{ "size": 250 }"#).unwrap();
        assert_eq!(config.dimensions(), (250.0, 250.0));
        assert_eq!(config.background_color.to_string(), "0;0;0");
        assert_eq!(config.zoom, 0.1);
        assert_eq!(config.mode, ProjectionMode::Minimap);
    }

    #[test]
    fn test_full_field_names() {
        let config = MinimapConfig::from_json_str(
            r#"{
                "width": 320,
                "height": 180,
                "backgroundColor": "10;20;30",
                "showObstacles": false,
                "mode": "WorldMap",
                "shape": "Circle",
                "updateRate": 0
            }"#,
        )
        .unwrap();
        assert_eq!(config.dimensions(), (320.0, 180.0));
        assert_eq!(config.background_color, Rgb::new(10, 20, 30));
        assert!(!config.show_obstacles);
        assert_eq!(config.mode, ProjectionMode::WorldMap);
        assert_eq!(config.shape, MapShape::Circle);
        assert_eq!(config.effective_update_rate(), 30.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            MinimapConfig::from_json_str("{ width: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = MinimapConfig {
            frame_image: "frame.png".to_string(),
            player_color: Rgb::new(1, 2, 3),
            ..MinimapConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"playerColor\": \"1;2;3\""));
        assert_eq!(MinimapConfig::from_json_str(&json).unwrap(), config);
    }
}
