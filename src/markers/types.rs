use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a tracked entity. Determines its default color, size and icon.
/// Unknown names are kept verbatim and render with the generic fallback style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerType {
    Player,
    Enemy,
    Ally,
    Item,
    Objective,
    Waypoint,
    Obstacle,
    #[default]
    Neutral,
    Custom,
    Other(String),
}

impl MarkerType {
    pub fn parse(name: &str) -> Self {
        match name {
            "Player" => MarkerType::Player,
            "Enemy" => MarkerType::Enemy,
            "Ally" => MarkerType::Ally,
            "Item" => MarkerType::Item,
            "Objective" => MarkerType::Objective,
            "Waypoint" => MarkerType::Waypoint,
            "Obstacle" => MarkerType::Obstacle,
            "Neutral" => MarkerType::Neutral,
            "Custom" => MarkerType::Custom,
            other => MarkerType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarkerType::Player => "Player",
            MarkerType::Enemy => "Enemy",
            MarkerType::Ally => "Ally",
            MarkerType::Item => "Item",
            MarkerType::Objective => "Objective",
            MarkerType::Waypoint => "Waypoint",
            MarkerType::Obstacle => "Obstacle",
            MarkerType::Neutral => "Neutral",
            MarkerType::Custom => "Custom",
            MarkerType::Other(name) => name,
        }
    }
}

impl From<String> for MarkerType {
    fn from(name: String) -> Self {
        MarkerType::parse(&name)
    }
}

impl From<&str> for MarkerType {
    fn from(name: &str) -> Self {
        MarkerType::parse(name)
    }
}

impl From<MarkerType> for String {
    fn from(marker_type: MarkerType) -> Self {
        marker_type.as_str().to_string()
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// World-space size of a tracked entity, centered on its transform.
/// Used for bounds detection and obstacle footprints.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Footprint(pub Vec2);

impl Footprint {
    pub fn new(width: f32, height: f32) -> Self {
        Self(Vec2::new(width, height))
    }

    /// World rectangle covered by an entity centered at `center`
    pub fn rect_at(&self, center: Vec2) -> Rect {
        Rect::from_center_size(center, self.0.max(Vec2::ZERO))
    }
}

/// Explicit orientation of an entity, in degrees (0 = facing +X).
/// Entities without it get a heading derived from their movement.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Deref, DerefMut)]
pub struct Heading(pub f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_type_names() {
        assert_eq!(MarkerType::parse("Player"), MarkerType::Player);
        assert_eq!(MarkerType::parse("Obstacle"), MarkerType::Obstacle);
        assert_eq!(MarkerType::Waypoint.as_str(), "Waypoint");

        // Names are case sensitive and never rejected
        let unknown = MarkerType::parse("player");
        assert_eq!(unknown, MarkerType::Other("player".to_string()));
        assert_eq!(unknown.to_string(), "player");
    }

    #[test]
    fn test_marker_type_serde_uses_names() {
        let json = serde_json::to_string(&MarkerType::Enemy).unwrap();
        assert_eq!(json, "\"Enemy\"");

        let parsed: MarkerType = serde_json::from_str("\"Boss\"").unwrap();
        assert_eq!(parsed, MarkerType::Other("Boss".to_string()));
    }

    #[test]
    fn test_footprint_rect() {
        let rect = Footprint::new(32.0, 16.0).rect_at(Vec2::new(100.0, 200.0));
        assert_eq!(rect.min, Vec2::new(84.0, 192.0));
        assert_eq!(rect.max, Vec2::new(116.0, 208.0));

        // Negative sizes collapse to a point
        let rect = Footprint::new(-5.0, 4.0).rect_at(Vec2::ZERO);
        assert_eq!(rect.width(), 0.0);
    }
}
