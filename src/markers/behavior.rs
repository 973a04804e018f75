use super::MarkerType;
use crate::color::{self, Rgb};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Length of one visible or hidden half-cycle while flashing (seconds)
pub const FLASH_INTERVAL: f32 = 0.5;

/// Persisted marker data. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerConfig {
    pub marker_type: MarkerType,
    /// Empty string means "use the type default"
    #[serde(with = "color::optional")]
    pub custom_color: Option<Rgb>,
    /// 0 means "use the type default"
    pub custom_size: f32,
    pub custom_icon: String,
    pub show_rotation: bool,
    pub visible_on_map: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            marker_type: MarkerType::Neutral,
            custom_color: None,
            custom_size: 0.0,
            custom_icon: String::new(),
            show_rotation: false,
            visible_on_map: true,
        }
    }
}

/// Time-bounded blinking state of a marker
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlashState {
    pub active: bool,
    /// Elapsed-simulation time when the flash started (seconds)
    pub start: f32,
    pub duration: f32,
}

impl FlashState {
    pub fn start(&mut self, duration: f32, now: f32) {
        self.active = true;
        self.start = now;
        self.duration = duration;
    }

    /// Visible on even half-cycles, starting visible
    pub fn is_shown(&self, now: f32) -> bool {
        if !self.active {
            return true;
        }
        let elapsed = (now - self.start).max(0.0);
        let cycle = (elapsed / FLASH_INTERVAL).floor() as i64;
        cycle % 2 == 0
    }

    /// Returns true if the flash ended on this tick
    pub fn tick(&mut self, now: f32) -> bool {
        if self.active && now - self.start >= self.duration {
            self.active = false;
            return true;
        }
        false
    }
}

/// Marks an entity as trackable by every map in the world
#[derive(Component, Debug, Clone, PartialEq)]
pub struct MapMarker {
    marker_type: MarkerType,
    custom_color: Option<Rgb>,
    custom_size: f32,
    custom_icon: String,
    show_rotation: bool,
    visible_on_map: bool,
    flash: FlashState,
}

impl Default for MapMarker {
    fn default() -> Self {
        Self::from_config(&MarkerConfig::default())
    }
}

impl MapMarker {
    pub fn new(marker_type: impl Into<MarkerType>) -> Self {
        Self {
            marker_type: marker_type.into(),
            ..default()
        }
    }

    pub fn from_config(config: &MarkerConfig) -> Self {
        Self {
            marker_type: config.marker_type.clone(),
            custom_color: config.custom_color,
            custom_size: config.custom_size.max(0.0),
            custom_icon: config.custom_icon.clone(),
            show_rotation: config.show_rotation,
            visible_on_map: config.visible_on_map,
            flash: FlashState::default(),
        }
    }

    /// Re-apply only the fields that changed between two versions of the data
    pub fn apply_config_change(&mut self, old: &MarkerConfig, new: &MarkerConfig) {
        if old.marker_type != new.marker_type {
            self.marker_type = new.marker_type.clone();
        }
        if old.custom_color != new.custom_color {
            self.custom_color = new.custom_color;
        }
        if old.custom_size != new.custom_size {
            self.set_custom_size(new.custom_size);
        }
        if old.custom_icon != new.custom_icon {
            self.custom_icon = new.custom_icon.clone();
        }
        if old.show_rotation != new.show_rotation {
            self.show_rotation = new.show_rotation;
        }
        if old.visible_on_map != new.visible_on_map {
            self.visible_on_map = new.visible_on_map;
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.custom_color = Some(color);
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.set_custom_size(size);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.custom_icon = icon.into();
        self
    }

    pub fn with_rotation(mut self) -> Self {
        self.show_rotation = true;
        self
    }

    pub fn show_on_map(&mut self) {
        self.visible_on_map = true;
    }

    pub fn hide_on_map(&mut self) {
        self.visible_on_map = false;
    }

    pub fn is_visible_on_map(&self) -> bool {
        self.visible_on_map
    }

    pub fn set_marker_type(&mut self, marker_type: impl Into<MarkerType>) {
        self.marker_type = marker_type.into();
    }

    pub fn marker_type(&self) -> &MarkerType {
        &self.marker_type
    }

    pub fn marker_type_is(&self, name: &str) -> bool {
        self.marker_type.as_str() == name
    }

    pub fn set_custom_color(&mut self, color: Rgb) {
        self.custom_color = Some(color);
    }

    pub fn clear_custom_color(&mut self) {
        self.custom_color = None;
    }

    pub fn custom_color(&self) -> Option<Rgb> {
        self.custom_color
    }

    /// Negative sizes clamp to 0 ("use the type default")
    pub fn set_custom_size(&mut self, size: f32) {
        self.custom_size = size.max(0.0);
    }

    pub fn custom_size(&self) -> f32 {
        self.custom_size
    }

    pub fn set_custom_icon(&mut self, icon: impl Into<String>) {
        self.custom_icon = icon.into();
    }

    pub fn custom_icon(&self) -> &str {
        &self.custom_icon
    }

    pub fn set_show_rotation(&mut self, show: bool) {
        self.show_rotation = show;
    }

    pub fn show_rotation(&self) -> bool {
        self.show_rotation
    }

    /// Start blinking for `duration` seconds. Re-triggering restarts the window.
    pub fn flash(&mut self, duration: f32, now: f32) {
        self.flash.start(duration, now);
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.active
    }

    pub fn should_show_flash(&self, now: f32) -> bool {
        self.flash.is_shown(now)
    }

    pub fn flash_state(&self) -> &FlashState {
        &self.flash
    }

    /// Per-tick hook: expire the flash once its duration has elapsed
    pub fn tick_flash(&mut self, now: f32) -> bool {
        self.flash.tick(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_size_is_never_negative() {
        let mut marker = MapMarker::new(MarkerType::Player);
        marker.set_custom_size(20.0);
        assert_eq!(marker.custom_size(), 20.0);

        marker.set_custom_size(-5.0);
        assert_eq!(marker.custom_size(), 0.0);

        let marker = MapMarker::from_config(&MarkerConfig {
            custom_size: -3.0,
            ..default()
        });
        assert_eq!(marker.custom_size(), 0.0);
    }

    #[test]
    fn test_visibility_and_type() {
        let mut marker = MapMarker::new("Player");
        assert!(marker.is_visible_on_map());

        marker.hide_on_map();
        assert!(!marker.is_visible_on_map());
        marker.show_on_map();
        assert!(marker.is_visible_on_map());

        marker.set_marker_type("Item");
        assert!(marker.marker_type_is("Item"));
        assert!(!marker.marker_type_is("Enemy"));
        assert_eq!(marker.marker_type(), &MarkerType::Item);
    }

    #[test]
    fn test_custom_properties() {
        let mut marker = MapMarker::new(MarkerType::Enemy);
        assert_eq!(marker.custom_color(), None);

        marker.set_custom_color(Rgb::new(255, 0, 0));
        assert_eq!(marker.custom_color(), Some(Rgb::new(255, 0, 0)));
        marker.clear_custom_color();
        assert_eq!(marker.custom_color(), None);

        marker.set_custom_icon("myIcon.png");
        assert_eq!(marker.custom_icon(), "myIcon.png");

        assert!(!marker.show_rotation());
        marker.set_show_rotation(true);
        assert!(marker.show_rotation());
    }

    #[test]
    fn test_flash_cycle() {
        let mut marker = MapMarker::new(MarkerType::Enemy);
        assert!(!marker.is_flashing());
        assert!(marker.should_show_flash(0.0));

        marker.flash(1.0, 0.0);
        assert!(marker.is_flashing());
        assert!(marker.should_show_flash(0.0));
        assert!(marker.should_show_flash(0.49));
        assert!(!marker.should_show_flash(0.6));

        // Still running before the duration elapses
        assert!(!marker.tick_flash(0.9));
        assert!(marker.is_flashing());

        assert!(marker.tick_flash(1.1));
        assert!(!marker.is_flashing());
        assert!(marker.should_show_flash(1.1));
    }

    #[test]
    fn test_flash_retrigger_restarts_window() {
        let mut marker = MapMarker::new(MarkerType::Objective);
        marker.flash(1.0, 0.0);
        marker.flash(1.0, 0.8);

        assert!(!marker.tick_flash(1.5));
        assert!(marker.should_show_flash(0.9)); // first half-cycle of the new window
        assert!(marker.tick_flash(1.9));
    }

    #[test]
    fn test_apply_config_change_only_touches_changed_fields() {
        let old = MarkerConfig {
            marker_type: MarkerType::Enemy,
            custom_size: 10.0,
            ..default()
        };
        let mut marker = MapMarker::from_config(&old);

        // Runtime change that the data reload must not clobber
        marker.hide_on_map();

        let new = MarkerConfig {
            marker_type: MarkerType::Ally,
            custom_size: 10.0,
            custom_color: Some(Rgb::new(1, 2, 3)),
            ..default()
        };
        marker.apply_config_change(&old, &new);

        assert_eq!(marker.marker_type(), &MarkerType::Ally);
        assert_eq!(marker.custom_color(), Some(Rgb::new(1, 2, 3)));
        assert!(!marker.is_visible_on_map());
    }

    #[test]
    fn test_marker_config_defaults_from_partial_json() {
        let config: MarkerConfig =
            serde_json::from_str(r#"{ "markerType": "Player", "customColor": "" }"#).unwrap();
        assert_eq!(config.marker_type, MarkerType::Player);
        assert_eq!(config.custom_color, None);
        assert!(config.visible_on_map);
        assert_eq!(config.custom_icon, "");
    }
}
