use super::{
    HeadingTracker, MapBounds, MapDrawList, MapShape, MinimapConfig, ProjectionMode, Projector,
    TrackedEntity, MIN_DIMENSION, MIN_LEGACY_SIZE, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
use crate::color::Rgb;
use crate::markers::MarkerType;
use bevy::prelude::*;

/// Accumulates frame time and lets a map pass through at a fixed rate.
/// Leftover time carries over to the next interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateThrottle {
    interval: f32,
    accumulator: f32,
}

impl UpdateThrottle {
    /// `rate` is in passes per second and must be positive
    pub fn new(rate: f32) -> Self {
        let interval = 1.0 / rate;
        // Primed so the first frame draws immediately
        Self {
            interval,
            accumulator: interval,
        }
    }

    pub fn tick(&mut self, delta: f32) -> bool {
        self.accumulator += delta;
        if self.accumulator < self.interval {
            return false;
        }
        self.accumulator -= self.interval;
        true
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.interval = 1.0 / rate;
    }
}

/// An on-screen minimap or world map. Spawning one is enough for it to be
/// updated; `MinimapRenderPlugin` turns its draw list into UI nodes.
#[derive(Component, Debug, Clone)]
#[require(MapDrawList, HeadingTracker)]
pub struct Minimap {
    config: MinimapConfig,
    visible: bool,
    position: Vec2,
    width: f32,
    height: f32,
    zoom: f32,
    bounds: MapBounds,
    bounds_detected: bool,
    bounds_requested: bool,
    throttle: UpdateThrottle,
}

impl Default for Minimap {
    fn default() -> Self {
        Self::from_config(MinimapConfig::default())
    }
}

impl Minimap {
    pub fn from_config(config: MinimapConfig) -> Self {
        let (width, height) = config.dimensions();
        Self {
            visible: true,
            position: Vec2::ZERO,
            width: width.max(MIN_DIMENSION),
            height: height.max(MIN_DIMENSION),
            zoom: config.zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            bounds: MapBounds::default(),
            bounds_detected: false,
            bounds_requested: false,
            throttle: UpdateThrottle::new(config.effective_update_rate()),
            config,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn config(&self) -> &MinimapConfig {
        &self.config
    }

    /// Re-apply only the fields that differ between two versions of the
    /// persisted data, leaving runtime changes to the others intact.
    pub fn apply_config_change(&mut self, old: &MinimapConfig, new: &MinimapConfig) {
        macro_rules! apply_changed {
            ($($field:ident),* $(,)?) => {
                $(
                    if old.$field != new.$field {
                        self.config.$field = new.$field.clone();
                    }
                )*
            };
        }

        apply_changed!(
            stay_on_screen,
            background_image,
            frame_image,
            background_color,
            background_opacity,
            border_color,
            border_width,
            player_marker_image,
            player_color,
            player_size,
            enemy_marker_image,
            enemy_color,
            enemy_size,
            item_marker_image,
            item_color,
            item_size,
            show_obstacles,
            obstacle_color,
            obstacle_opacity,
            use_object_shape,
            mode,
            shape,
        );

        if old.dimensions() != new.dimensions() {
            let (width, height) = new.dimensions();
            self.set_width(width);
            self.set_height(height);
        }
        if old.zoom != new.zoom {
            self.set_zoom(new.zoom);
        }
        if old.update_rate != new.update_rate {
            self.config.update_rate = new.update_rate;
            self.throttle.set_rate(new.effective_update_rate());
        }
        if old.auto_detect_bounds != new.auto_detect_bounds {
            self.config.auto_detect_bounds = new.auto_detect_bounds;
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom
    }

    /// Screen position (top-left) when staying on screen, else a world position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Legacy square size; sets both dimensions
    pub fn set_size(&mut self, size: f32) {
        let size = size.max(MIN_LEGACY_SIZE);
        self.width = size;
        self.height = size;
    }

    /// Legacy square size, reported as the width
    pub fn size(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width.max(MIN_DIMENSION);
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height.max(MIN_DIMENSION);
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_player_color(&mut self, color: Rgb) {
        self.config.player_color = color;
    }

    pub fn set_enemy_color(&mut self, color: Rgb) {
        self.config.enemy_color = color;
    }

    pub fn set_item_color(&mut self, color: Rgb) {
        self.config.item_color = color;
    }

    pub fn set_obstacle_color(&mut self, color: Rgb) {
        self.config.obstacle_color = color;
    }

    pub fn player_color(&self) -> Rgb {
        self.config.player_color
    }

    pub fn enemy_color(&self) -> Rgb {
        self.config.enemy_color
    }

    pub fn item_color(&self) -> Rgb {
        self.config.item_color
    }

    pub fn obstacle_color(&self) -> Rgb {
        self.config.obstacle_color
    }

    pub fn player_size(&self) -> f32 {
        self.config.player_size
    }

    pub fn enemy_size(&self) -> f32 {
        self.config.enemy_size
    }

    pub fn item_size(&self) -> f32 {
        self.config.item_size
    }

    pub fn player_marker_image(&self) -> &str {
        &self.config.player_marker_image
    }

    pub fn enemy_marker_image(&self) -> &str {
        &self.config.enemy_marker_image
    }

    pub fn item_marker_image(&self) -> &str {
        &self.config.item_marker_image
    }

    pub fn set_background_image(&mut self, name: impl Into<String>) {
        self.config.background_image = name.into();
    }

    pub fn background_image(&self) -> &str {
        &self.config.background_image
    }

    /// An empty name removes the frame
    pub fn set_frame_image(&mut self, name: impl Into<String>) {
        self.config.frame_image = name.into();
    }

    pub fn frame_image(&self) -> &str {
        &self.config.frame_image
    }

    pub fn background_color(&self) -> Rgb {
        self.config.background_color
    }

    pub fn background_opacity(&self) -> f32 {
        self.config.background_opacity
    }

    pub fn border_color(&self) -> Rgb {
        self.config.border_color
    }

    pub fn border_width(&self) -> f32 {
        self.config.border_width
    }

    pub fn set_show_obstacles(&mut self, show: bool) {
        self.config.show_obstacles = show;
    }

    pub fn show_obstacles(&self) -> bool {
        self.config.show_obstacles
    }

    pub fn obstacle_opacity(&self) -> f32 {
        self.config.obstacle_opacity
    }

    pub fn use_object_shape(&self) -> bool {
        self.config.use_object_shape
    }

    pub fn stay_on_screen(&self) -> bool {
        self.config.stay_on_screen
    }

    pub fn auto_detect_bounds(&self) -> bool {
        self.config.auto_detect_bounds
    }

    pub fn update_rate(&self) -> f32 {
        self.config.effective_update_rate()
    }

    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.config.mode = mode;
    }

    pub fn mode(&self) -> ProjectionMode {
        self.config.mode
    }

    pub fn set_shape(&mut self, shape: MapShape) {
        self.config.shape = shape;
    }

    pub fn shape(&self) -> MapShape {
        self.config.shape
    }

    /// Run bounds detection again on the next pass
    pub fn request_bounds_detection(&mut self) {
        self.bounds_requested = true;
    }

    pub fn needs_bounds_detection(&self) -> bool {
        self.bounds_requested || (self.config.auto_detect_bounds && !self.bounds_detected)
    }

    pub fn set_bounds(&mut self, bounds: MapBounds) {
        self.bounds = bounds;
        self.bounds_detected = true;
        self.bounds_requested = false;
    }

    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    pub fn bounds_detected(&self) -> bool {
        self.bounds_detected
    }

    pub fn throttle(&self) -> &UpdateThrottle {
        &self.throttle
    }

    /// Advance the update throttle; true when a pass should run this frame
    pub fn tick(&mut self, delta: f32) -> bool {
        self.throttle.tick(delta)
    }

    /// Projection for the current pass. Minimaps center on the first tracked
    /// player, or on the camera when there is none.
    pub fn projector(&self, tracked: &[TrackedEntity], camera_center: Vec2) -> Projector {
        let size = Vec2::new(self.width, self.height);
        match self.config.mode {
            ProjectionMode::Minimap => {
                let origin = tracked
                    .iter()
                    .find(|t| *t.marker.marker_type() == MarkerType::Player)
                    .map(|t| t.center)
                    .unwrap_or(camera_center);
                Projector::minimap(origin, self.zoom, size)
            }
            ProjectionMode::WorldMap => Projector::world_map(self.bounds, size),
        }
    }
}
