use crate::color::Rgb;

/// Zoom limits for the player-centered projection
pub const ZOOM_MIN: f32 = 0.01;
pub const ZOOM_MAX: f32 = 1.0;
/// Zoom change per zoom_in / zoom_out call
pub const ZOOM_STEP: f32 = 0.05;

/// Smallest size accepted by the legacy uniform `set_size`
pub const MIN_LEGACY_SIZE: f32 = 50.0;
/// Smallest width/height accepted by the dimension setters
pub const MIN_DIMENSION: f32 = 1.0;

/// Padding added around auto-detected bounds (world units)
pub const BOUNDS_PADDING: f32 = 100.0;

/// Map passes per second when the configured rate is not positive
pub const DEFAULT_UPDATE_RATE: f32 = 30.0;

/// Fixed fallback colors for types without a configurable default
pub const ALLY_COLOR: Rgb = Rgb::new(0, 128, 255);
pub const OBJECTIVE_COLOR: Rgb = Rgb::new(255, 215, 0);
pub const WAYPOINT_COLOR: Rgb = Rgb::new(0, 255, 255);
pub const NEUTRAL_COLOR: Rgb = Rgb::WHITE;

/// Fixed fallback sizes (pixels)
pub const ALLY_SIZE: f32 = 10.0;
pub const OBJECTIVE_SIZE: f32 = 10.0;
pub const WAYPOINT_SIZE: f32 = 6.0;
pub const OBSTACLE_SIZE: f32 = 8.0;
pub const DEFAULT_MARKER_SIZE: f32 = 8.0;

/// Color used in place of an icon that failed to load
pub const ICON_FALLBACK_COLOR: Rgb = Rgb::WHITE;

/// Resolution of the generated shape mask textures (pixels per side)
pub const SHAPE_MASK_SIZE: u32 = 64;
