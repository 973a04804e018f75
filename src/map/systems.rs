use super::{
    build_draw_list, detect_bounds, HeadingTracker, MapDrawList, Minimap, TrackedEntity,
    TrackedMarkers,
};
use bevy::prelude::*;

/// World rectangle seen by a camera at `center` through a window of
/// `window_size` logical pixels
pub fn viewport_rect(center: Vec2, window_size: Vec2, scale: f32) -> Rect {
    Rect::from_center_size(center, window_size * scale)
}

/// World rectangle currently shown by the 2D camera, or `None` without a camera.
/// Without a window the camera center is used as a zero-size viewport.
pub fn camera_viewport(
    camera_query: &Query<(&GlobalTransform, &Projection), With<Camera2d>>,
    window_query: &Query<&Window>,
) -> Option<Rect> {
    let Ok((camera_transform, projection)) = camera_query.single() else {
        return None;
    };
    let center = camera_transform.translation().truncate();

    let Ok(window) = window_query.single() else {
        return Some(Rect::from_center_size(center, Vec2::ZERO));
    };

    let scale = if let Projection::Orthographic(ref ortho) = projection {
        ortho.scale
    } else {
        1.0
    };

    Some(viewport_rect(center, window.size(), scale))
}

/// Logs every map as it is added to the world
pub fn log_new_maps(maps: Query<(Entity, &Minimap), Added<Minimap>>) {
    for (entity, map) in &maps {
        info!(
            "Map {:?} created: {}x{} {:?} {:?}",
            entity,
            map.width(),
            map.height(),
            map.mode(),
            map.shape()
        );
    }
}

/// Runs the throttled pass of every map: lazy bounds detection, collection
/// and draw list building.
pub fn update_maps(
    time: Res<Time>,
    tracked: TrackedMarkers,
    camera_query: Query<(&GlobalTransform, &Projection), With<Camera2d>>,
    window_query: Query<&Window>,
    mut maps: Query<(Entity, &mut Minimap, &mut MapDrawList, &mut HeadingTracker)>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();
    let viewport = camera_viewport(&camera_query, &window_query);
    let camera_center = viewport.map(|v| v.center()).unwrap_or(Vec2::ZERO);

    // Shared by every map that runs this frame
    let mut collected: Option<Vec<TrackedEntity>> = None;

    for (entity, mut map, mut draw_list, mut headings) in &mut maps {
        if !map.tick(delta) {
            continue;
        }

        if map.needs_bounds_detection() {
            let bounds = detect_bounds(viewport, tracked.marked_rects());
            debug!(
                "Map {:?} bounds detected: ({}, {}) - ({}, {})",
                entity, bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
            );
            if bounds.is_degenerate() {
                warn!("Map {:?} has zero-area bounds; markers collapse to the corner", entity);
            }
            map.set_bounds(bounds);
        }

        if !map.is_visible() {
            continue;
        }

        let entries = collected.get_or_insert_with(|| tracked.collect());
        *draw_list = build_draw_list(&map, entries, &mut headings, now, camera_center);

        #[cfg(feature = "debug_draw_lists")]
        debug!(
            "Map {:?}: {} tracked, {} drawn, {} headings",
            entity,
            entries.len(),
            draw_list.markers.len(),
            headings.len()
        );
    }
}
