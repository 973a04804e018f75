use super::MapMarker;
use bevy::prelude::*;

/// Expires finished flashes. Runs every frame, independent of map throttling.
pub fn tick_marker_flash(time: Res<Time>, mut markers: Query<(Entity, &mut MapMarker)>) {
    let now = time.elapsed_secs();
    for (entity, mut marker) in &mut markers {
        if !marker.is_flashing() {
            continue;
        }
        if marker.tick_flash(now) {
            debug!("Marker {:?} stopped flashing", entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerType;
    use std::time::Duration;

    #[test]
    fn test_flash_expires_with_simulation_time() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, tick_marker_flash);

        let mut marker = MapMarker::new(MarkerType::Enemy);
        marker.flash(1.0, 0.0);
        let entity = app.world_mut().spawn(marker).id();

        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(600));
        app.update();
        let marker = app.world().get::<MapMarker>(entity).unwrap();
        assert!(marker.is_flashing());
        assert!(!marker.should_show_flash(0.6));

        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(500));
        app.update();
        let marker = app.world().get::<MapMarker>(entity).unwrap();
        assert!(!marker.is_flashing());
        assert!(marker.should_show_flash(1.1));
    }
}
