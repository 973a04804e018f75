use crate::markers::{Footprint, Heading, MapMarker};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// A marked entity as seen by one map pass
#[derive(Debug, Clone, Copy)]
pub struct TrackedEntity<'a> {
    pub entity: Entity,
    pub marker: &'a MapMarker,
    /// World-space center
    pub center: Vec2,
    /// World-space size, zero when the entity has no `Footprint`
    pub footprint: Vec2,
    /// Explicit orientation in degrees, if the entity provides one
    pub heading: Option<f32>,
}

impl TrackedEntity<'_> {
    pub fn rect(&self) -> Rect {
        Footprint(self.footprint).rect_at(self.center)
    }
}

/// Read access to every entity carrying a `MapMarker`
#[derive(SystemParam)]
pub struct TrackedMarkers<'w, 's> {
    markers: Query<
        'w,
        's,
        (
            Entity,
            &'static MapMarker,
            &'static GlobalTransform,
            Option<&'static Footprint>,
            Option<&'static Heading>,
        ),
    >,
}

impl TrackedMarkers<'_, '_> {
    /// Visible-on-map markers, in query order
    pub fn collect(&self) -> Vec<TrackedEntity<'_>> {
        self.markers
            .iter()
            .filter(|(_, marker, ..)| marker.is_visible_on_map())
            .map(|(entity, marker, transform, footprint, heading)| TrackedEntity {
                entity,
                marker,
                center: transform.translation().truncate(),
                footprint: footprint.map(|f| f.0).unwrap_or(Vec2::ZERO),
                heading: heading.map(|h| h.0),
            })
            .collect()
    }

    pub fn tracked_count(&self, marker_type: Option<&str>) -> usize {
        count_of_type(&self.collect(), marker_type)
    }

    /// World rectangles of every marked entity, hidden ones included
    pub fn marked_rects(&self) -> Vec<Rect> {
        self.markers
            .iter()
            .map(|(_, _, transform, footprint, _)| {
                let size = footprint.map(|f| f.0).unwrap_or(Vec2::ZERO);
                Footprint(size).rect_at(transform.translation().truncate())
            })
            .collect()
    }
}

/// Number of tracked entities, optionally restricted to one marker type name
pub fn count_of_type(tracked: &[TrackedEntity], marker_type: Option<&str>) -> usize {
    match marker_type {
        Some(name) => tracked
            .iter()
            .filter(|t| t.marker.marker_type_is(name))
            .count(),
        None => tracked.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerType;
    use bevy::ecs::system::SystemState;

    fn spawn_marker(world: &mut World, marker: MapMarker, position: Vec2) -> Entity {
        world
            .spawn((
                marker,
                Transform::from_xyz(position.x, position.y, 0.0),
                GlobalTransform::from_xyz(position.x, position.y, 0.0),
            ))
            .id()
    }

    #[test]
    fn test_tracked_count_by_type() {
        let mut world = World::new();
        spawn_marker(&mut world, MapMarker::new(MarkerType::Player), Vec2::ZERO);
        spawn_marker(&mut world, MapMarker::new(MarkerType::Enemy), Vec2::new(50.0, 0.0));

        let mut state: SystemState<TrackedMarkers> = SystemState::new(&mut world);
        let tracked = state.get(&world);

        assert_eq!(tracked.tracked_count(Some("Player")), 1);
        assert_eq!(tracked.tracked_count(Some("Enemy")), 1);
        assert_eq!(tracked.tracked_count(Some("Item")), 0);
        assert_eq!(tracked.tracked_count(None), 2);
    }

    #[test]
    fn test_hidden_markers_are_not_collected() {
        let mut world = World::new();
        let mut hidden = MapMarker::new(MarkerType::Enemy);
        hidden.hide_on_map();
        spawn_marker(&mut world, hidden, Vec2::new(10.0, 10.0));
        let visible = spawn_marker(&mut world, MapMarker::new(MarkerType::Item), Vec2::new(-5.0, 3.0));

        // Entities without a marker are ignored
        world.spawn((Transform::default(), GlobalTransform::default()));

        let mut state: SystemState<TrackedMarkers> = SystemState::new(&mut world);
        let tracked = state.get(&world);
        let collected = tracked.collect();

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].entity, visible);
        assert_eq!(collected[0].center, Vec2::new(-5.0, 3.0));
        assert_eq!(collected[0].footprint, Vec2::ZERO);
        assert_eq!(collected[0].heading, None);

        // Bounds detection still sees the hidden one
        assert_eq!(tracked.marked_rects().len(), 2);
    }

    #[test]
    fn test_footprint_and_heading_are_read() {
        let mut world = World::new();
        let entity = world
            .spawn((
                MapMarker::new(MarkerType::Obstacle),
                Footprint::new(40.0, 20.0),
                Heading(45.0),
                Transform::from_xyz(100.0, 50.0, 0.0),
                GlobalTransform::from_xyz(100.0, 50.0, 0.0),
            ))
            .id();

        let mut state: SystemState<TrackedMarkers> = SystemState::new(&mut world);
        let tracked = state.get(&world);
        let collected = tracked.collect();

        assert_eq!(collected[0].entity, entity);
        assert_eq!(collected[0].footprint, Vec2::new(40.0, 20.0));
        assert_eq!(collected[0].heading, Some(45.0));
        assert_eq!(collected[0].rect(), Rect::new(80.0, 40.0, 120.0, 60.0));
        assert_eq!(tracked.marked_rects(), vec![Rect::new(80.0, 40.0, 120.0, 60.0)]);
    }
}
