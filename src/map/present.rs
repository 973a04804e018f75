use super::{
    icon_fallback, setup_shape_masks, Background, MapDrawList, MapShape, MarkerDraw, MarkerShape,
    Minimap, MinimapSystems, ShapeMasks, TextureCache,
};
use crate::markers::MapMarker;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

/// Plugin that presents map draw lists as UI nodes
pub struct MinimapRenderPlugin;

impl Plugin for MinimapRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TextureCache>()
            .add_systems(Startup, setup_shape_masks)
            .add_systems(
                Update,
                (attach_map_nodes, present_maps)
                    .chain()
                    .in_set(MinimapSystems::Present),
            );
    }
}

/// UI nodes owned by one map entity
#[derive(Component, Debug)]
pub struct MapRenderState {
    background: Entity,
    background_image: Option<String>,
    layer: Entity,
    border: Entity,
    frame: Option<(Entity, String)>,
    /// Tracked entity -> its marker node
    markers: HashMap<Entity, Entity>,
}

impl MapRenderState {
    pub fn marker_node(&self, tracked: Entity) -> Option<Entity> {
        self.markers.get(&tracked).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn background_node(&self) -> Entity {
        self.background
    }

    pub fn frame_node(&self) -> Option<Entity> {
        self.frame.as_ref().map(|(node, _)| *node)
    }
}

fn fill_parent() -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(0.0),
        top: Val::Px(0.0),
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        ..default()
    }
}

fn map_radius(shape: MapShape) -> BorderRadius {
    match shape {
        MapShape::Rectangle => BorderRadius::ZERO,
        MapShape::Circle => BorderRadius::MAX,
    }
}

/// Turns newly spawned maps into UI roots with their fixed child layers
pub fn attach_map_nodes(
    mut commands: Commands,
    maps: Query<(Entity, &Minimap), Without<MapRenderState>>,
) {
    for (entity, map) in &maps {
        let radius = map_radius(map.shape());
        let background = commands
            .spawn((fill_parent(), BackgroundColor(Color::NONE), radius, ZIndex(0)))
            .id();
        let layer = commands.spawn((fill_parent(), ZIndex(1))).id();
        let border = commands
            .spawn((fill_parent(), BorderColor::all(Color::NONE), radius, ZIndex(2)))
            .id();

        commands
            .entity(entity)
            .insert((
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Px(map.width()),
                    height: Val::Px(map.height()),
                    overflow: Overflow::clip(),
                    ..default()
                },
                radius,
                ZIndex(10),
                MapRenderState {
                    background,
                    background_image: None,
                    layer,
                    border,
                    frame: None,
                    markers: HashMap::default(),
                },
            ))
            .add_children(&[background, layer, border]);

        debug!("Attached UI nodes to map {:?}", entity);
    }
}

/// How one marker draw is shown by a UI node
#[derive(Debug, Clone)]
enum MarkerVisual {
    Fill { color: Color, round: bool },
    Image { image: Handle<Image>, color: Color },
}

/// Size of the node box a marker occupies, in map pixels
pub fn marker_extent(shape: &MarkerShape) -> Vec2 {
    match shape {
        MarkerShape::Rect { size, .. } => *size,
        MarkerShape::Circle { size, .. }
        | MarkerShape::Triangle { size, .. }
        | MarkerShape::Star { size, .. }
        | MarkerShape::Icon { size, .. } => Vec2::splat(*size),
    }
}

/// Clockwise rotation of a marker in radians
pub fn marker_rotation_of(shape: &MarkerShape) -> f32 {
    match shape {
        MarkerShape::Triangle { rotation, .. } | MarkerShape::Icon { rotation, .. } => *rotation,
        _ => 0.0,
    }
}

/// Node placement for a marker centered at `position`
pub fn marker_node(position: Vec2, extent: Vec2) -> Node {
    let top_left = position - extent / 2.0;
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(top_left.x),
        top: Val::Px(top_left.y),
        width: Val::Px(extent.x),
        height: Val::Px(extent.y),
        ..default()
    }
}

/// `resolve_icon` returns `None` for icons whose image failed to load
fn marker_visual(
    shape: &MarkerShape,
    masks: &ShapeMasks,
    resolve_icon: &mut impl FnMut(&str) -> Option<Handle<Image>>,
) -> MarkerVisual {
    match shape {
        MarkerShape::Rect { color, opacity, .. } => MarkerVisual::Fill {
            color: color.to_color(*opacity),
            round: false,
        },
        MarkerShape::Circle { color, .. } => MarkerVisual::Fill {
            color: color.to_color(1.0),
            round: true,
        },
        MarkerShape::Triangle { color, .. } => MarkerVisual::Image {
            image: masks.triangle.clone(),
            color: color.to_color(1.0),
        },
        MarkerShape::Star { color, .. } => MarkerVisual::Image {
            image: masks.star.clone(),
            color: color.to_color(1.0),
        },
        MarkerShape::Icon { name, size, .. } => match resolve_icon(name) {
            Some(image) => MarkerVisual::Image {
                image,
                color: Color::WHITE,
            },
            None => marker_visual(&icon_fallback(*size), masks, resolve_icon),
        },
    }
}

fn present_marker(
    commands: &mut Commands,
    node: Entity,
    draw: &MarkerDraw,
    visual: MarkerVisual,
) {
    let shape = &draw.shape;
    let rotation = match visual {
        // Fallback circles never rotate
        MarkerVisual::Fill { .. } => 0.0,
        MarkerVisual::Image { .. } => marker_rotation_of(shape),
    };
    let mut entity = commands.entity(node);
    entity.insert((
        marker_node(draw.position, marker_extent(shape)),
        UiTransform {
            rotation: Rot2::radians(rotation),
            ..default()
        },
        Visibility::Inherited,
    ));

    match visual {
        MarkerVisual::Fill { color, round } => {
            entity
                .insert((
                    BackgroundColor(color),
                    if round { BorderRadius::MAX } else { BorderRadius::ZERO },
                ))
                .remove::<ImageNode>();
        }
        MarkerVisual::Image { image, color } => {
            entity.insert((
                ImageNode {
                    image,
                    color,
                    image_mode: NodeImageMode::Stretch,
                    ..default()
                },
                BackgroundColor(Color::NONE),
                BorderRadius::ZERO,
            ));
        }
    }
}

fn present_background(
    commands: &mut Commands,
    state: &mut MapRenderState,
    background: &Background,
    map: &Minimap,
    textures: &mut TextureCache,
    asset_server: &AssetServer,
) {
    let image = match background {
        Background::Image { name, opacity } => textures
            .resolve(name, asset_server)
            .map(|handle| (name, handle, *opacity)),
        Background::Fill { .. } => None,
    };

    match image {
        Some((name, handle, opacity)) => {
            if state.background_image.as_deref() != Some(name.as_str()) {
                debug!("Map background image set to '{}'", name);
                state.background_image = Some(name.clone());
            }
            commands.entity(state.background).insert((
                ImageNode {
                    image: handle,
                    color: Color::WHITE.with_alpha(opacity),
                    image_mode: NodeImageMode::Stretch,
                    ..default()
                },
                BackgroundColor(Color::NONE),
            ));
        }
        None => {
            // Also the fallback for a background image that failed to load
            let (color, opacity) = match background {
                Background::Fill { color, opacity } => (*color, *opacity),
                Background::Image { opacity, .. } => (map.background_color(), *opacity),
            };
            state.background_image = None;
            commands
                .entity(state.background)
                .insert(BackgroundColor(color.to_color(opacity)))
                .remove::<ImageNode>();
        }
    }
}

fn present_frame(
    commands: &mut Commands,
    root: Entity,
    state: &mut MapRenderState,
    frame: Option<&String>,
    textures: &mut TextureCache,
    asset_server: &AssetServer,
) {
    let resolved = frame.and_then(|name| textures.resolve(name, asset_server).map(|h| (name, h)));

    match (resolved, state.frame.take()) {
        (Some((name, handle)), Some((node, current))) => {
            if current != *name {
                commands.entity(node).insert(ImageNode {
                    image: handle,
                    image_mode: NodeImageMode::Stretch,
                    ..default()
                });
            }
            state.frame = Some((node, name.clone()));
        }
        (Some((name, handle)), None) => {
            let node = commands
                .spawn((
                    fill_parent(),
                    ImageNode {
                        image: handle,
                        image_mode: NodeImageMode::Stretch,
                        ..default()
                    },
                    ZIndex(3),
                    ChildOf(root),
                ))
                .id();
            state.frame = Some((node, name.clone()));
        }
        // Cleared or failed: show nothing
        (None, Some((node, _))) => {
            commands.entity(node).despawn();
        }
        (None, None) => {}
    }
}

fn present_border(commands: &mut Commands, state: &MapRenderState, list: &MapDrawList) {
    let (color, width) = match list.border {
        Some(stroke) => (stroke.color.to_color(1.0), stroke.width),
        None => (Color::NONE, 0.0),
    };
    commands.entity(state.border).insert((
        Node {
            border: UiRect::all(Val::Px(width)),
            ..fill_parent()
        },
        BorderColor::all(color),
        map_radius(list.shape),
    ));
}

/// Top-left screen position of a map root
fn root_position(
    map: &Minimap,
    camera: Option<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    if map.stay_on_screen() {
        return Some(map.position());
    }
    let (camera, camera_transform) = camera?;
    camera
        .world_to_viewport(camera_transform, map.position().extend(0.0))
        .ok()
}

/// Syncs every map's UI nodes with its latest draw list
pub fn present_maps(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut textures: ResMut<TextureCache>,
    masks: Option<Res<ShapeMasks>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut maps: Query<(
        Entity,
        &Minimap,
        Ref<MapDrawList>,
        &mut MapRenderState,
        &mut Node,
        &mut Visibility,
    )>,
    live: Query<(), With<MapMarker>>,
) {
    let Some(masks) = masks else {
        return;
    };
    let camera = camera_query.single().ok();

    for (entity, map, list, mut state, mut root, mut visibility) in &mut maps {
        let shown = if map.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(shown);

        if let Some(position) = root_position(map, camera) {
            root.left = Val::Px(position.x);
            root.top = Val::Px(position.y);
        }
        root.width = Val::Px(map.width());
        root.height = Val::Px(map.height());

        if !list.is_changed() {
            continue;
        }

        let state = &mut *state;
        commands.entity(entity).insert(map_radius(list.shape));
        commands.entity(state.background).insert(map_radius(list.shape));
        present_background(
            &mut commands,
            state,
            &list.background,
            map,
            &mut textures,
            &asset_server,
        );

        let mut drawn = Vec::with_capacity(list.markers.len());
        for draw in &list.markers {
            let node = *state.markers.entry(draw.entity).or_insert_with(|| {
                commands
                    .spawn((Node::default(), ChildOf(state.layer)))
                    .id()
            });
            let visual = marker_visual(&draw.shape, &masks, &mut |name| {
                textures.resolve(name, &asset_server)
            });
            present_marker(&mut commands, node, draw, visual);
            drawn.push(draw.entity);
        }

        // Entities that vanished lose their nodes; the rest are hidden until drawn again
        state.markers.retain(|tracked, node| {
            if live.get(*tracked).is_err() {
                commands.entity(*node).despawn();
                return false;
            }
            if !drawn.contains(tracked) {
                commands.entity(*node).insert(Visibility::Hidden);
            }
            true
        });

        present_border(&mut commands, state, &list);
        present_frame(
            &mut commands,
            entity,
            state,
            list.frame.as_ref(),
            &mut textures,
            &asset_server,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::map::MinimapConfig;
    use crate::markers::MarkerType;
    use std::thread;
    use std::time::Duration;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            AssetPlugin::default(),
            ImagePlugin::default(),
            MinimapRenderPlugin,
        ));
        app.finish();
        app.cleanup();
        app
    }

    fn render_state(app: &App, map: Entity) -> &MapRenderState {
        app.world()
            .get::<MapRenderState>(map)
            .expect("map should have UI nodes")
    }

    fn redraw(app: &mut App, map: Entity) {
        app.world_mut()
            .get_mut::<MapDrawList>(map)
            .expect("map should have a draw list")
            .set_changed();
        app.update();
    }

    /// Redraws until the image behind `name` has failed to load
    fn redraw_until_failed(app: &mut App, map: Entity, name: &str) {
        for _ in 0..500 {
            redraw(app, map);
            if app.world().resource::<TextureCache>().is_failed(name) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("'{}' never failed to load", name);
    }

    fn circle(entity: Entity, position: Vec2) -> MarkerDraw {
        MarkerDraw {
            entity,
            position,
            shape: MarkerShape::Circle {
                size: 10.0,
                color: Rgb::WHITE,
            },
        }
    }

    #[test]
    fn test_missing_icon_visual_is_white_circle() {
        let masks = ShapeMasks {
            triangle: Handle::default(),
            star: Handle::default(),
            circle: Handle::default(),
        };
        let icon = MarkerShape::Icon {
            name: "missing.png".to_string(),
            size: 9.0,
            rotation: 1.0,
        };

        let visual = marker_visual(&icon, &masks, &mut |_| None);
        assert!(matches!(
            visual,
            MarkerVisual::Fill { color, round: true } if color == Rgb::WHITE.to_color(1.0)
        ));

        let visual = marker_visual(&icon, &masks, &mut |_| Some(Handle::default()));
        assert!(matches!(visual, MarkerVisual::Image { color, .. } if color == Color::WHITE));
    }

    #[test]
    fn test_failed_background_falls_back_to_fill() {
        let mut app = app();
        let map = app
            .world_mut()
            .spawn((
                Minimap::from_config(MinimapConfig {
                    background_color: Rgb::new(10, 20, 30),
                    ..default()
                }),
                MapDrawList {
                    background: Background::Image {
                        name: "missing_background.png".to_string(),
                        opacity: 0.8,
                    },
                    ..default()
                },
            ))
            .id();

        app.update();
        let background = render_state(&app, map).background_node();
        assert!(app.world().get::<ImageNode>(background).is_some());

        redraw_until_failed(&mut app, map, "missing_background.png");
        assert!(app.world().get::<ImageNode>(background).is_none());
        assert_eq!(
            app.world().get::<BackgroundColor>(background).map(|c| c.0),
            Some(Rgb::new(10, 20, 30).to_color(0.8))
        );
    }

    #[test]
    fn test_failed_frame_shows_nothing() {
        let mut app = app();
        let map = app
            .world_mut()
            .spawn((
                Minimap::default(),
                MapDrawList {
                    frame: Some("missing_frame.png".to_string()),
                    ..default()
                },
            ))
            .id();

        app.update();
        let frame = render_state(&app, map)
            .frame_node()
            .expect("frame node while loading");

        redraw_until_failed(&mut app, map, "missing_frame.png");
        assert_eq!(render_state(&app, map).frame_node(), None);
        assert!(app.world().get_entity(frame).is_err());
    }

    #[test]
    fn test_failed_icon_draws_white_circle() {
        let mut app = app();
        let tracked = app.world_mut().spawn(MapMarker::new(MarkerType::Enemy)).id();
        let map = app
            .world_mut()
            .spawn((
                Minimap::default(),
                MapDrawList {
                    markers: vec![MarkerDraw {
                        entity: tracked,
                        position: Vec2::new(50.0, 60.0),
                        shape: MarkerShape::Icon {
                            name: "missing_icon.png".to_string(),
                            size: 9.0,
                            rotation: 1.0,
                        },
                    }],
                    ..default()
                },
            ))
            .id();

        redraw_until_failed(&mut app, map, "missing_icon.png");
        let node = render_state(&app, map)
            .marker_node(tracked)
            .expect("marker node");
        let world = app.world();
        assert!(world.get::<ImageNode>(node).is_none());
        assert_eq!(
            world.get::<BackgroundColor>(node).map(|c| c.0),
            Some(Rgb::WHITE.to_color(1.0))
        );
        assert_eq!(world.get::<BorderRadius>(node), Some(&BorderRadius::MAX));
        assert_eq!(
            world.get::<UiTransform>(node).map(|t| t.rotation),
            Some(Rot2::IDENTITY)
        );
    }

    #[test]
    fn test_marker_nodes_are_reused_and_pruned() {
        let mut app = app();
        let a = app.world_mut().spawn(MapMarker::new(MarkerType::Enemy)).id();
        let b = app.world_mut().spawn(MapMarker::new(MarkerType::Item)).id();
        let map = app
            .world_mut()
            .spawn((
                Minimap::default(),
                MapDrawList {
                    markers: vec![circle(a, Vec2::new(20.0, 20.0)), circle(b, Vec2::new(40.0, 40.0))],
                    ..default()
                },
            ))
            .id();

        app.update();
        let state = render_state(&app, map);
        assert_eq!(state.marker_count(), 2);
        let node_a = state.marker_node(a).expect("node for a");
        let node_b = state.marker_node(b).expect("node for b");

        // a moves, b is no longer drawn
        app.world_mut()
            .get_mut::<MapDrawList>(map)
            .expect("draw list")
            .markers = vec![circle(a, Vec2::new(30.0, 20.0))];
        app.update();
        assert_eq!(render_state(&app, map).marker_node(a), Some(node_a));
        assert_eq!(app.world().get::<Node>(node_a).map(|n| n.left), Some(Val::Px(25.0)));
        assert_eq!(app.world().get::<Visibility>(node_b), Some(&Visibility::Hidden));

        // b is destroyed
        app.world_mut().despawn(b);
        redraw(&mut app, map);
        let state = render_state(&app, map);
        assert_eq!(state.marker_count(), 1);
        assert_eq!(state.marker_node(b), None);
        assert!(app.world().get_entity(node_b).is_err());
        assert!(app.world().get_entity(node_a).is_ok());
    }

    #[test]
    fn test_cleared_frame_is_despawned() {
        let mut app = app();
        let map = app
            .world_mut()
            .spawn((
                Minimap::default(),
                MapDrawList {
                    frame: Some("frame.png".to_string()),
                    ..default()
                },
            ))
            .id();

        app.update();
        let frame = render_state(&app, map).frame_node().expect("frame node");

        app.world_mut()
            .get_mut::<MapDrawList>(map)
            .expect("draw list")
            .frame = None;
        app.update();
        assert_eq!(render_state(&app, map).frame_node(), None);
        assert!(app.world().get_entity(frame).is_err());
    }

    #[test]
    fn test_marker_extent() {
        let rect = MarkerShape::Rect {
            size: Vec2::new(10.0, 4.0),
            color: Rgb::WHITE,
            opacity: 0.5,
        };
        assert_eq!(marker_extent(&rect), Vec2::new(10.0, 4.0));

        let icon = MarkerShape::Icon {
            name: "a.png".to_string(),
            size: 12.0,
            rotation: 1.0,
        };
        assert_eq!(marker_extent(&icon), Vec2::splat(12.0));
        assert_eq!(marker_rotation_of(&icon), 1.0);
        assert_eq!(
            marker_rotation_of(&MarkerShape::Star {
                size: 4.0,
                color: Rgb::WHITE
            }),
            0.0
        );
    }

    #[test]
    fn test_marker_node_is_centered() {
        let node = marker_node(Vec2::new(100.0, 50.0), Vec2::new(10.0, 4.0));
        assert_eq!(node.position_type, PositionType::Absolute);
        assert_eq!(node.left, Val::Px(95.0));
        assert_eq!(node.top, Val::Px(48.0));
        assert_eq!(node.width, Val::Px(10.0));
        assert_eq!(node.height, Val::Px(4.0));
    }

    #[test]
    fn test_screen_anchored_root_position() {
        let map = Minimap::default().with_position(Vec2::new(20.0, 30.0));
        assert_eq!(root_position(&map, None), Some(Vec2::new(20.0, 30.0)));

        let world_anchored = Minimap::from_config(MinimapConfig {
            stay_on_screen: false,
            ..default()
        });
        assert_eq!(root_position(&world_anchored, None), None);
    }
}
