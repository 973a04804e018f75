use bevy::{input::mouse::MouseWheel, prelude::*};
use minimap::color::Rgb;
use minimap::map::{MapShape, Minimap, MinimapConfig, MinimapSystems, ProjectionMode, TrackedMarkers};
use minimap::markers::{Footprint, MapMarker, MarkerType};
use minimap::persist::{self, MinimapSnapshot};
use minimap::{MinimapPlugin, MinimapRenderPlugin};
use std::path::PathBuf;

const PLAYER_SPEED: f32 = 200.0; // pixels per second
const FLASH_DURATION: f32 = 3.0;

const SNAPSHOT_PATH: &str = "saves/minimap.bin";

/// The entity moved with WASD
#[derive(Component)]
struct Player;

/// Circles around `origin`
#[derive(Component)]
struct Patrol {
    origin: Vec2,
    radius: f32,
    speed: f32,
}

/// Small corner map
#[derive(Component)]
struct CornerMap;

/// Full-area map toggled with M
#[derive(Component)]
struct WorldMapView;

#[derive(Component)]
struct Hud;

/// Map configuration given on the command line, or the defaults
#[derive(Resource, Default)]
struct DemoConfig(MinimapConfig);

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => MinimapConfig::from_json_file(&path).unwrap_or_else(|e| {
            eprintln!("Failed to read map configuration {}: {}", path, e);
            MinimapConfig::default()
        }),
        None => MinimapConfig::default(),
    };

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins((MinimapPlugin, MinimapRenderPlugin))
        .insert_resource(DemoConfig(config))
        .add_systems(Startup, (setup_world, setup_maps, setup_hud))
        .add_systems(
            Update,
            (
                (move_player, follow_player).chain(),
                patrol,
                map_controls,
                save_or_load_minimap,
            )
                .before(MinimapSystems::Update),
        )
        .add_systems(Update, update_hud.after(MinimapSystems::Update))
        .run();
}

fn setup_world(mut commands: Commands) {
    commands.spawn((Camera2d, Transform::from_xyz(0.0, 0.0, 999.0)));

    commands.spawn((
        Player,
        Sprite::from_color(Color::srgb(0.2, 0.9, 0.2), Vec2::splat(24.0)),
        Transform::from_xyz(0.0, 0.0, 2.0),
        MapMarker::new(MarkerType::Player),
    ));

    // Enemies patrol in circles; their markers can be flashed with F
    for (i, origin) in [Vec2::new(300.0, 200.0), Vec2::new(-450.0, -100.0), Vec2::new(600.0, -400.0)]
        .into_iter()
        .enumerate()
    {
        commands.spawn((
            Patrol {
                origin,
                radius: 80.0 + 40.0 * i as f32,
                speed: 0.6 + 0.3 * i as f32,
            },
            Sprite::from_color(Color::srgb(0.9, 0.2, 0.2), Vec2::splat(20.0)),
            Transform::from_xyz(origin.x, origin.y, 1.0),
            MapMarker::new(MarkerType::Enemy).with_rotation(),
        ));
    }

    for position in [Vec2::new(-200.0, 250.0), Vec2::new(150.0, -300.0), Vec2::new(700.0, 350.0)] {
        commands.spawn((
            Sprite::from_color(Color::srgb(0.95, 0.9, 0.2), Vec2::splat(12.0)),
            Transform::from_xyz(position.x, position.y, 1.0),
            MapMarker::new(MarkerType::Item),
        ));
    }

    for (position, size) in [
        (Vec2::new(-100.0, -250.0), Vec2::new(300.0, 60.0)),
        (Vec2::new(450.0, 0.0), Vec2::new(80.0, 240.0)),
        (Vec2::new(-600.0, 300.0), Vec2::new(160.0, 160.0)),
    ] {
        commands.spawn((
            Sprite::from_color(Color::srgb(0.45, 0.45, 0.45), size),
            Transform::from_xyz(position.x, position.y, 0.5),
            Footprint(size),
            MapMarker::new(MarkerType::Obstacle),
        ));
    }

    commands.spawn((
        Sprite::from_color(Color::srgb(0.2, 0.5, 1.0), Vec2::splat(20.0)),
        Transform::from_xyz(-80.0, 60.0, 1.0),
        MapMarker::new(MarkerType::Ally),
    ));
    commands.spawn((
        Sprite::from_color(Color::srgb(1.0, 0.84, 0.0), Vec2::splat(28.0)),
        Transform::from_xyz(900.0, 600.0, 1.0),
        MapMarker::new(MarkerType::Objective).with_size(14.0),
    ));
    commands.spawn((
        Transform::from_xyz(-900.0, -500.0, 1.0),
        MapMarker::new(MarkerType::Waypoint).with_color(Rgb::new(255, 0, 255)),
    ));

    info!("Demo scene setup complete");
}

fn setup_maps(mut commands: Commands, config: Res<DemoConfig>) {
    commands.spawn((
        CornerMap,
        Minimap::from_config(config.0.clone()).with_position(Vec2::new(10.0, 10.0)),
    ));

    let mut world_map = Minimap::from_config(MinimapConfig {
        width: 480.0,
        height: 320.0,
        mode: ProjectionMode::WorldMap,
        background_opacity: 0.85,
        ..config.0.clone()
    })
    .with_position(Vec2::new(240.0, 120.0));
    world_map.hide();
    commands.spawn((WorldMapView, world_map));
}

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Hud,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.8, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            bottom: Val::Px(10.0),
            ..default()
        },
    ));
}

fn move_player(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut player: Query<&mut Transform, With<Player>>,
) {
    let Ok(mut transform) = player.single_mut() else {
        return;
    };
    let mut direction = Vec2::ZERO;

    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        direction.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }

    let step = direction.normalize_or_zero() * PLAYER_SPEED * time.delta_secs();
    transform.translation += step.extend(0.0);
}

fn follow_player(
    player: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera: Query<&mut Transform, With<Camera2d>>,
) {
    if let (Ok(player), Ok(mut camera)) = (player.single(), camera.single_mut()) {
        camera.translation.x = player.translation.x;
        camera.translation.y = player.translation.y;
    }
}

fn patrol(time: Res<Time>, mut patrols: Query<(&Patrol, &mut Transform)>) {
    let t = time.elapsed_secs();
    for (patrol, mut transform) in &mut patrols {
        let angle = t * patrol.speed;
        let position = patrol.origin + Vec2::new(angle.cos(), angle.sin()) * patrol.radius;
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

/// M: world map, Z/X or scroll: minimap zoom, C: minimap shape,
/// O: obstacles, B: re-detect bounds, F: flash enemies
fn map_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut scroll: MessageReader<MouseWheel>,
    time: Res<Time>,
    mut corner: Query<&mut Minimap, (With<CornerMap>, Without<WorldMapView>)>,
    mut world_map: Query<&mut Minimap, (With<WorldMapView>, Without<CornerMap>)>,
    mut markers: Query<&mut MapMarker>,
) {
    if let Ok(mut map) = world_map.single_mut() {
        if keyboard.just_pressed(KeyCode::KeyM) {
            map.toggle_visibility();
            info!("World map {}", if map.is_visible() { "shown" } else { "hidden" });
        }
        if keyboard.just_pressed(KeyCode::KeyB) {
            map.request_bounds_detection();
        }
    }

    if let Ok(mut map) = corner.single_mut() {
        let scrolled: f32 = scroll.read().map(|event| event.y).sum();
        if keyboard.just_pressed(KeyCode::KeyZ) || scrolled > 0.0 {
            map.zoom_in();
        }
        if keyboard.just_pressed(KeyCode::KeyX) || scrolled < 0.0 {
            map.zoom_out();
        }
        if keyboard.just_pressed(KeyCode::KeyC) {
            let shape = match map.shape() {
                MapShape::Rectangle => MapShape::Circle,
                MapShape::Circle => MapShape::Rectangle,
            };
            map.set_shape(shape);
        }
        if keyboard.just_pressed(KeyCode::KeyO) {
            let show = !map.show_obstacles();
            map.set_show_obstacles(show);
        }
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        let now = time.elapsed_secs();
        for mut marker in &mut markers {
            if *marker.marker_type() == MarkerType::Enemy {
                marker.flash(FLASH_DURATION, now);
            }
        }
    }
}

/// P: save the corner map, L: load it back
fn save_or_load_minimap(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut corner: Query<&mut Minimap, With<CornerMap>>,
) {
    let Ok(mut map) = corner.single_mut() else {
        return;
    };
    let path = PathBuf::from(SNAPSHOT_PATH);

    if keyboard.just_pressed(KeyCode::KeyP) {
        match persist::save_minimap(&MinimapSnapshot::capture(&map), &path) {
            Ok(_) => info!("Saved minimap to {}", path.display()),
            Err(e) => error!("Failed to save minimap: {}", e),
        }
    }

    if keyboard.just_pressed(KeyCode::KeyL) {
        match persist::load_minimap(&path) {
            Ok(snapshot) => {
                *map = snapshot.restore();
                info!("Loaded minimap from {}", path.display());
            }
            Err(e) => warn!("Failed to load minimap: {}", e),
        }
    }
}

fn update_hud(
    tracked: TrackedMarkers,
    corner: Query<&Minimap, With<CornerMap>>,
    mut hud: Query<&mut Text, With<Hud>>,
) {
    let (Ok(map), Ok(mut text)) = (corner.single(), hud.single_mut()) else {
        return;
    };
    text.0 = format!(
        "Tracked: {} (players {}, enemies {}, items {}) | Minimap zoom {:.2}\n\
         WASD move | M world map | Z/X/scroll zoom | C shape | O obstacles | B bounds | F flash | P/L save/load",
        tracked.tracked_count(None),
        tracked.tracked_count(Some("Player")),
        tracked.tracked_count(Some("Enemy")),
        tracked.tracked_count(Some("Item")),
        map.zoom_level(),
    );
}
