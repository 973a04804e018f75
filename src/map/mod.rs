mod bounds;
mod collector;
mod config;
mod constants;
mod minimap;
mod present;
mod projection;
mod render;
mod style;
mod systems;
mod textures;

pub use bounds::*;
pub use collector::*;
pub use config::*;
pub use constants::*;
pub use minimap::*;
pub use present::*;
pub use projection::*;
pub use render::*;
pub use style::*;
pub use systems::*;
pub use textures::*;

use crate::markers::tick_marker_flash;
use bevy::prelude::*;

/// Ordering of the map simulation systems
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MinimapSystems {
    /// Flash timers and the throttled map passes
    Update,
    /// Draw lists turned into UI nodes
    Present,
}

/// Plugin for marker tracking and map draw lists. Needs no renderer.
pub struct MinimapPlugin;

impl Plugin for MinimapPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, MinimapSystems::Present.after(MinimapSystems::Update))
            .add_systems(
                Update,
                (log_new_maps, tick_marker_flash, update_maps)
                    .chain()
                    .in_set(MinimapSystems::Update),
            );
    }
}
