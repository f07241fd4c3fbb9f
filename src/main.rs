use bevy::prelude::*;

mod config;
mod systems;

use systems::camera::OrbitCamPlugin;
use systems::engine::EnginePlugin;
use systems::planet::PlanetPlugin;
use systems::tick::TickPlugin;

fn main() -> bevy::app::AppExit {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "planetview".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(TickPlugin)
        .add_plugins(EnginePlugin)
        .add_plugins(OrbitCamPlugin)
        .add_plugins(PlanetPlugin)
        .run()
}
