//! engine.rs
//!
//! Owns the render context: camera, light, clear color, and viewport layout.
//! The repaint loop itself belongs to bevy's runner, which publishes a tick
//! and renders every frame until app exit; this module wires the per-frame
//! state that loop renders.

use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::config::{
    CAMERA_FAR, CAMERA_FOV, CAMERA_NEAR, CAMERA_POSITION, CAMERA_ROTATE_SPEED, LIGHT_INTENSITY,
    LIGHT_POSITION, LIGHT_RANGE,
};
use crate::systems::camera::OrbitCamera;

pub struct EnginePlugin;

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .init_resource::<RenderContext>()
            .add_systems(Startup, initialize)
            .add_systems(Update, update_layout);
    }
}

/// Viewport state mirrored from the window.
/// Created once at startup, mutated in place on resize, never recreated.
#[derive(Resource, Debug)]
pub struct RenderContext {
    pub width: f32,
    pub height: f32,
    pub aspect: f32,
}

impl Default for RenderContext {
    fn default() -> Self {
        // placeholder until the first resize event arrives
        Self {
            width: 1.0,
            height: 1.0,
            aspect: 1.0,
        }
    }
}

/// Aspect ratio for a viewport. A zero-height window (minimized) falls back
/// to a square ratio instead of going NaN.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if height <= 0.0 { 1.0 } else { width / height }
}

fn initialize(mut commands: Commands) {
    // perspective camera at a fixed start, looking at the scene origin
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::new(CAMERA_POSITION.length(), CAMERA_ROTATE_SPEED).with_target(Vec3::ZERO),
    ));

    // single white point light off to the side of the camera
    commands.spawn((
        PointLight {
            color: Color::WHITE,
            intensity: LIGHT_INTENSITY,
            range: LIGHT_RANGE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(LIGHT_POSITION),
    ));

    info!("render context initialized");
}

/// Mirror window size changes into the render context and the camera
/// projection. Idempotent for unchanged dimensions.
pub fn update_layout(
    mut resize_events: EventReader<WindowResized>,
    mut context: ResMut<RenderContext>,
    mut camera_query: Query<&mut Projection, With<Camera3d>>,
) {
    for resized in resize_events.read() {
        context.width = resized.width;
        context.height = resized.height;
        context.aspect = aspect_ratio(resized.width, resized.height);

        for mut projection in camera_query.iter_mut() {
            if let Projection::Perspective(perspective) = projection.as_mut() {
                perspective.aspect_ratio = context.aspect;
            }
        }
    }
}
