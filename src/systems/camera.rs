use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use crate::config::{CAMERA_MAX_RADIUS, CAMERA_MIN_RADIUS, CAMERA_ROTATE_SPEED};

pub struct OrbitCamPlugin;

impl Plugin for OrbitCamPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update);
    }
}

// orbit controls: drag to rotate around the target, scroll to zoom, no pan
#[derive(Component, Debug)]
pub struct OrbitCamera {
    pub radius: f32,
    pub speed: f32,
    pub angle: f32,
    pub v_angle: f32,
    pub is_dragging: bool,
    pub target: Vec3,

    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 110.0,
            speed: CAMERA_ROTATE_SPEED,
            // start on the +Z axis, matching the camera spawn position
            angle: std::f32::consts::FRAC_PI_2,
            v_angle: 0.0,
            is_dragging: false,
            target: Vec3::ZERO,

            min_radius: CAMERA_MIN_RADIUS,
            max_radius: CAMERA_MAX_RADIUS,
        }
    }
}

impl OrbitCamera {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            ..default()
        }
    }

    // set the point the camera orbits
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn with_zoom_limits(mut self, min_radius: f32, max_radius: f32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    // world position from spherical coordinates
    // https://en.wikipedia.org/wiki/Spherical_coordinate_system#Cartesian_coordinates
    pub fn calculate_position(&self) -> Vec3 {
        let x = self.radius * self.v_angle.cos() * self.angle.cos();
        let y = self.radius * self.v_angle.sin();
        let z = self.radius * self.v_angle.cos() * self.angle.sin();

        self.target + Vec3::new(x, y, z)
    }
}

fn update(
    mut camera_query: Query<(&mut Transform, &mut OrbitCamera)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<CursorMoved>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    for (mut transform, mut camera) in camera_query.iter_mut() {
        // handle mouse drag
        if mouse_buttons.just_pressed(MouseButton::Left) {
            camera.is_dragging = true;
        }
        if mouse_buttons.just_released(MouseButton::Left) {
            camera.is_dragging = false;
        }

        // update camera angles
        if camera.is_dragging {
            for motion in mouse_motion.read() {
                if let Some(delta) = motion.delta {
                    camera.angle += delta.x * camera.speed * 0.01;
                    camera.v_angle += delta.y * camera.speed * 0.01;
                }
                // clamp pitch
                camera.v_angle = camera.v_angle.clamp(-1.5, 1.5);
            }
        }

        // handle mouse scroll
        for scroll in scroll_events.read() {
            camera.radius -= scroll.y * 8.0;
            camera.radius = camera.radius.clamp(camera.min_radius, camera.max_radius);
        }

        // update camera position/orientation
        transform.translation = camera.calculate_position();
        transform.look_at(camera.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orbit_matches_the_camera_spawn_position() {
        let camera = OrbitCamera::default();
        let position = camera.calculate_position();

        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 110.0), 1e-4));
    }

    #[test]
    fn orbit_position_stays_on_the_configured_radius() {
        let camera = OrbitCamera {
            angle: 1.3,
            v_angle: 0.4,
            ..OrbitCamera::new(200.0, CAMERA_ROTATE_SPEED)
        };

        let position = camera.calculate_position();
        assert!((position.length() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn orbit_follows_a_moved_target() {
        let target = Vec3::new(10.0, -5.0, 3.0);
        let camera = OrbitCamera::new(50.0, CAMERA_ROTATE_SPEED).with_target(target);

        let position = camera.calculate_position();
        assert!(((position - target).length() - 50.0).abs() < 1e-3);
    }
}
