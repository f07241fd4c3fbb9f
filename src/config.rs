use bevy::math::Vec3;

// Body measurements (scene units)
pub const PLANET_RADIUS: f32 = 50.0;
pub const CLOUD_RADIUS: f32 = 50.1; // slightly enlarged so the shell wraps the surface
pub const SHELL_SEGMENTS: usize = 100;

// Rotation speeds (radians per second)
pub const PLANET_ROTATION_SPEED: f32 = 0.1;

// Cloud layer
pub const CLOUD_OPACITY: f32 = 0.9;

// Asset paths
pub const PLANET_TEXTURE: &str = "textures/planet.jpg";
pub const CLOUD_TEXTURE: &str = "textures/clouds.png";
pub const SATELLITE_SCENE: &str = "models/satellite.gltf";

// Satellite placement
pub const SATELLITE_POSITION: Vec3 = Vec3::new(-20.0, 5.0, 80.0);
pub const SATELLITE_ROTATION: Vec3 = Vec3::new(-0.2, 1.4, 0.0);

// Camera
pub const CAMERA_FOV: f32 = std::f32::consts::PI / 3.0; // 60 degrees vertical
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 500.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 110.0);
pub const CAMERA_ROTATE_SPEED: f32 = 0.7;
pub const CAMERA_MIN_RADIUS: f32 = 60.0;
pub const CAMERA_MAX_RADIUS: f32 = 400.0;

// Light
pub const LIGHT_POSITION: Vec3 = Vec3::new(100.0, 0.0, 130.0);
pub const LIGHT_INTENSITY: f32 = 150_000_000.0; // lumens, scaled for the ~100 unit scene
pub const LIGHT_RANGE: f32 = 1_000.0;
