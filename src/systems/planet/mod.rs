//! The celestial body builder: loads every configured layer texture plus the
//! optional sub-model, then attaches them under one composite root entity.
//! All-or-nothing: nothing reaches the scene until every load has resolved,
//! and a single failure aborts the whole build.

use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::scene::SceneRoot;

use std::sync::{Arc, Mutex};
use std::time::Instant;

pub mod layers;

use crate::config::PLANET_ROTATION_SPEED;
use crate::systems::assets::{LoadBatch, LoadError, server_progress};
use crate::systems::tick::TickBroadcaster;
use layers::{BodySpec, shell_material, shell_mesh};

pub struct PlanetPlugin;

impl Plugin for PlanetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BodySpec>()
            .add_systems(Startup, (begin_build, connect_spin))
            .add_systems(
                Update,
                (
                    finish_build.run_if(resource_exists::<PendingBuild>),
                    apply_spin
                        .run_if(resource_exists::<BodySpin>)
                        .after(crate::systems::tick::publish),
                ),
            );
    }
}

// composite root tag
#[derive(Component)]
pub struct CelestialBody;

// surface shell tag, the layer the spin follows
#[derive(Component)]
pub struct Planet;

// translucent shell tag, counter-rotated against the surface
#[derive(Component)]
pub struct Clouds;

// sub-model tag
#[derive(Component)]
pub struct SatelliteModel;

/// Attach position of a shell within the composite, in spec order.
#[derive(Component, Debug, PartialEq, Eq)]
pub struct BodyLayer(pub usize);

// in-flight build: every queued load plus the typed handles to hand over
// to the mesh/material constructors once the batch resolves
#[derive(Resource)]
struct PendingBuild {
    batch: LoadBatch,
    textures: Vec<Handle<Image>>,
    model: Option<Handle<Scene>>,
}

/// Outcome of the build, for whoever bootstrapped it to inspect.
#[derive(Resource, Debug)]
pub enum BuildResult {
    Ready(Entity),
    Failed(LoadError),
}

// issue one load per layer, in spec order, then the sub-model
fn begin_build(spec: Res<BodySpec>, asset_server: Res<AssetServer>, mut commands: Commands) {
    let mut batch = LoadBatch::new();
    let mut textures = Vec::with_capacity(spec.layers.len());

    for layer in &spec.layers {
        let handle: Handle<Image> = asset_server.load(layer.texture.as_str());
        batch.push(layer.texture.as_str(), handle.clone().untyped());
        textures.push(handle);
    }

    let model = spec.model.as_ref().map(|model| {
        let handle: Handle<Scene> =
            asset_server.load(GltfAssetLabel::Scene(0).from_asset(model.scene.clone()));
        batch.push(model.scene.as_str(), handle.clone().untyped());
        handle
    });

    info!("loading {} assets for the celestial body", batch.len());
    commands.insert_resource(PendingBuild {
        batch,
        textures,
        model,
    });
}

// poll the batch; spawn the composite once everything is in, abort on the
// first failure
fn finish_build(
    pending: Res<PendingBuild>,
    spec: Res<BodySpec>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    match pending.batch.poll(|load| server_progress(&asset_server, load)) {
        None => {}
        Some(Err(error)) => {
            error!("celestial body build aborted: {error}");
            commands.insert_resource(BuildResult::Failed(error));
            commands.remove_resource::<PendingBuild>();
        }
        Some(Ok(())) => {
            let body = spawn_composite(
                &spec,
                &pending.textures,
                pending.model.clone(),
                &mut meshes,
                &mut materials,
                &mut commands,
            );
            info!("celestial body ready with {} layers", spec.layers.len());
            commands.insert_resource(BuildResult::Ready(body));
            commands.remove_resource::<PendingBuild>();
        }
    }
}

/// Attach every layer, then the sub-model, under one fresh root entity.
/// Caller guarantees the handles are fully loaded; children appear in
/// spec order.
pub fn spawn_composite(
    spec: &BodySpec,
    textures: &[Handle<Image>],
    model: Option<Handle<Scene>>,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    commands: &mut Commands,
) -> Entity {
    let body = commands
        .spawn((
            CelestialBody,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    for (index, (layer, texture)) in spec.layers.iter().zip(textures).enumerate() {
        let mut child = commands.spawn((
            BodyLayer(index),
            Mesh3d(meshes.add(shell_mesh(layer))),
            MeshMaterial3d(materials.add(shell_material(layer, texture.clone()))),
            ChildOf(body),
        ));
        if index == 0 {
            child.insert(Planet);
        }
        if layer.translucent.is_some() {
            child.insert(Clouds);
        }
    }

    if let (Some(model_spec), Some(scene)) = (&spec.model, model) {
        commands.spawn((
            SatelliteModel,
            SceneRoot(scene),
            Transform::from_translation(model_spec.translation).with_rotation(Quat::from_euler(
                EulerRot::XYZ,
                model_spec.rotation.x,
                model_spec.rotation.y,
                model_spec.rotation.z,
            )),
            ChildOf(body),
        ));
    }

    body
}

/// Shared rotation accumulator, advanced once per tick by the broadcaster
/// subscriber and read back by [`apply_spin`].
#[derive(Clone, Default)]
pub struct SpinState(Arc<Mutex<SpinInner>>);

#[derive(Default)]
struct SpinInner {
    angle: f32,
    last_tick: Option<Instant>,
}

impl SpinState {
    /// Advance by the rotation speed scaled with the real elapsed time since
    /// the previous tick, so the animation speed holds at any frame rate.
    pub fn advance(&self, speed: f32) {
        let now = Instant::now();
        let elapsed = {
            let inner = self.0.lock().unwrap();
            inner.last_tick.map(|last| (now - last).as_secs_f32())
        };
        if let Some(elapsed) = elapsed {
            self.advance_by(speed, elapsed);
        }
        self.0.lock().unwrap().last_tick = Some(now);
    }

    pub fn advance_by(&self, speed: f32, elapsed_seconds: f32) {
        self.0.lock().unwrap().angle += speed * elapsed_seconds;
    }

    pub fn angle(&self) -> f32 {
        self.0.lock().unwrap().angle
    }
}

/// The accumulator the tick subscriber feeds.
#[derive(Resource)]
pub struct BodySpin(pub SpinState);

// hook the spin into the frame tick
fn connect_spin(mut broadcaster: ResMut<TickBroadcaster>, mut commands: Commands) {
    let spin = SpinState::default();
    let hook = spin.clone();
    broadcaster.subscribe(move || hook.advance(PLANET_ROTATION_SPEED));
    commands.insert_resource(BodySpin(spin));
}

// write absolute rotations from the accumulated angle: the surface spins
// forward, the cloud shell drifts against it on two axes
pub fn apply_spin(
    spin: Res<BodySpin>,
    mut planet_query: Query<&mut Transform, (With<Planet>, Without<Clouds>)>,
    mut cloud_query: Query<&mut Transform, (With<Clouds>, Without<Planet>)>,
) {
    let angle = spin.0.angle();

    for mut transform in planet_query.iter_mut() {
        transform.rotation = Quat::from_rotation_y(angle);
    }

    for mut transform in cloud_query.iter_mut() {
        transform.rotation = Quat::from_euler(EulerRot::XYZ, 0.0, -angle, angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;
    use bevy::color::Alpha;
    use bevy::ecs::system::RunSystemOnce;
    use layers::{LayerSpec, ModelSpec};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app.init_asset::<Mesh>();
        app.init_asset::<Image>();
        app.init_asset::<StandardMaterial>();
        app.init_asset::<Scene>();
        app
    }

    fn shell(name: &'static str, radius: f32, translucent: Option<f32>) -> LayerSpec {
        LayerSpec {
            name,
            texture: format!("textures/{name}.png"),
            radius,
            segments: 8,
            translucent,
        }
    }

    fn spawn(app: &mut App, spec: BodySpec, with_model: bool) -> Entity {
        let textures: Vec<Handle<Image>> =
            spec.layers.iter().map(|_| Handle::default()).collect();
        let model = with_model.then(Handle::default);

        app.world_mut()
            .run_system_once(
                move |mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      mut commands: Commands| {
                    spawn_composite(
                        &spec,
                        &textures,
                        model.clone(),
                        &mut meshes,
                        &mut materials,
                        &mut commands,
                    )
                },
            )
            .unwrap()
    }

    #[test]
    fn composite_attaches_layers_in_spec_order() {
        let mut app = test_app();
        let spec = BodySpec {
            layers: vec![
                shell("surface", 10.0, None),
                shell("cloud-shell", 10.1, Some(0.9)),
            ],
            model: None,
        };

        let body = spawn(&mut app, spec, false);
        let world = app.world();

        assert!(world.get::<CelestialBody>(body).is_some());
        let children = world.get::<Children>(body).unwrap();
        assert_eq!(children.len(), 2);

        let first = children[0];
        let second = children[1];
        assert_eq!(world.get::<BodyLayer>(first), Some(&BodyLayer(0)));
        assert_eq!(world.get::<BodyLayer>(second), Some(&BodyLayer(1)));
        assert!(world.get::<Planet>(first).is_some());
        assert!(world.get::<Clouds>(second).is_some());
        assert!(world.get::<Clouds>(first).is_none());
    }

    #[test]
    fn cloud_shell_child_is_translucent_at_the_configured_opacity() {
        let mut app = test_app();
        let spec = BodySpec {
            layers: vec![
                shell("surface", 10.0, None),
                shell("cloud-shell", 10.1, Some(0.9)),
            ],
            model: None,
        };

        let body = spawn(&mut app, spec, false);
        let world = app.world();

        let children = world.get::<Children>(body).unwrap();
        let handle = world
            .get::<MeshMaterial3d<StandardMaterial>>(children[1])
            .unwrap()
            .0
            .clone();
        let materials = world.resource::<Assets<StandardMaterial>>();
        let material = materials.get(&handle).unwrap();

        assert_eq!(material.alpha_mode, AlphaMode::Blend);
        assert!((material.base_color.alpha() - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn sub_model_is_attached_after_the_shells() {
        let mut app = test_app();
        let spec = BodySpec {
            layers: vec![shell("surface", 10.0, None)],
            model: Some(ModelSpec {
                scene: "models/satellite.gltf".into(),
                translation: Vec3::new(-20.0, 5.0, 80.0),
                rotation: Vec3::new(-0.2, 1.4, 0.0),
            }),
        };

        let body = spawn(&mut app, spec, true);
        let world = app.world();

        let children = world.get::<Children>(body).unwrap();
        assert_eq!(children.len(), 2);

        let model = children[1];
        assert!(world.get::<SatelliteModel>(model).is_some());
        assert!(world.get::<SceneRoot>(model).is_some());
        let placement = world.get::<Transform>(model).unwrap();
        assert_eq!(placement.translation, Vec3::new(-20.0, 5.0, 80.0));
    }

    #[test]
    fn failing_layer_aborts_the_build_with_its_path() {
        let mut app = test_app();
        app.world_mut().insert_resource(BodySpec {
            layers: vec![shell("missing-surface", 10.0, None)],
            model: None,
        });
        app.add_plugins((crate::systems::tick::TickPlugin, PlanetPlugin));

        // no asset root exists in the test environment, so the load fails;
        // pump frames until the asset server reports it
        for _ in 0..500 {
            app.update();
            if app.world().contains_resource::<BuildResult>() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        match app.world().get_resource::<BuildResult>() {
            Some(BuildResult::Failed(error)) => {
                assert_eq!(error.path, "textures/missing-surface.png");
            }
            other => panic!("expected a failed build, got {other:?}"),
        }

        // all-or-nothing: no partial composite reached the scene
        let mut bodies = app.world_mut().query::<&CelestialBody>();
        assert_eq!(bodies.iter(app.world()).count(), 0);
    }

    #[test]
    fn spin_advances_proportionally_to_elapsed_time() {
        let spin = SpinState::default();

        spin.advance_by(0.1, 1.0);
        spin.advance_by(0.1, 0.5);

        assert!((spin.angle() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn first_tick_only_arms_the_clock() {
        let spin = SpinState::default();

        spin.advance(10.0);

        assert_eq!(spin.angle(), 0.0);
    }

    #[test]
    fn apply_spin_counter_rotates_the_cloud_shell() {
        let mut app = test_app();

        let planet = app.world_mut().spawn((Planet, Transform::default())).id();
        let clouds = app.world_mut().spawn((Clouds, Transform::default())).id();

        let spin = SpinState::default();
        spin.advance_by(1.0, 0.4);
        app.world_mut().insert_resource(BodySpin(spin));

        app.world_mut().run_system_once(apply_spin).unwrap();

        let world = app.world();
        let planet_rotation = world.get::<Transform>(planet).unwrap().rotation;
        let cloud_rotation = world.get::<Transform>(clouds).unwrap().rotation;

        assert!(planet_rotation.angle_between(Quat::from_rotation_y(0.4)) < 1e-5);
        assert!(
            cloud_rotation.angle_between(Quat::from_euler(EulerRot::XYZ, 0.0, -0.4, 0.4)) < 1e-5
        );
    }
}
