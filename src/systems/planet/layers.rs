//! Declarative recipe for the visual layers composing one celestial body.
//! Layer order in the recipe is the attach order under the composite root.

use bevy::prelude::*;

use crate::config::{
    CLOUD_OPACITY, CLOUD_RADIUS, CLOUD_TEXTURE, PLANET_RADIUS, PLANET_TEXTURE, SATELLITE_POSITION,
    SATELLITE_ROTATION, SATELLITE_SCENE, SHELL_SEGMENTS,
};

/// One textured spherical shell of the body.
#[derive(Clone, Debug)]
pub struct LayerSpec {
    pub name: &'static str,
    /// Texture path relative to the asset root.
    pub texture: String,
    pub radius: f32,
    /// UV sphere resolution, applied to sectors and stacks alike.
    pub segments: usize,
    /// `Some(opacity)` renders the shell alpha-blended at that opacity.
    pub translucent: Option<f32>,
}

/// Optional sub-model merged into the composite: a gltf scene whose content
/// is re-parented under the composite root at a fixed placement.
#[derive(Clone, Debug)]
pub struct ModelSpec {
    /// Scene path relative to the asset root.
    pub scene: String,
    pub translation: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
}

/// The full recipe for one body.
#[derive(Resource, Clone, Debug)]
pub struct BodySpec {
    pub layers: Vec<LayerSpec>,
    pub model: Option<ModelSpec>,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerSpec {
                    name: "surface",
                    texture: PLANET_TEXTURE.into(),
                    radius: PLANET_RADIUS,
                    segments: SHELL_SEGMENTS,
                    translucent: None,
                },
                LayerSpec {
                    name: "cloud-shell",
                    texture: CLOUD_TEXTURE.into(),
                    radius: CLOUD_RADIUS,
                    segments: SHELL_SEGMENTS,
                    translucent: Some(CLOUD_OPACITY),
                },
            ],
            model: Some(ModelSpec {
                scene: SATELLITE_SCENE.into(),
                translation: SATELLITE_POSITION,
                rotation: SATELLITE_ROTATION,
            }),
        }
    }
}

pub fn shell_mesh(spec: &LayerSpec) -> Mesh {
    Sphere::new(spec.radius)
        .mesh()
        .uv(spec.segments as u32, spec.segments as u32)
}

pub fn shell_material(spec: &LayerSpec, texture: Handle<Image>) -> StandardMaterial {
    match spec.translucent {
        Some(opacity) => StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, opacity),
            base_color_texture: Some(texture),
            alpha_mode: AlphaMode::Blend,
            metallic: 0.0,
            perceptual_roughness: 1.0,
            ..default()
        },
        None => StandardMaterial {
            base_color_texture: Some(texture),
            metallic: 0.0,
            perceptual_roughness: 1.0,
            ..default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::color::Alpha;

    #[test]
    fn default_spec_layers_surface_then_clouds_then_model() {
        let spec = BodySpec::default();

        assert_eq!(spec.layers.len(), 2);
        assert_eq!(spec.layers[0].name, "surface");
        assert_eq!(spec.layers[1].name, "cloud-shell");
        assert!(spec.layers[0].translucent.is_none());
        assert_eq!(spec.layers[1].translucent, Some(CLOUD_OPACITY));
        assert!(spec.layers[1].radius > spec.layers[0].radius);
        assert!(spec.model.is_some());
    }

    #[test]
    fn translucent_layer_material_alpha_blends_at_its_opacity() {
        let spec = LayerSpec {
            name: "cloud-shell",
            texture: "textures/clouds.png".into(),
            radius: 50.1,
            segments: 16,
            translucent: Some(0.9),
        };

        let material = shell_material(&spec, Handle::default());
        assert_eq!(material.alpha_mode, AlphaMode::Blend);
        assert!((material.base_color.alpha() - 0.9).abs() < f32::EPSILON);
        assert!(material.base_color_texture.is_some());
    }

    #[test]
    fn opaque_layer_material_keeps_the_default_alpha_mode() {
        let spec = LayerSpec {
            name: "surface",
            texture: "textures/planet.jpg".into(),
            radius: 50.0,
            segments: 16,
            translucent: None,
        };

        let material = shell_material(&spec, Handle::default());
        assert_eq!(material.alpha_mode, AlphaMode::Opaque);
        assert!(material.base_color_texture.is_some());
    }
}
