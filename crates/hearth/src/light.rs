//! Scene lights and their upload to the renderer's fixed slot table.

use crate::ecs::World;
use crate::math::{Color, Transform, Vec3};
use crate::render::LightParams;

/// Number of light slots a renderer exposes.
pub const MAX_LIGHTS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LightType {
    #[default]
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub light_type: LightType,
    pub color: Color,
    pub intensity: f32,
    /// Used by directional and spot lights.
    pub direction: Vec3,
    /// Falloff distance for point and spot lights.
    pub radius: f32,
    pub inner_cone_degrees: f32,
    pub outer_cone_degrees: f32,
    /// Slot assigned on the last sync, `None` if the light didn't fit.
    pub slot: Option<usize>,
}

impl Light {
    pub fn directional(direction: Vec3) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn point(radius: f32) -> Self {
        Self {
            light_type: LightType::Point,
            radius,
            ..Self::default()
        }
    }

    pub fn spot(direction: Vec3, inner_degrees: f32, outer_degrees: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            direction,
            inner_cone_degrees: inner_degrees,
            outer_cone_degrees: outer_degrees,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Slot parameters for a light at `position`.
    pub fn params(&self, position: Vec3) -> LightParams {
        LightParams {
            light_type: self.light_type,
            position,
            direction: self.direction,
            color: self.color.to_vec3(),
            intensity: self.intensity,
            radius: self.radius,
            inner_cos: self.inner_cone_degrees.to_radians().cos(),
            outer_cos: self.outer_cone_degrees.to_radians().cos(),
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            color: Color::WHITE,
            intensity: 1.0,
            direction: Vec3::NEG_Y,
            radius: 10.0,
            inner_cone_degrees: 12.5,
            outer_cone_degrees: 17.5,
            slot: None,
        }
    }
}

/// Upload the first [`MAX_LIGHTS`] lights in query order and clear the rest.
pub fn light_sync_system(world: &mut World) {
    let lights = world.query::<(Light, Transform)>();
    if lights.len() > MAX_LIGHTS {
        log::trace!("{} lights in scene, only {MAX_LIGHTS} are rendered", lights.len());
    }
    let mut uploads = Vec::with_capacity(MAX_LIGHTS);

    for (index, entity) in lights.into_iter().enumerate() {
        let Some(position) = world.get::<Transform>(entity).map(|t| t.position) else {
            continue;
        };
        let Some(light) = world.get_mut::<Light>(entity) else {
            continue;
        };
        if index >= MAX_LIGHTS {
            light.slot = None;
            continue;
        }
        light.slot = Some(index);
        uploads.push(light.params(position));
    }

    let renderer = world.renderer_mut();
    for (slot, params) in uploads.iter().enumerate() {
        renderer.set_light(slot, params);
    }
    for slot in uploads.len()..MAX_LIGHTS {
        renderer.clear_light(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessRenderer;

    fn setup() -> (World, HeadlessRenderer) {
        let renderer = HeadlessRenderer::new();
        let world = World::builder().renderer(renderer.clone()).build();
        (world, renderer)
    }

    #[test]
    fn assigns_slots_in_query_order() {
        let (mut world, renderer) = setup();
        let a = world.spawn_with((Transform::from_xyz(1.0, 0.0, 0.0), Light::point(5.0)));
        let b = world.spawn_with((Transform::default(), Light::default().with_color(Color::RED)));

        light_sync_system(&mut world);

        assert_eq!(world.get::<Light>(a).unwrap().slot, Some(0));
        assert_eq!(world.get::<Light>(b).unwrap().slot, Some(1));
        let state = renderer.state();
        let first = state.lights[0].unwrap();
        assert_eq!(first.light_type, LightType::Point);
        assert_eq!(first.position, Vec3::X);
        assert_eq!(state.lights[1].unwrap().color, Vec3::X);
        assert!(state.lights[2..].iter().all(Option::is_none));
    }

    #[test]
    fn uploads_cone_cosines() {
        let light = Light::spot(Vec3::NEG_Z, 60.0, 90.0);
        let params = light.params(Vec3::ZERO);
        assert!((params.inner_cos - 0.5).abs() < 1e-6);
        assert!(params.outer_cos.abs() < 1e-6);
    }

    #[test]
    fn extra_lights_get_no_slot() {
        let (mut world, renderer) = setup();
        let lights: Vec<_> = (0..MAX_LIGHTS + 2)
            .map(|_| world.spawn_with((Transform::default(), Light::default())))
            .collect();

        light_sync_system(&mut world);

        assert_eq!(renderer.state().active_lights(), MAX_LIGHTS);
        assert_eq!(world.get::<Light>(lights[MAX_LIGHTS]).unwrap().slot, None);
    }

    #[test]
    fn despawned_light_frees_its_slot() {
        let (mut world, renderer) = setup();
        let a = world.spawn_with((Transform::default(), Light::default()));
        world.spawn_with((Transform::default(), Light::default()));
        light_sync_system(&mut world);
        assert_eq!(renderer.state().active_lights(), 2);

        world.despawn(a);
        light_sync_system(&mut world);
        assert_eq!(renderer.state().active_lights(), 1);
        assert!(renderer.state().lights[1].is_none());
    }

    #[test]
    fn light_without_transform_is_ignored() {
        let (mut world, renderer) = setup();
        world.spawn_with((Light::default(),));
        light_sync_system(&mut world);
        assert_eq!(renderer.state().active_lights(), 0);
    }
}
