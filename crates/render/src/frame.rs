use crate::settings::{Fog, RenderSettings};
use cubescene_kernel::World;
use cubescene_math::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// What a draw call renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawKind {
    Skybox,
    Ground,
    /// Cube for the scene object at this index.
    Cube(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawCall {
    pub kind: DrawKind,
    pub model: Matrix4,
    pub tint: [f32; 3],
}

/// Fog parameters as the shaders see them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FogUniform {
    pub color: [f32; 3],
    pub start: f32,
    pub end: f32,
    pub enabled: bool,
}

impl FogUniform {
    /// Fraction of the lit color that survives at `distance`; 1 when fog is off.
    pub fn visibility(&self, distance: f32) -> f32 {
        if !self.enabled {
            return 1.0;
        }
        Fog {
            color: self.color,
            start: self.start,
            end: self.end,
        }
        .factor(distance)
    }
}

/// Per-frame values shared by every draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameUniforms {
    pub view: Matrix4,
    pub projection: Matrix4,
    pub view_projection: Matrix4,
    /// Projection times the rotation-only view, for the skybox.
    pub sky_view_projection: Matrix4,
    pub camera_position: Vector3,
    pub fog: FogUniform,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePlan {
    pub uniforms: FrameUniforms,
    pub draws: Vec<DrawCall>,
    pub clear_color: [f32; 3],
}

impl FramePlan {
    /// Build the frame for the current world state.
    pub fn build(world: &World, settings: &RenderSettings, aspect: f32) -> Self {
        let camera = world.camera();
        let view = camera.view_matrix();
        let projection = Matrix4::perspective(
            settings.fov_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            settings.near,
            settings.far,
        );
        let uniforms = FrameUniforms {
            view,
            projection,
            view_projection: projection * view,
            sky_view_projection: projection * view.without_translation(),
            camera_position: camera.position,
            fog: FogUniform {
                color: settings.fog.color,
                start: settings.fog.start,
                end: settings.fog.end,
                enabled: settings.fog_enabled,
            },
        };

        let scene = world.scene();
        let mut draws = Vec::with_capacity(scene.objects().len() + 2);
        if settings.skybox {
            draws.push(DrawCall {
                kind: DrawKind::Skybox,
                model: Matrix4::IDENTITY,
                tint: [1.0; 3],
            });
        }
        draws.push(DrawCall {
            kind: DrawKind::Ground,
            model: scene.ground.model_matrix(),
            tint: [1.0; 3],
        });
        let rotation = world.rotation();
        draws.extend(scene.objects().iter().enumerate().map(|(i, obj)| DrawCall {
            kind: DrawKind::Cube(i),
            model: rotation.model_matrix(obj.position),
            tint: obj.tint,
        }));

        tracing::trace!(draws = draws.len(), "frame planned");

        Self {
            uniforms,
            draws,
            clear_color: settings.background(),
        }
    }

    pub fn cubes(&self) -> impl Iterator<Item = &DrawCall> {
        self.draws
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::Cube(_)))
    }

    pub fn has_skybox(&self) -> bool {
        self.draws.iter().any(|d| d.kind == DrawKind::Skybox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescene_kernel::MovementMode;

    #[test]
    fn draw_order_is_sky_ground_cubes() {
        let world = World::demo(MovementMode::Walk);
        let plan = FramePlan::build(&world, &RenderSettings::default(), 16.0 / 9.0);
        assert_eq!(plan.draws[0].kind, DrawKind::Skybox);
        assert_eq!(plan.draws[1].kind, DrawKind::Ground);
        assert_eq!(plan.draws[2].kind, DrawKind::Cube(0));
        assert_eq!(plan.cubes().count(), world.scene().objects().len());
    }

    #[test]
    fn skybox_toggle_removes_sky_draw() {
        let world = World::demo(MovementMode::Walk);
        let settings = RenderSettings {
            skybox: false,
            ..RenderSettings::default()
        };
        let plan = FramePlan::build(&world, &settings, 1.0);
        assert!(!plan.has_skybox());
        assert_eq!(plan.draws[0].kind, DrawKind::Ground);
    }

    #[test]
    fn view_maps_camera_to_origin() {
        let world = World::demo(MovementMode::Fly);
        let plan = FramePlan::build(&world, &RenderSettings::default(), 4.0 / 3.0);
        let eye = plan.uniforms.view.transform_point(plan.uniforms.camera_position);
        assert!(eye.length() < 1e-5);
        assert_eq!(plan.uniforms.sky_view_projection.translation().x, 0.0);
    }

    #[test]
    fn cube_models_sit_at_object_positions() {
        let world = World::demo(MovementMode::Walk);
        let plan = FramePlan::build(&world, &RenderSettings::default(), 1.0);
        for (draw, obj) in plan.cubes().zip(world.scene().objects()) {
            assert_eq!(draw.model.translation(), obj.position);
            assert_eq!(draw.tint, obj.tint);
        }
    }

    #[test]
    fn clear_color_tracks_fog() {
        let world = World::demo(MovementMode::Walk);
        let mut settings = RenderSettings::default();
        settings.fog_enabled = false;
        let plan = FramePlan::build(&world, &settings, 1.0);
        assert!(!plan.uniforms.fog.enabled);
        assert_eq!(plan.clear_color, settings.clear_color);
    }
}
