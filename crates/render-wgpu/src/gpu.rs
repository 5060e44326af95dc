use crate::error::RenderError;
use crate::mesh::{self, SkyVertex, Vertex};
use crate::shaders;
use crate::textures;
use bytemuck::{Pod, Zeroable};
use cubescene_math::Matrix4;
use cubescene_render::texture::{crate_texture, ground_tiles};
use cubescene_render::{DrawKind, FramePlan, SkyGradient};
use std::ops::Range;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CRATE_TEXTURE_SIZE: u32 = 128;
const GROUND_TEXTURE_SIZE: u32 = 64;
const SKY_FACE_SIZE: u32 = 128;
/// Ground plus cubes.
const MAX_INSTANCES: u32 = 257;

/// Maps GL clip depth (-1..1) to wgpu clip depth (0..1).
#[rustfmt::skip]
const GL_TO_WGPU_DEPTH: Matrix4 = Matrix4::from_cols_array([
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    fog_color: [f32; 4],
    fog_params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SkyUniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    tint: [f32; 4],
}

impl InstanceData {
    fn new(model: &Matrix4, tint: [f32; 3]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            tint: [tint[0], tint[1], tint[2], 1.0],
        }
    }
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new<V: Pod>(device: &wgpu::Device, label: &str, vertices: &[V], indices: &[u16]) -> Self {
        Self {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_vertex_buffer")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_index_buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: indices.len() as u32,
        }
    }
}

/// Pipeline settings that differ between the scene and sky programs.
struct ProgramDesc<'a> {
    label: &'static str,
    source: &'static str,
    vs_entry: &'static str,
    fs_entry: &'static str,
    layout: &'a wgpu::PipelineLayout,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

/// Compile a shader and build its pipeline inside a validation error scope.
/// A rejected program yields `Err` instead of aborting the process.
fn build_program(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    desc: &ProgramDesc<'_>,
) -> Result<wgpu::RenderPipeline, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(desc.vs_entry),
            compilation_options: Default::default(),
            buffers: desc.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(desc.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: desc.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(pipeline),
        Some(err) => Err(RenderError::ShaderProgram {
            label: desc.label,
            message: err.to_string(),
        }),
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// wgpu renderer for a [`FramePlan`]: sky cube map, textured ground, textured cubes, fog.
pub struct WgpuRenderer {
    scene_pipeline: Option<wgpu::RenderPipeline>,
    sky_pipeline: Option<wgpu::RenderPipeline>,
    failures: Vec<RenderError>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sky_buffer: wgpu::Buffer,
    sky_bind_group: wgpu::BindGroup,
    crate_material: wgpu::BindGroup,
    ground_material: wgpu::BindGroup,
    sky_material: wgpu::BindGroup,
    cube: MeshBuffers,
    ground: MeshBuffers,
    sky: MeshBuffers,
    instance_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    /// Generate textures, upload meshes and build both shader programs.
    ///
    /// Texture generation failures are returned. Shader program failures are
    /// logged and recorded; the renderer then skips the draws that need the
    /// missing program. See [`WgpuRenderer::failed_programs`].
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let crate_image = crate_texture(CRATE_TEXTURE_SIZE)?;
        let ground_image = ground_tiles(GROUND_TEXTURE_SIZE, 4, [96, 124, 72, 255], [70, 92, 52, 255])?;
        let sky_cubemap = SkyGradient::default().cubemap(SKY_FACE_SIZE)?;

        // Uniforms
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sky_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_uniform_buffer"),
            contents: bytemuck::bytes_of(&SkyUniforms {
                view_proj: Matrix4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_layout = uniform_layout(
            device,
            "frame_bind_group_layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let sky_layout = uniform_layout(device, "sky_bind_group_layout", wgpu::ShaderStages::VERTEX);
        let frame_bind_group = uniform_bind_group(device, "frame_bind_group", &frame_layout, &frame_buffer);
        let sky_bind_group = uniform_bind_group(device, "sky_bind_group", &sky_layout, &sky_buffer);

        // Textures
        let material_layout =
            textures::texture_bind_group_layout(device, "material_layout", wgpu::TextureViewDimension::D2);
        let cube_map_layout =
            textures::texture_bind_group_layout(device, "sky_texture_layout", wgpu::TextureViewDimension::Cube);
        let repeat = textures::create_sampler(device, "repeat_sampler", wgpu::AddressMode::Repeat);
        let clamp = textures::create_sampler(device, "clamp_sampler", wgpu::AddressMode::ClampToEdge);

        let crate_view = textures::upload_2d(device, queue, "crate_texture", &crate_image);
        let ground_view = textures::upload_2d(device, queue, "ground_texture", &ground_image);
        let sky_view = textures::upload_cube(device, queue, "sky_texture", &sky_cubemap);
        let crate_material =
            textures::texture_bind_group(device, &material_layout, "crate_material", &crate_view, &repeat);
        let ground_material =
            textures::texture_bind_group(device, &material_layout, "ground_material", &ground_view, &repeat);
        let sky_material =
            textures::texture_bind_group(device, &cube_map_layout, "sky_material", &sky_view, &clamp);

        // Programs
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[&sky_layout, &cube_map_layout],
            push_constant_ranges: &[],
        });

        let scene_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2,
                ],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    3 => Float32x4,
                    4 => Float32x4,
                    5 => Float32x4,
                    6 => Float32x4,
                    7 => Float32x4,
                ],
            },
        ];
        let sky_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SkyVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
        }];

        let mut failures = Vec::new();
        let mut keep = |result: Result<wgpu::RenderPipeline, RenderError>| match result {
            Ok(pipeline) => Some(pipeline),
            Err(err) => {
                tracing::error!(error = %err, "shader program unavailable; its draws will be skipped");
                failures.push(err);
                None
            }
        };
        let scene_pipeline = keep(build_program(
            device,
            surface_format,
            &ProgramDesc {
                label: "scene_program",
                source: shaders::SCENE_SHADER,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                layout: &scene_layout,
                buffers: &scene_buffers,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        ));
        let sky_pipeline = keep(build_program(
            device,
            surface_format,
            &ProgramDesc {
                label: "sky_program",
                source: shaders::SKY_SHADER,
                vs_entry: "vs_sky",
                fs_entry: "fs_sky",
                layout: &sky_pipeline_layout,
                buffers: &sky_buffers,
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        ));

        // Meshes
        let (cube_vertices, cube_indices) = mesh::cube_mesh();
        let (ground_vertices, ground_indices) = mesh::ground_mesh();
        let (sky_vertices, sky_indices) = mesh::sky_mesh();
        let cube = MeshBuffers::new(device, "cube", &cube_vertices, &cube_indices);
        let ground = MeshBuffers::new(device, "ground", &ground_vertices, &ground_indices);
        let sky = MeshBuffers::new(device, "sky", &sky_vertices, &sky_indices);

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: u64::from(MAX_INSTANCES) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::info!(
            ?surface_format,
            failed_programs = failures.len(),
            "wgpu renderer ready"
        );

        Ok(Self {
            scene_pipeline,
            sky_pipeline,
            failures,
            frame_buffer,
            frame_bind_group,
            sky_buffer,
            sky_bind_group,
            crate_material,
            ground_material,
            sky_material,
            cube,
            ground,
            sky,
            instance_buffer,
            depth_texture,
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Shader programs that failed to build at startup.
    pub fn failed_programs(&self) -> &[RenderError] {
        &self.failures
    }

    /// Render one frame: skybox, ground, then cubes.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        let linear = self.surface_format.is_srgb();
        let uniforms = &plan.uniforms;
        let fog = &uniforms.fog;
        let fog_color = output_color(fog.color, linear);
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                view_proj: (GL_TO_WGPU_DEPTH * uniforms.view_projection).to_cols_array_2d(),
                camera_pos: [
                    uniforms.camera_position.x,
                    uniforms.camera_position.y,
                    uniforms.camera_position.z,
                    1.0,
                ],
                fog_color: [fog_color[0], fog_color[1], fog_color[2], 1.0],
                fog_params: [fog.start, fog.end, if fog.enabled { 1.0 } else { 0.0 }, 0.0],
            }),
        );
        queue.write_buffer(
            &self.sky_buffer,
            0,
            bytemuck::bytes_of(&SkyUniforms {
                view_proj: (GL_TO_WGPU_DEPTH * uniforms.sky_view_projection).to_cols_array_2d(),
            }),
        );

        let batch = InstanceBatch::collect(plan);
        if !batch.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&batch.instances));
        }

        let clear = output_color(plan.clear_color, linear);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear[0]),
                            g: f64::from(clear[1]),
                            b: f64::from(clear[2]),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if plan.has_skybox() {
                if let Some(pipeline) = &self.sky_pipeline {
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, &self.sky_bind_group, &[]);
                    pass.set_bind_group(1, &self.sky_material, &[]);
                    pass.set_vertex_buffer(0, self.sky.vertices.slice(..));
                    pass.set_index_buffer(self.sky.indices.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..self.sky.index_count, 0, 0..1);
                }
            }

            if let Some(pipeline) = &self.scene_pipeline {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

                if let Some(slot) = batch.ground {
                    pass.set_bind_group(1, &self.ground_material, &[]);
                    pass.set_vertex_buffer(0, self.ground.vertices.slice(..));
                    pass.set_index_buffer(self.ground.indices.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..self.ground.index_count, 0, slot..slot + 1);
                }

                if let Some(range) = batch.cubes {
                    pass.set_bind_group(1, &self.crate_material, &[]);
                    pass.set_vertex_buffer(0, self.cube.vertices.slice(..));
                    pass.set_index_buffer(self.cube.indices.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..self.cube.index_count, 0, range);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn output_color(color: [f32; 3], linear: bool) -> [f32; 3] {
    if linear {
        color.map(textures::srgb_to_linear)
    } else {
        color
    }
}

/// Instance data for one frame, ground first, then the cube run.
struct InstanceBatch {
    instances: Vec<InstanceData>,
    ground: Option<u32>,
    cubes: Option<Range<u32>>,
}

impl InstanceBatch {
    fn collect(plan: &FramePlan) -> Self {
        let mut batch = Self {
            instances: Vec::with_capacity(plan.draws.len()),
            ground: None,
            cubes: None,
        };
        for draw in &plan.draws {
            if draw.kind == DrawKind::Skybox {
                continue;
            }
            if batch.instances.len() >= MAX_INSTANCES as usize {
                tracing::warn!(max = MAX_INSTANCES, "instance buffer full; dropping remaining draws");
                break;
            }
            let slot = batch.instances.len() as u32;
            match draw.kind {
                DrawKind::Ground => batch.ground = Some(slot),
                _ => batch.cubes.get_or_insert(slot..slot).end = slot + 1,
            }
            batch.instances.push(InstanceData::new(&draw.model, draw.tint));
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescene_kernel::{MovementMode, World};
    use cubescene_math::Vector3;
    use cubescene_render::RenderSettings;

    #[test]
    fn uniform_layouts_match_shader_structs() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 112);
        assert_eq!(std::mem::size_of::<SkyUniforms>(), 64);
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
    }

    #[test]
    fn depth_remap_moves_near_and_far_planes() {
        let proj = Matrix4::perspective(45f32.to_radians(), 1.0, 0.1, 100.0);
        let clip = GL_TO_WGPU_DEPTH * proj;
        let ndc_z = |z: f32| {
            let p = clip.m;
            let cz = p[2 * 4 + 2] * z + p[3 * 4 + 2];
            let cw = p[2 * 4 + 3] * z + p[3 * 4 + 3];
            cz / cw
        };
        assert!(ndc_z(-0.1).abs() < 1e-4);
        assert!((ndc_z(-100.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn batch_puts_ground_before_cubes() {
        let world = World::demo(MovementMode::Walk);
        let plan = FramePlan::build(&world, &RenderSettings::default(), 1.0);
        let batch = InstanceBatch::collect(&plan);
        let cubes = world.scene().objects().len() as u32;
        assert_eq!(batch.ground, Some(0));
        assert_eq!(batch.cubes, Some(1..1 + cubes));
        assert_eq!(batch.instances.len() as u32, cubes + 1);
    }

    #[test]
    fn instance_carries_translation_and_opaque_tint() {
        let model = Matrix4::translate(Vector3::new(1.0, 2.0, 3.0));
        let inst = InstanceData::new(&model, [0.5, 0.25, 1.0]);
        assert_eq!(inst.model_3, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(inst.tint, [0.5, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn colors_pass_through_for_non_srgb_targets() {
        assert_eq!(output_color([0.5, 0.5, 0.5], false), [0.5, 0.5, 0.5]);
        assert!(output_color([0.5, 0.5, 0.5], true)[0] < 0.5);
    }
}
