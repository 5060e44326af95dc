/// WGSL shader for the textured, lit and fogged ground and cubes.
pub const SCENE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    fog_color: vec4<f32>,
    // x = start, y = end, z = enabled (0 or 1)
    fog_params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var albedo: texture_2d<f32>;
@group(1) @binding(1)
var albedo_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) tint: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tint: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv;
    out.tint = instance.tint;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let ambient = 0.3;
    let diffuse = max(dot(normalize(in.world_normal), light_dir), 0.0);
    let lighting = ambient + diffuse * 0.7;

    let base = textureSample(albedo, albedo_sampler, in.uv).rgb * in.tint.rgb;
    let lit = base * lighting;

    let dist = distance(in.world_pos, frame.camera_pos.xyz);
    let span = max(frame.fog_params.y - frame.fog_params.x, 0.0001);
    let visibility = clamp((frame.fog_params.y - dist) / span, 0.0, 1.0);
    let fogged = mix(frame.fog_color.rgb, lit, visibility);
    let color = select(lit, fogged, frame.fog_params.z > 0.5);
    return vec4<f32>(color, 1.0);
}
"#;

/// WGSL shader for the sky cube map, drawn at the far plane.
pub const SKY_SHADER: &str = r#"
struct Sky {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: Sky;

@group(1) @binding(0)
var sky_texture: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> SkyOutput {
    let clip = sky.view_proj * vec4<f32>(position, 1.0);

    var out: SkyOutput;
    // z = w puts every sky fragment at depth 1.0.
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(sky_texture, sky_sampler, in.direction).rgb, 1.0);
}
"#;
