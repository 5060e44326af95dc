mod keymap;
mod state;

use anyhow::Result;
use clap::Parser;
use cubescene_kernel::{MovementMode, World};
use cubescene_render::{FramePlan, RenderSettings};
use cubescene_render_wgpu::{RenderError, WgpuRenderer};
use egui::Context as EguiContext;
use state::AppState;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

const WINDOW_TITLE: &str = "Cube Scene";

#[derive(Parser)]
#[command(name = "cubescene-desktop", about = "First-person cube scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Start in free flight instead of walking
    #[arg(long)]
    fly: bool,

    /// Disable distance fog
    #[arg(long)]
    no_fog: bool,

    /// Disable the sky cube map
    #[arg(long)]
    no_skybox: bool,

    /// Window width in pixels
    #[arg(long, default_value = "1600")]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value = "900")]
    height: u32,
}

/// Startup failures; any of these ends the process with a non-zero status.
#[derive(Debug, thiserror::Error)]
enum InitError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter")]
    Adapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface supports no texture formats")]
    SurfaceFormat,
    #[error("failed to create renderer: {0}")]
    Renderer(#[from] RenderError),
}

/// Window, surface, device and everything drawn with them.
struct GpuContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuContext {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, size: PhysicalSize<u32>) -> Result<Self, InitError> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(size);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(InitError::Adapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubescene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;
        device.on_uncaptured_error(Box::new(|err: wgpu::Error| {
            tracing::error!(error = %err, "uncaptured GPU error");
        }));

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(InitError::SurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, surface_format, config.width, config.height)?;
        for failure in renderer.failed_programs() {
            tracing::warn!(%failure, "continuing without shader program");
        }

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?surface_format,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, self.config.width, self.config.height);
    }

    /// Grab and hide the cursor, or release it. Raw motion still arrives
    /// when no grab mode is supported.
    fn capture_pointer(&self, capture: bool) {
        let applied = grab_modes(capture)
            .iter()
            .any(|&mode| match self.window.set_cursor_grab(mode) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, ?mode, "cursor grab mode unavailable");
                    false
                }
            });
        if !applied {
            tracing::warn!(capture, "cursor grab left unchanged");
        }
        self.window.set_cursor_visible(!capture);
    }

    fn draw_egui(&mut self, view: &wgpu::TextureView, egui_ctx: &EguiContext, state: &mut AppState) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

/// Grab modes to try in order: confined first, locked where confining is
/// unsupported.
fn grab_modes(capture: bool) -> &'static [CursorGrabMode] {
    if capture {
        &[CursorGrabMode::Confined, CursorGrabMode::Locked]
    } else {
        &[CursorGrabMode::None]
    }
}

struct CubeSceneApp {
    state: AppState,
    gpu: Option<GpuContext>,
    egui_ctx: EguiContext,
    window_size: PhysicalSize<u32>,
    last_frame: Instant,
    init_error: Option<InitError>,
}

impl CubeSceneApp {
    fn new(state: AppState, window_size: PhysicalSize<u32>) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            window_size,
            last_frame: Instant::now(),
            init_error: None,
        }
    }

    /// Bring the cursor grab in line with what the state wants.
    fn sync_pointer(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let wanted = self.state.wants_pointer();
        if wanted != self.state.pointer_captured() {
            gpu.capture_pointer(wanted);
            self.state.set_pointer_captured(wanted);
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let plan = FramePlan::build(&self.state.world, &self.state.settings, gpu.aspect());
        gpu.renderer.render(&gpu.device, &gpu.queue, &view, &plan);
        gpu.draw_egui(&view, &self.egui_ctx, &mut self.state);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for CubeSceneApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match GpuContext::new(event_loop, &self.egui_ctx, self.window_size) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.last_frame = Instant::now();
                self.sync_pointer();
            }
            Err(err) => {
                tracing::error!(error = %err, "initialization failed");
                self.init_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            if self.state.show_overlay {
                let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.should_close = true;
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(action) = keymap::action_for_key(key) {
                    self.state
                        .handle_action(action, key_state == ElementState::Pressed);
                }
                self.sync_pointer();
            }
            WindowEvent::RedrawRequested => {
                if !self.state.should_close {
                    self.redraw();
                }
            }
            _ => {}
        }

        if self.state.should_close {
            tracing::info!("closing");
            event_loop.exit();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.pointer_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubescene-desktop starting");

    let mode = if cli.fly { MovementMode::Fly } else { MovementMode::Walk };
    let settings = RenderSettings {
        skybox: !cli.no_skybox,
        fog_enabled: !cli.no_fog,
        ..RenderSettings::default()
    };
    let state = AppState::new(World::demo(mode), settings);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = CubeSceneApp::new(state, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.init_error.take() {
        return Err(err.into());
    }
    Ok(())
}
