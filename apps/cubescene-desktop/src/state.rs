use cubescene_input::{Action, ActionState, PointerTracker, VirtualPointer};
use cubescene_kernel::{FrameInput, MovementMode, StepReport, World};
use cubescene_render::RenderSettings;
use egui::Context as EguiContext;

/// Longest frame step; slower frames are simulated as this long.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Per-run application state, independent of the window and GPU.
pub struct AppState {
    pub world: World,
    pub settings: RenderSettings,
    actions: ActionState,
    tracker: PointerTracker,
    pointer: VirtualPointer,
    pointer_captured: bool,
    pub show_overlay: bool,
    pub should_close: bool,
    fps: f32,
    last_report: StepReport,
}

impl AppState {
    pub fn new(world: World, settings: RenderSettings) -> Self {
        Self {
            world,
            settings,
            actions: ActionState::new(),
            tracker: PointerTracker::new(),
            pointer: VirtualPointer::default(),
            pointer_captured: false,
            show_overlay: false,
            should_close: false,
            fps: 0.0,
            last_report: StepReport::default(),
        }
    }

    /// Pointer capture the window should currently hold.
    pub fn wants_pointer(&self) -> bool {
        !self.show_overlay && !self.should_close
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Record that capture was taken or released. Taking it re-seeds the tracker.
    pub fn set_pointer_captured(&mut self, captured: bool) {
        if captured && !self.pointer_captured {
            self.tracker.reset();
        }
        self.pointer_captured = captured;
    }

    pub fn handle_action(&mut self, action: Action, pressed: bool) {
        let fresh = self.actions.set(action, pressed);
        if !fresh {
            return;
        }
        match action {
            Action::ToggleOverlay => {
                self.show_overlay = !self.show_overlay;
                tracing::debug!(shown = self.show_overlay, "overlay toggled");
            }
            Action::Quit => self.should_close = true,
            _ => {}
        }
    }

    /// Raw device motion; ignored unless the pointer is captured.
    pub fn pointer_motion(&mut self, dx: f64, dy: f64) {
        if self.pointer_captured {
            self.pointer.accumulate(dx, dy);
        }
    }

    /// Drop held keys, e.g. when focus is lost.
    pub fn release_all(&mut self) {
        self.actions.clear();
    }

    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
        }

        let look_delta = if self.pointer_captured {
            let (x, y) = self.pointer.position();
            self.tracker.sample(x, y)
        } else {
            (0.0, 0.0)
        };
        let input = FrameInput::from_actions(&self.actions, look_delta);
        self.last_report = self.world.step(&input, dt);
    }

    pub fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        let camera = self.world.snapshot();
        egui::Window::new("Cube Scene")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.0}  Frame: {}", self.fps, camera.frame));
                ui.label(format!(
                    "Camera: ({:.2}, {:.2}, {:.2})",
                    camera.position.x, camera.position.y, camera.position.z
                ));
                ui.label(format!("Yaw: {:.1}  Pitch: {:.1}", camera.yaw, camera.pitch));
                ui.label(format!(
                    "Grounded: {}  Vertical velocity: {:.2}",
                    camera.grounded, camera.velocity
                ));
                if self.last_report.blocked {
                    ui.colored_label(egui::Color32::YELLOW, "Blocked");
                }
                ui.separator();

                ui.heading("Variant");
                let mut mode = self.world.movement().mode;
                ui.horizontal(|ui| {
                    ui.radio_value(&mut mode, MovementMode::Walk, "Walk");
                    ui.radio_value(&mut mode, MovementMode::Fly, "Fly");
                });
                self.world.set_mode(mode);
                ui.checkbox(&mut self.settings.skybox, "Skybox");
                ui.checkbox(&mut self.settings.fog_enabled, "Fog");
                ui.add_enabled(
                    self.settings.fog_enabled,
                    egui::Slider::new(&mut self.settings.fog.start, 0.0..=50.0).text("Fog start"),
                );
                ui.add_enabled(
                    self.settings.fog_enabled,
                    egui::Slider::new(&mut self.settings.fog.end, 1.0..=100.0).text("Fog end"),
                );

                ui.separator();
                ui.small("F1: Overlay | WASD: Move | Space/Shift: Up/Down | IJKLUO: Rotate | Esc: Quit");
            });
    }
}
