use crate::frame::{DrawKind, FramePlan};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a frame plan and produces output. It never mutates the
/// world; the plan is rebuilt from world state every frame.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, plan: &FramePlan) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable listing of the draw calls in a frame, including
/// how much fog each cube would receive.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, plan: &FramePlan) -> String {
        let u = &plan.uniforms;
        let eye = u.camera_position;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame (draws={}, skybox={}, fog={}) ===\n",
            plan.draws.len(),
            if plan.has_skybox() { "on" } else { "off" },
            if u.fog.enabled { "on" } else { "off" },
        ));
        out.push_str(&format!(
            "Camera: pos=({:.2}, {:.2}, {:.2})\n",
            eye.x, eye.y, eye.z
        ));

        for draw in &plan.draws {
            let p = draw.model.translation();
            match draw.kind {
                DrawKind::Skybox => {
                    out.push_str("  [skybox]\n");
                }
                DrawKind::Ground => {
                    out.push_str(&format!("  [ground] y={:.2}\n", p.y));
                }
                DrawKind::Cube(i) => {
                    let visibility = u.fog.visibility((p - eye).length());
                    out.push_str(&format!(
                        "  [cube {i}] pos=({:.2}, {:.2}, {:.2}) tint=({:.2}, {:.2}, {:.2}) visibility={:.2}\n",
                        p.x, p.y, p.z, draw.tint[0], draw.tint[1], draw.tint[2], visibility
                    ));
                }
            }
        }

        out
    }
}
