use clap::{Parser, Subcommand};
use cubescene_input::{Action, ActionState};
use cubescene_kernel::{CameraSnapshot, FrameInput, MovementMode, StepReport, World};
use cubescene_render::{DebugTextRenderer, FramePlan, RenderSettings, Renderer};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubescene-cli", about = "Headless tools for the cube scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene info
    Info,
    /// Step the world with scripted input and print the result
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct SimulateArgs {
    /// Number of frames to step
    #[arg(short, long, default_value = "60")]
    frames: u64,
    /// Seconds per frame
    #[arg(long, default_value = "0.016", value_parser = positive_seconds)]
    dt: f32,
    /// Hold the forward key every frame
    #[arg(long)]
    forward: bool,
    /// Hold the strafe-right key every frame
    #[arg(long)]
    strafe_right: bool,
    /// Press jump on this frame (0-based)
    #[arg(long)]
    jump_at: Option<u64>,
    /// Fly instead of walk
    #[arg(long)]
    fly: bool,
    /// Print one JSON object per frame instead of the final frame dump
    #[arg(long)]
    json: bool,
}

fn positive_seconds(s: &str) -> Result<f32, String> {
    let dt: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(format!("frame time must be a positive number of seconds, got {s}"))
    }
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    #[serde(flatten)]
    camera: CameraSnapshot,
    moved: bool,
    blocked: bool,
    jumped: bool,
}

impl FrameRecord {
    fn new(report: StepReport, camera: CameraSnapshot) -> Self {
        Self {
            camera,
            moved: report.moved,
            blocked: report.blocked,
            jumped: report.jumped,
        }
    }
}

/// Run the scripted input against a demo world, calling `on_frame` after each step.
fn simulate(args: &SimulateArgs, mut on_frame: impl FnMut(FrameRecord)) -> World {
    let mode = if args.fly { MovementMode::Fly } else { MovementMode::Walk };
    let mut world = World::demo(mode);
    let mut actions = ActionState::new();
    actions.set(Action::MoveForward, args.forward);
    actions.set(Action::StrafeRight, args.strafe_right);

    for frame in 0..args.frames {
        actions.set(Action::Up, args.jump_at == Some(frame));
        let input = FrameInput::from_actions(&actions, (0.0, 0.0));
        let report = world.step(&input, args.dt);
        on_frame(FrameRecord::new(report, world.snapshot()));
    }
    world
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let world = World::demo(MovementMode::Walk);
            let settings = RenderSettings::default();
            let camera = world.snapshot();
            println!("cubescene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cubescene_render::crate_info());
            println!("scene: {} objects", world.scene().objects().len());
            println!(
                "camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1}",
                camera.position.x, camera.position.y, camera.position.z, camera.yaw, camera.pitch
            );
            println!(
                "fog: start={} end={} skybox={}",
                settings.fog.start, settings.fog.end, settings.skybox
            );
        }
        Commands::Simulate(args) => {
            tracing::info!(?args, "simulating");
            let mut failed = None;
            let world = simulate(&args, |record| {
                if args.json && failed.is_none() {
                    match serde_json::to_string(&record) {
                        Ok(line) => println!("{line}"),
                        Err(e) => failed = Some(e),
                    }
                }
            });
            if let Some(e) = failed {
                return Err(e.into());
            }
            if !args.json {
                let plan = FramePlan::build(&world, &RenderSettings::default(), 16.0 / 9.0);
                print!("{}", DebugTextRenderer::new().render(&plan));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(frames: u64) -> SimulateArgs {
        SimulateArgs {
            frames,
            dt: 0.05,
            forward: false,
            strafe_right: false,
            jump_at: None,
            fly: false,
            json: false,
        }
    }

    #[test]
    fn idle_run_keeps_camera_still() {
        let mut records = Vec::new();
        let world = simulate(&args(5), |r| records.push(r));
        assert_eq!(records.len(), 5);
        assert_eq!(world.frame(), 5);
        assert!(records.iter().all(|r| !r.moved && !r.jumped));
    }

    #[test]
    fn jump_frame_reports_jump_once() {
        let mut records = Vec::new();
        simulate(
            &SimulateArgs {
                jump_at: Some(2),
                ..args(6)
            },
            |r| records.push(r),
        );
        let jumps: Vec<u64> = records
            .iter()
            .filter(|r| r.jumped)
            .map(|r| r.camera.frame)
            .collect();
        assert_eq!(jumps, vec![3]);
        assert!(!records[2].camera.grounded);
    }

    #[test]
    fn record_serializes_flat() {
        let mut line = String::new();
        simulate(&args(1), |r| {
            line = serde_json::to_string(&r).unwrap_or_default();
        });
        assert!(line.contains("\"frame\":1"));
        assert!(line.contains("\"position\""));
        assert!(line.contains("\"blocked\":false"));
    }

    #[test]
    fn frame_time_must_be_positive() {
        for bad in ["--dt=0", "--dt=-0.5", "--dt=NaN", "--dt=fast"] {
            assert!(
                Cli::try_parse_from(["cubescene-cli", "simulate", bad]).is_err(),
                "{bad} accepted"
            );
        }
        let cli = Cli::try_parse_from(["cubescene-cli", "simulate", "--dt=0.05"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Simulate(SimulateArgs { dt, .. })) if dt == 0.05
        ));
    }
}
