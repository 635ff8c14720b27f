//! Synthetic rig and operator console used by the `gaze-capture` binary.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use glam::Vec3;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::capture::synthetic::{
    BoxRaycaster, LoggingPrompt, LoggingSink, RandomWalkTracker, SceneBox, Stage, ToneCapture,
};
use crate::capture::{GazeSampler, TrackedObject};
use crate::export::SessionArchive;
use crate::geometry::{Mesh, ObjectTransform};
use crate::heatmap::{ColorLut, SurfaceProjector};
use crate::runtime::{CaptureRuntime, RuntimeController};
use crate::session::SessionPhaseController;
use crate::settings::CaptureSettings;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Where the object on display stands.
const VIEWING_POSITION: Vec3 = Vec3::new(0.0, 1.2, 1.5);

/// Demo artifacts and their sizes in metres.
const DEMO_OBJECTS: [(&str, Vec3); 3] = [
    ("haniwa", Vec3::new(0.4, 0.6, 0.4)),
    ("dogu", Vec3::new(0.3, 0.5, 0.2)),
    ("jomon_pot", Vec3::new(0.5, 0.5, 0.5)),
];

const TONE_HZ: f32 = 440.0;

const HELP: &str = "commands: s start | r reset | 2/4/5/6/8 answer | n next | p previous | \
                    g new session | h toggle heatmap | ? status | q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Answer(char),
    Next,
    Previous,
    NewSession,
    ToggleHeatmap,
    Status,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let mut chars = line.trim().chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(match first.to_ascii_lowercase() {
        's' => Command::Start,
        'r' => Command::Reset,
        'n' => Command::Next,
        'p' => Command::Previous,
        'g' => Command::NewSession,
        'h' => Command::ToggleHeatmap,
        '?' => Command::Status,
        'q' => Command::Quit,
        key if key.is_ascii_digit() => Command::Answer(key),
        _ => return None,
    })
}

/// Objects, rig and runtime for the demo scene.
pub fn build_rig(settings: &CaptureSettings) -> Result<(RuntimeController, Arc<Stage>)> {
    let lut = match &settings.heatmap.lookup_table {
        Some(path) => Some(Arc::new(ColorLut::from_image(path)?)),
        None => None,
    };

    let mut boxes = Vec::new();
    let mut objects = Vec::new();
    for (id, size) in DEMO_OBJECTS {
        let transform = ObjectTransform {
            position: VIEWING_POSITION,
            rotation_degrees: Vec3::ZERO,
            scale: size,
        };
        boxes.push(SceneBox {
            id: id.to_string(),
            transform,
            half_extents: Vec3::splat(0.5),
        });
        objects.push(TrackedObject::new(
            id,
            transform,
            Mesh::cuboid(Vec3::splat(0.5)),
            &settings.heatmap,
            lut.clone(),
        )?);
    }

    let stage = Stage::new(boxes)?;
    let sampler = GazeSampler::new(Box::new(RandomWalkTracker::new(stage.clone(), rand::random())));
    let projector = SurfaceProjector::new(
        Box::new(BoxRaycaster::new(stage.clone())),
        settings.heatmap.use_surface_lookup,
    );
    let controller = SessionPhaseController::new(
        settings,
        Box::new(ToneCapture::new(TONE_HZ)),
        Box::new(LoggingPrompt::default()),
    );

    let runtime = CaptureRuntime::new(
        objects,
        SessionArchive::new(settings.output_root.clone()),
        sampler,
        projector,
        Box::new(LoggingSink::default()),
        controller,
        settings.heatmap.live_display,
        settings.protocol.auto_advance,
    )?;

    let frame_interval = Duration::from_millis(settings.protocol.frame_interval_ms);
    Ok((RuntimeController::new(runtime, frame_interval), stage))
}

/// Run the console until `q` or end of input.
pub async fn drive(settings: CaptureSettings, settings_path: PathBuf) -> Result<()> {
    let (controller, stage) = build_rig(&settings)?;
    controller.spawn_ticker().await?;

    log_info!("settings loaded from {}", settings_path.display());
    log_info!("writing sessions under {}", settings.output_root.display());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sync = tokio::time::interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read operator input")? else {
                    break;
                };
                let Some(command) = parse_command(&line) else {
                    if !line.trim().is_empty() {
                        log_warn!("unknown command {:?}; {HELP}", line.trim());
                    }
                    continue;
                };
                if command == Command::Quit {
                    break;
                }
                if let Err(err) = apply(&controller, command).await {
                    log_error!("{err:#}");
                }
                stage.show(controller.snapshot().await.object_index);
            }
            _ = sync.tick() => {
                // Auto-advance switches objects inside the frame loop.
                stage.show(controller.snapshot().await.object_index);
            }
        }
    }

    controller.shutdown().await?;
    log_info!("gaze-capture stopped");
    Ok(())
}

async fn apply(controller: &RuntimeController, command: Command) -> Result<()> {
    match command {
        Command::Start => controller.press_start().await,
        Command::Reset => controller.press_reset().await,
        Command::Answer(key) => controller.press_answer(key).await,
        Command::Next => controller.next_object().await?,
        Command::Previous => controller.previous_object().await?,
        Command::NewSession => controller.new_session().await,
        Command::ToggleHeatmap => {
            let enabled = controller.toggle_live_display().await;
            log_info!("live heatmap {}", if enabled { "on" } else { "off" });
        }
        Command::Status => {
            let snapshot = controller.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Quit => {}
    }
    Ok(())
}
