use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::session::PhaseEvent;

use super::frame::{CaptureRuntime, FrameInput, RuntimeSnapshot};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Operator input waiting for the next frame boundary.
#[derive(Debug, Default, Clone, Copy)]
struct PendingInput {
    answer_key: Option<char>,
    start: bool,
    reset: bool,
}

/// Owns the frame ticker and funnels operator commands into it.
#[derive(Clone)]
pub struct RuntimeController {
    runtime: Arc<Mutex<CaptureRuntime>>,
    pending: Arc<Mutex<PendingInput>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    cancel_token: Arc<Mutex<Option<CancellationToken>>>,
    frame_interval: Duration,
}

impl RuntimeController {
    pub fn new(runtime: CaptureRuntime, frame_interval: Duration) -> Self {
        Self {
            runtime: Arc::new(Mutex::new(runtime)),
            pending: Arc::new(Mutex::new(PendingInput::default())),
            ticker: Arc::new(Mutex::new(None)),
            cancel_token: Arc::new(Mutex::new(None)),
            frame_interval,
        }
    }

    pub async fn spawn_ticker(&self) -> Result<()> {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            bail!("frame ticker already running");
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(frame_loop(
            self.runtime.clone(),
            self.pending.clone(),
            self.frame_interval,
            token.clone(),
        ));

        *ticker = Some(handle);
        *self.cancel_token.lock().await = Some(token);
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(token) = self.cancel_token.lock().await.take() {
            token.cancel();
        }

        let handle = self.ticker.lock().await.take();
        if let Some(handle) = handle {
            handle.await.context("frame loop task failed to join")?;
        }

        // Nothing recorded after shutdown may reach disk.
        self.runtime.lock().await.reset();
        Ok(())
    }

    pub async fn press_start(&self) {
        self.pending.lock().await.start = true;
    }

    pub async fn press_reset(&self) {
        let mut pending = self.pending.lock().await;
        pending.reset = true;
        pending.start = false;
    }

    pub async fn press_answer(&self, key: char) {
        self.pending.lock().await.answer_key = Some(key);
    }

    pub async fn next_object(&self) -> Result<()> {
        self.runtime.lock().await.next()
    }

    pub async fn previous_object(&self) -> Result<()> {
        self.runtime.lock().await.previous()
    }

    pub async fn new_session(&self) {
        *self.pending.lock().await = PendingInput::default();
        self.runtime.lock().await.select_session();
    }

    /// Flip the live heatmap display; returns the new state.
    pub async fn toggle_live_display(&self) -> bool {
        let mut runtime = self.runtime.lock().await;
        let enabled = !runtime.live_display();
        runtime.set_live_display(enabled);
        enabled
    }

    pub async fn snapshot(&self) -> RuntimeSnapshot {
        self.runtime.lock().await.snapshot()
    }
}

async fn frame_loop(
    runtime: Arc<Mutex<CaptureRuntime>>,
    pending: Arc<Mutex<PendingInput>>,
    frame_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;

                let input = std::mem::take(&mut *pending.lock().await);
                let frame = FrameInput {
                    dt,
                    answer_key: input.answer_key,
                    start: input.start,
                    reset: input.reset,
                };

                match runtime.lock().await.frame(frame) {
                    Ok(events) => events.iter().for_each(log_event),
                    Err(err) => log_error!("frame failed: {err:#}"),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("frame loop shutting down");
                break;
            }
        }
    }
}

fn log_event(event: &PhaseEvent) {
    match event {
        PhaseEvent::Started { object_id } => log_info!("viewing {object_id}"),
        PhaseEvent::AnswerLatched { object_id, answer } => {
            log_info!("{object_id}: answered {answer:?}")
        }
        PhaseEvent::SpeakingStarted { object_id } => log_info!("{object_id}: speaking"),
        PhaseEvent::Exported(summary) => log_info!("archive written to {}", summary.dir.display()),
        PhaseEvent::Recorded { object_id } => log_info!("{object_id} recorded"),
        PhaseEvent::Aborted { object_id } => log_info!("{object_id} aborted"),
    }
}
