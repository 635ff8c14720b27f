//! Frame-stepped paint jobs.
//!
//! Each gaze update becomes a job that runs one step per frame: prepare
//! (lazy clear), one step per quadrant sweep, then a flush that marks the
//! buffer dirty for the rendering sink. Jobs overlap freely because every
//! step only adds to texels.

use std::collections::VecDeque;

use super::buffer::{HeatmapBuffer, Quadrant, TexelCenter};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStep {
    Prepare,
    Sweep(Quadrant),
    Flush,
}

impl PaintStep {
    const SEQUENCE: [PaintStep; 6] = [
        PaintStep::Prepare,
        PaintStep::Sweep(Quadrant::ALL[0]),
        PaintStep::Sweep(Quadrant::ALL[1]),
        PaintStep::Sweep(Quadrant::ALL[2]),
        PaintStep::Sweep(Quadrant::ALL[3]),
        PaintStep::Flush,
    ];
}

#[derive(Debug, Clone, Copy)]
struct PaintJob {
    center: TexelCenter,
    next: usize,
}

impl PaintJob {
    /// Runs the next step; returns true once the job has flushed.
    fn advance(&mut self, buffer: &mut HeatmapBuffer) -> bool {
        match PaintStep::SEQUENCE[self.next] {
            PaintStep::Prepare => buffer.prepare_paint(),
            PaintStep::Sweep(quadrant) => {
                buffer.sweep(self.center, quadrant);
            }
            PaintStep::Flush => buffer.mark_dirty(),
        }
        self.next += 1;
        self.next == PaintStep::SEQUENCE.len()
    }
}

#[derive(Debug)]
pub struct PaintQueue {
    jobs: VecDeque<PaintJob>,
    capacity: usize,
    dropped: u64,
}

impl PaintQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Queue a paint at `(u, v)`. Returns false, dropping the update, when
    /// the coordinate is not finite or the queue already holds `capacity` jobs.
    pub fn enqueue(&mut self, buffer: &HeatmapBuffer, u: f32, v: f32) -> bool {
        let Some(center) = buffer.texel_center(u, v) else {
            log_debug!("ignoring paint at non-finite ({u}, {v})");
            return false;
        };
        if self.jobs.len() >= self.capacity {
            self.dropped += 1;
            log_debug!("paint queue full, dropping update at ({u:.3}, {v:.3})");
            return false;
        }
        self.jobs.push_back(PaintJob {
            center,
            next: 0,
        });
        true
    }

    /// Advance every in-flight job by one step, oldest first.
    pub fn step(&mut self, buffer: &mut HeatmapBuffer) {
        self.jobs.retain_mut(|job| !job.advance(buffer));
    }

    /// Run every queued job to completion.
    pub fn drain(&mut self, buffer: &mut HeatmapBuffer) {
        while !self.jobs.is_empty() {
            self.step(buffer);
        }
    }

    pub fn cancel_all(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
