use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Viewing,
    /// Viewing window after an answer has been latched.
    Reacting,
    Speaking,
    Exporting,
}

impl Phase {
    pub fn is_active(self) -> bool {
        self != Phase::Idle
    }
}

/// Window the countdown was in at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Viewing,
    Speaking,
    Finished,
}

/// Single countdown over `view + speak` seconds, pivoting at `speak`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimer {
    view_secs: f32,
    speak_secs: f32,
    remaining: f32,
}

impl PhaseTimer {
    pub fn new(view_secs: f32, speak_secs: f32) -> Self {
        Self {
            view_secs,
            speak_secs,
            remaining: view_secs + speak_secs,
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.view_secs + self.speak_secs;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn speak_secs(&self) -> f32 {
        self.speak_secs
    }

    /// Seconds left in the viewing window; zero once speaking.
    pub fn viewing_remaining(&self) -> f32 {
        (self.remaining - self.speak_secs).max(0.0)
    }

    pub fn window(&self) -> Window {
        if self.remaining > self.speak_secs {
            Window::Viewing
        } else if self.remaining > 0.0 {
            Window::Speaking
        } else {
            Window::Finished
        }
    }

    /// Returns the window in force before counting down by `dt`.
    pub fn advance(&mut self, dt: f32) -> Window {
        let window = self.window();
        if window != Window::Finished {
            self.remaining -= dt;
        }
        window
    }

    #[cfg(test)]
    pub(crate) fn set_remaining(&mut self, remaining: f32) {
        self.remaining = remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_is_compared_before_decrement() {
        let mut timer = PhaseTimer::new(60.0, 45.0);

        timer.set_remaining(45.01);
        assert_eq!(timer.advance(0.016), Window::Viewing);

        timer.set_remaining(45.0);
        assert_eq!(timer.advance(0.016), Window::Speaking);

        timer.set_remaining(0.0);
        assert_eq!(timer.advance(0.016), Window::Finished);
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn reset_restores_full_countdown() {
        let mut timer = PhaseTimer::new(1.0, 0.5);
        timer.advance(1.0);
        assert_eq!(timer.viewing_remaining(), 0.0);
        assert_eq!(timer.window(), Window::Speaking);

        timer.reset();
        assert_eq!(timer.remaining(), 1.5);
        assert_eq!(timer.viewing_remaining(), 1.0);
    }

    #[test]
    fn countdown_walks_all_windows() {
        let mut timer = PhaseTimer::new(0.75, 0.5);
        let windows: Vec<_> = (0..6).map(|_| timer.advance(0.25)).collect();
        assert_eq!(
            windows,
            [
                Window::Viewing,
                Window::Viewing,
                Window::Viewing,
                Window::Speaking,
                Window::Speaking,
                Window::Finished,
            ]
        );
    }
}
