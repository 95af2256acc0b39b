//! Focus/break countdown.
//!
//! The timer alternates between a 25 minute focus phase and a 5 minute break.
//! Reaching zero (or skipping) ends the phase and leaves the next one paused.
//! Only the count of finished focus sessions outlives the process; the owner
//! stores it when [`SessionOutcome::FocusCompleted`] is reported.

use std::time::{Duration, Instant};

pub const FOCUS_SECONDS: u32 = 25 * 60;
pub const BREAK_SECONDS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    pub fn duration_secs(self) -> u32 {
        match self {
            Phase::Focus => FOCUS_SECONDS,
            Phase::Break => BREAK_SECONDS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        }
    }
}

/// What ending a phase did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A focus session finished; `session_count` is the new total.
    FocusCompleted { session_count: u32 },
    BreakCompleted,
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    phase: Phase,
    running: bool,
    remaining_seconds: u32,
    session_count: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PomodoroTimer {
    /// A paused focus timer continuing from `session_count` finished sessions.
    pub fn new(session_count: u32) -> Self {
        PomodoroTimer {
            phase: Phase::Focus,
            running: false,
            remaining_seconds: FOCUS_SECONDS,
            session_count,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Advances one second. Returns the outcome if this tick ended the phase.
    pub fn tick(&mut self) -> Option<SessionOutcome> {
        if !self.running {
            return None;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            Some(self.complete_session())
        } else {
            None
        }
    }

    /// Ends the current phase immediately, as when the countdown expires.
    pub fn complete_session(&mut self) -> SessionOutcome {
        self.running = false;
        match self.phase {
            Phase::Focus => {
                self.session_count += 1;
                self.phase = Phase::Break;
                self.remaining_seconds = BREAK_SECONDS;
                tracing::info!(sessions = self.session_count, "focus session completed");
                SessionOutcome::FocusCompleted { session_count: self.session_count }
            }
            Phase::Break => {
                self.phase = Phase::Focus;
                self.remaining_seconds = FOCUS_SECONDS;
                tracing::info!("break completed");
                SessionOutcome::BreakCompleted
            }
        }
    }

    /// Restarts the current phase from its full length, paused.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.phase.duration_secs();
    }

    /// Fraction of the current phase already elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let total = f64::from(self.phase.duration_secs());
        (total - f64::from(self.remaining_seconds)) / total
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_seconds / 60, self.remaining_seconds % 60)
    }
}

/// The one-second tick generator driving a [`PomodoroTimer`].
///
/// Armed while the timer runs. The UI loop polls [`TickSource::due`] and
/// feeds that many ticks to the timer; disarming drops any partial second.
#[derive(Debug, Clone, Default)]
pub struct TickSource {
    last: Option<Instant>,
}

impl TickSource {
    pub const PERIOD: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting from `now`. Already armed: no-op.
    pub fn arm(&mut self, now: Instant) {
        if self.last.is_none() {
            self.last = Some(now);
        }
    }

    pub fn disarm(&mut self) {
        self.last = None;
    }

    pub fn is_armed(&self) -> bool {
        self.last.is_some()
    }

    /// Whole periods elapsed since the last emitted tick.
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(last) = self.last else { return 0 };
        let elapsed = now.saturating_duration_since(last);
        let ticks = (elapsed.as_millis() / Self::PERIOD.as_millis()) as u32;
        if ticks > 0 {
            self.last = Some(last + Self::PERIOD * ticks);
        }
        ticks
    }

    /// Time until the next tick, for use as a poll timeout.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.last
            .map(|last| (last + Self::PERIOD).saturating_duration_since(now))
    }

    /// Arms or disarms to follow the timer's running state.
    pub fn sync(&mut self, timer: &PomodoroTimer, now: Instant) {
        if timer.is_running() {
            self.arm(now);
        } else {
            self.disarm();
        }
    }
}

/// Feeds every due tick to `timer`, stopping early at a phase change.
///
/// Returns the outcome of the phase that ended, if any.
pub fn drive(timer: &mut PomodoroTimer, source: &mut TickSource, now: Instant) -> Option<SessionOutcome> {
    let ticks = source.due(now);
    for _ in 0..ticks {
        if let Some(outcome) = timer.tick() {
            source.disarm();
            return Some(outcome);
        }
    }
    source.sync(timer, now);
    None
}
