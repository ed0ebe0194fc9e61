//! Hold-to-arm / release-to-start / press-to-stop timing state machine.
//!
//! ```text
//!   Idle --press--> Armed --release--> Running --press--> Finished
//!    ^                                                       |
//!    +------------------- press (FinishPolicy::Hold) --------+
//!            Armed <----- press (FinishPolicy::Rearm) -------+
//! ```
//!
//! Presses pass through a [`PressGate`] first: one inside the busy window or
//! the debounce window of the previous accepted press is rejected without a
//! transition. `Reset` aborts from any phase without recording anything.
//!
//! Windows and elapsed time are measured on the monotonic clock. The wall
//! clock only stamps when an attempt started, so stepping it never blocks
//! input or shortens a solve.

use crate::format::format_time;
use crate::solve::{NewSolve, PuzzleType, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, trace};

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;
pub const DEFAULT_BUSY_MS: u64 = 100;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 10;

/// Source of wall-clock and monotonic instants.
pub trait Clock {
    /// Wall-clock time, used for timestamps only. May jump.
    fn now(&self) -> SystemTime;
    /// Monotonic time, used for every duration.
    fn instant(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct ManualState {
    wall: SystemTime,
    mono: Instant,
}

/// Hand-driven clock; clones share the same state.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                wall: start,
                mono: Instant::now(),
            })),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moves both clocks forward.
    pub fn advance_ms(&self, ms: u64) {
        let mut state = self.state();
        state.wall += Duration::from_millis(ms);
        state.mono += Duration::from_millis(ms);
    }

    /// Steps the wall clock only, like an NTP or manual adjustment.
    pub fn set(&self, wall: SystemTime) {
        self.state().wall = wall;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.state().wall
    }

    fn instant(&self) -> Instant {
        self.state().mono
    }
}

/// Milliseconds from `start` to `end` on the monotonic clock, never negative.
pub fn elapsed_ms(start: Instant, end: Instant) -> u64 {
    end.saturating_duration_since(start).as_millis() as u64
}

/// What the collaborating store exposes to the timer at completion time.
pub trait AttemptContext {
    fn current_scramble(&self) -> Option<&str>;
    fn puzzle_type(&self) -> PuzzleType;
    /// Active session, falling back to the first one.
    fn destination(&self) -> Option<SessionId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed,
    Running,
    Finished,
}

/// What a press does once the timer shows a finished time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishPolicy {
    /// Keep the time on screen; the next press clears it back to Idle.
    #[default]
    Hold,
    /// The next press arms the following attempt straight away.
    Rearm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerInput {
    Press,
    Release,
    Reset,
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEffect {
    SolveCompleted(NewSolve),
    /// The attempt finished but there was no session to record it in.
    SolveDropped { time_ms: u64 },
    ScrambleRequested(PuzzleType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Still inside the processing lock of the previous press.
    Busy,
    /// Inside the debounce window of the previous press.
    Cooldown,
}

/// Result of feeding one input to the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub from: Phase,
    pub to: Phase,
    pub rejected: Option<Rejection>,
    pub effects: Vec<TimerEffect>,
}

impl Step {
    fn stay(phase: Phase) -> Self {
        Self {
            from: phase,
            to: phase,
            rejected: None,
            effects: vec![],
        }
    }

    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub debounce: Duration,
    pub busy: Duration,
    pub sample_interval: Duration,
    pub finish_policy: FinishPolicy,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            busy: Duration::from_millis(DEFAULT_BUSY_MS),
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            finish_policy: FinishPolicy::Hold,
        }
    }
}

/// Guard table for press events.
#[derive(Debug, Clone)]
pub struct PressGate {
    debounce: Duration,
    busy: Duration,
    last_accepted: Option<Instant>,
}

impl PressGate {
    pub fn new(debounce: Duration, busy: Duration) -> Self {
        Self {
            debounce,
            busy,
            last_accepted: None,
        }
    }

    /// Accepts the press at `now` (and starts a new window) or says why not.
    pub fn admit(&mut self, now: Instant) -> Result<(), Rejection> {
        if let Some(last) = self.last_accepted {
            let since = now.saturating_duration_since(last);
            if since < self.busy {
                return Err(Rejection::Busy);
            }
            if since < self.debounce {
                return Err(Rejection::Cooldown);
            }
        }
        self.last_accepted = Some(now);
        Ok(())
    }
}

/// Periodic refresh of the running time. Only exists while Running.
#[derive(Debug, Clone, Copy)]
struct Sampler {
    period: Duration,
    next_due: Instant,
}

impl Sampler {
    fn start(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }
}

#[derive(Debug)]
pub struct Timer<C: Clock> {
    clock: C,
    config: TimerConfig,
    phase: Phase,
    elapsed_ms: u64,
    started_at: Option<SystemTime>,
    started_mono: Option<Instant>,
    attempt_scramble: String,
    gate: PressGate,
    sampler: Option<Sampler>,
}

impl<C: Clock> Timer<C> {
    pub fn new(clock: C, config: TimerConfig) -> Self {
        Self {
            clock,
            gate: PressGate::new(config.debounce, config.busy),
            config,
            phase: Phase::Idle,
            elapsed_ms: 0,
            started_at: None,
            started_mono: None,
            attempt_scramble: String::new(),
            sampler: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Wall-clock start of the current attempt.
    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Whether the periodic sampler is live. True only while Running.
    pub fn is_sampling(&self) -> bool {
        self.sampler.is_some()
    }

    /// While arming or running the UI hides everything but the clock.
    pub fn is_focus_mode(&self) -> bool {
        matches!(self.phase, Phase::Armed | Phase::Running)
    }

    pub fn display(&self) -> String {
        match self.phase {
            Phase::Idle => format_time(0.0),
            Phase::Armed => "Ready...".to_string(),
            Phase::Running | Phase::Finished => format_time(self.elapsed_ms as f64),
        }
    }

    pub fn hint(&self) -> &'static str {
        match (self.phase, self.config.finish_policy) {
            (Phase::Idle, _) => "Hold space to ready",
            (Phase::Armed, _) => "Release space to start",
            (Phase::Running, _) => "Press space to stop",
            (Phase::Finished, FinishPolicy::Hold) => "Press space to clear",
            (Phase::Finished, FinishPolicy::Rearm) => "Hold space to ready",
        }
    }

    pub fn handle(&mut self, input: TimerInput, ctx: &dyn AttemptContext) -> Step {
        let now = self.clock.instant();
        let step = match input {
            TimerInput::Press => self.on_press(now, ctx),
            TimerInput::Release => self.on_release(now, ctx),
            TimerInput::Reset => self.on_reset(ctx),
            TimerInput::Tick => self.on_tick(now),
        };

        if step.changed() {
            debug!(?input, from = ?step.from, to = ?step.to, "timer transition");
        } else if let Some(reason) = step.rejected {
            trace!(?input, ?reason, phase = ?step.from, "press rejected");
        }
        step
    }

    fn on_press(&mut self, now: Instant, ctx: &dyn AttemptContext) -> Step {
        let from = self.phase;
        // holding the key in Armed produces repeats; they are not transitions
        if from == Phase::Armed {
            return Step::stay(from);
        }

        if let Err(reason) = self.gate.admit(now) {
            let mut step = Step::stay(from);
            step.rejected = Some(reason);
            return step;
        }

        match from {
            Phase::Idle => self.arm(from),
            Phase::Running => self.stop(now, ctx),
            Phase::Finished => match self.config.finish_policy {
                FinishPolicy::Hold => {
                    self.clear();
                    Step {
                        from,
                        to: Phase::Idle,
                        rejected: None,
                        effects: vec![],
                    }
                }
                FinishPolicy::Rearm => self.arm(from),
            },
            Phase::Armed => Step::stay(from),
        }
    }

    fn arm(&mut self, from: Phase) -> Step {
        self.clear();
        self.phase = Phase::Armed;
        Step {
            from,
            to: Phase::Armed,
            rejected: None,
            effects: vec![],
        }
    }

    fn on_release(&mut self, now: Instant, ctx: &dyn AttemptContext) -> Step {
        if self.phase != Phase::Armed {
            return Step::stay(self.phase);
        }

        self.phase = Phase::Running;
        self.started_at = Some(self.clock.now());
        self.started_mono = Some(now);
        self.elapsed_ms = 0;
        self.attempt_scramble = ctx.current_scramble().unwrap_or_default().to_string();
        self.sampler = Some(Sampler::start(now, self.config.sample_interval));

        Step {
            from: Phase::Armed,
            to: Phase::Running,
            rejected: None,
            effects: vec![],
        }
    }

    fn stop(&mut self, now: Instant, ctx: &dyn AttemptContext) -> Step {
        // the stopping instant is fixed before anything else happens
        let time_ms = self
            .started_mono
            .map(|start| elapsed_ms(start, now))
            .unwrap_or(0);

        self.sampler = None;
        self.elapsed_ms = time_ms;
        self.phase = Phase::Finished;

        let puzzle_type = ctx.puzzle_type();
        let mut effects = Vec::with_capacity(2);

        if time_ms > 0 {
            match ctx.destination() {
                Some(session_id) => {
                    info!(time_ms, %puzzle_type, session_id, "attempt completed");
                    effects.push(TimerEffect::SolveCompleted(NewSolve {
                        time_ms,
                        scramble: std::mem::take(&mut self.attempt_scramble),
                        puzzle_type,
                        session_id,
                    }));
                }
                None => effects.push(TimerEffect::SolveDropped { time_ms }),
            }
        }
        effects.push(TimerEffect::ScrambleRequested(puzzle_type));

        Step {
            from: Phase::Running,
            to: Phase::Finished,
            rejected: None,
            effects,
        }
    }

    fn on_reset(&mut self, ctx: &dyn AttemptContext) -> Step {
        let from = self.phase;
        self.clear();

        Step {
            from,
            to: Phase::Idle,
            rejected: None,
            effects: vec![TimerEffect::ScrambleRequested(ctx.puzzle_type())],
        }
    }

    fn on_tick(&mut self, now: Instant) -> Step {
        if let (Some(sampler), Some(start)) = (self.sampler.as_mut(), self.started_mono) {
            if sampler.poll(now) {
                self.elapsed_ms = elapsed_ms(start, now);
            }
        }
        Step::stay(self.phase)
    }

    fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.elapsed_ms = 0;
        self.started_at = None;
        self.started_mono = None;
        self.sampler = None;
        self.attempt_scramble.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Ctx {
        scramble: Option<String>,
        destination: Option<SessionId>,
    }

    impl AttemptContext for Ctx {
        fn current_scramble(&self) -> Option<&str> {
            self.scramble.as_deref()
        }
        fn puzzle_type(&self) -> PuzzleType {
            PuzzleType::ThreeByThree
        }
        fn destination(&self) -> Option<SessionId> {
            self.destination
        }
    }

    fn ctx() -> Ctx {
        Ctx {
            scramble: Some("R U R' U'".to_string()),
            destination: Some(7),
        }
    }

    fn timer(policy: FinishPolicy) -> (Timer<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let config = TimerConfig {
            finish_policy: policy,
            ..TimerConfig::default()
        };
        (Timer::new(clock.clone(), config), clock)
    }

    /// Arms, starts, and runs for `run_ms`, leaving the timer Running.
    fn start_running(t: &mut Timer<ManualClock>, clock: &ManualClock, c: &Ctx, run_ms: u64) {
        t.handle(TimerInput::Press, c);
        clock.advance_ms(500);
        t.handle(TimerInput::Release, c);
        clock.advance_ms(run_ms);
    }

    #[test]
    fn test_new_timer_is_idle() {
        let (t, _) = timer(FinishPolicy::Hold);
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.elapsed_ms(), 0);
        assert!(!t.is_sampling());
        assert_eq!(t.display(), "0.00");
    }

    #[test]
    fn test_full_attempt_emits_one_solve() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();

        let step = t.handle(TimerInput::Press, &c);
        assert_eq!((step.from, step.to), (Phase::Idle, Phase::Armed));
        assert_eq!(t.display(), "Ready...");

        clock.advance_ms(400);
        let step = t.handle(TimerInput::Release, &c);
        assert_eq!(step.to, Phase::Running);
        assert!(t.is_sampling());

        clock.advance_ms(12_345);
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!(step.to, Phase::Finished);
        assert_eq!(
            step.effects,
            vec![
                TimerEffect::SolveCompleted(NewSolve {
                    time_ms: 12_345,
                    scramble: "R U R' U'".to_string(),
                    puzzle_type: PuzzleType::ThreeByThree,
                    session_id: 7,
                }),
                TimerEffect::ScrambleRequested(PuzzleType::ThreeByThree),
            ]
        );
        assert!(!t.is_sampling());
        assert_eq!(t.display(), "12.34");
    }

    #[test]
    fn test_hold_policy_press_clears_to_idle() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 5_000);
        t.handle(TimerInput::Press, &c);

        clock.advance_ms(1_000);
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!((step.from, step.to), (Phase::Finished, Phase::Idle));
        assert_eq!(t.elapsed_ms(), 0);
    }

    #[test]
    fn test_rearm_policy_press_arms_next_attempt() {
        let (mut t, clock) = timer(FinishPolicy::Rearm);
        let c = ctx();
        start_running(&mut t, &clock, &c, 5_000);
        t.handle(TimerInput::Press, &c);

        clock.advance_ms(1_000);
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!((step.from, step.to), (Phase::Finished, Phase::Armed));
        assert_eq!(t.elapsed_ms(), 0);
    }

    #[test]
    fn test_double_fired_press_makes_one_transition() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 3_000);

        let first = t.handle(TimerInput::Press, &c);
        clock.advance_ms(30);
        let second = t.handle(TimerInput::Press, &c);

        assert!(first.changed());
        assert!(!second.changed());
        assert_eq!(second.rejected, Some(Rejection::Busy));
        assert_eq!(t.phase(), Phase::Finished);
    }

    #[test]
    fn test_press_inside_debounce_window_is_cooldown() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 3_000);
        t.handle(TimerInput::Press, &c);

        clock.advance_ms(150);
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!(step.rejected, Some(Rejection::Cooldown));
        assert_eq!(t.phase(), Phase::Finished);

        clock.advance_ms(60);
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!(step.to, Phase::Idle);
    }

    #[test]
    fn test_press_release_press_burst_does_not_stop() {
        // one physical keypress delivered as press, release, press
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();

        t.handle(TimerInput::Press, &c);
        clock.advance_ms(5);
        t.handle(TimerInput::Release, &c);
        clock.advance_ms(5);
        let step = t.handle(TimerInput::Press, &c);

        assert_eq!(step.rejected, Some(Rejection::Busy));
        assert_eq!(t.phase(), Phase::Running);
    }

    #[test]
    fn test_repeats_while_armed_are_ignored() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        t.handle(TimerInput::Press, &c);

        for _ in 0..20 {
            clock.advance_ms(250);
            let step = t.handle(TimerInput::Press, &c);
            assert!(!step.changed());
            assert_eq!(step.rejected, None);
        }
        assert_eq!(t.phase(), Phase::Armed);
    }

    #[test]
    fn test_release_outside_armed_is_noop() {
        let (mut t, _) = timer(FinishPolicy::Hold);
        let step = t.handle(TimerInput::Release, &ctx());
        assert!(!step.changed());
        assert_eq!(t.phase(), Phase::Idle);
    }

    #[test]
    fn test_reset_while_running_records_nothing() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 2_000);
        t.handle(TimerInput::Tick, &c);
        assert!(t.elapsed_ms() > 0);

        let step = t.handle(TimerInput::Reset, &c);
        assert_eq!((step.from, step.to), (Phase::Running, Phase::Idle));
        assert!(!step
            .effects
            .iter()
            .any(|e| matches!(e, TimerEffect::SolveCompleted(_))));
        assert_eq!(
            step.effects,
            vec![TimerEffect::ScrambleRequested(PuzzleType::ThreeByThree)]
        );
        assert!(!t.is_sampling());
        assert_eq!(t.elapsed_ms(), 0);

        // ticks after reset never move the display
        clock.advance_ms(1_000);
        t.handle(TimerInput::Tick, &c);
        assert_eq!(t.elapsed_ms(), 0);
    }

    #[test]
    fn test_reset_while_armed() {
        let (mut t, _) = timer(FinishPolicy::Hold);
        let c = ctx();
        t.handle(TimerInput::Press, &c);
        let step = t.handle(TimerInput::Reset, &c);
        assert_eq!(step.to, Phase::Idle);
        assert!(!t.is_sampling());
    }

    #[test]
    fn test_tick_samples_on_period() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 0);

        clock.advance_ms(4);
        t.handle(TimerInput::Tick, &c);
        assert_eq!(t.elapsed_ms(), 0);

        clock.advance_ms(6);
        t.handle(TimerInput::Tick, &c);
        assert_eq!(t.elapsed_ms(), 10);

        clock.advance_ms(25);
        t.handle(TimerInput::Tick, &c);
        assert_eq!(t.elapsed_ms(), 35);
    }

    #[test]
    fn test_stop_uses_stopping_instant_not_last_sample() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 1_000);
        t.handle(TimerInput::Tick, &c);
        clock.advance_ms(7);

        let step = t.handle(TimerInput::Press, &c);
        assert_matches!(
            step.effects.first(),
            Some(TimerEffect::SolveCompleted(NewSolve { time_ms: 1_007, .. }))
        );
    }

    #[test]
    fn test_no_destination_drops_solve() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = Ctx {
            scramble: Some("U".to_string()),
            destination: None,
        };
        start_running(&mut t, &clock, &c, 9_000);

        let step = t.handle(TimerInput::Press, &c);
        assert_eq!(step.to, Phase::Finished);
        assert_eq!(
            step.effects,
            vec![
                TimerEffect::SolveDropped { time_ms: 9_000 },
                TimerEffect::ScrambleRequested(PuzzleType::ThreeByThree),
            ]
        );
    }

    #[test]
    fn test_wall_clock_step_back_does_not_block_stop() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 5_000);

        // wall clock jumps ten seconds into the past mid-attempt
        clock.set(clock.now() - Duration::from_secs(10));
        clock.advance_ms(100);
        let step = t.handle(TimerInput::Press, &c);

        assert_eq!((step.from, step.to), (Phase::Running, Phase::Finished));
        assert_eq!(step.rejected, None);
        assert_matches!(
            step.effects.first(),
            Some(TimerEffect::SolveCompleted(NewSolve { time_ms: 5_100, .. }))
        );
    }

    #[test]
    fn test_wall_clock_step_back_does_not_stall_sampling() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 1_000);
        t.handle(TimerInput::Tick, &c);
        assert_eq!(t.elapsed_ms(), 1_000);

        clock.set(clock.now() - Duration::from_secs(3_600));
        clock.advance_ms(20);
        t.handle(TimerInput::Tick, &c);
        assert_eq!(t.elapsed_ms(), 1_020);
    }

    #[test]
    fn test_wall_clock_step_forward_keeps_gate_windows() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        start_running(&mut t, &clock, &c, 3_000);
        t.handle(TimerInput::Press, &c);

        // an hour of wall time passes in 30 ms of real time
        clock.set(clock.now() + Duration::from_secs(3_600));
        clock.advance_ms(30);
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!(step.rejected, Some(Rejection::Busy));
        assert_eq!(t.elapsed_ms(), 3_000);
    }

    #[test]
    fn test_zero_elapsed_emits_no_solve() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let c = ctx();
        t.handle(TimerInput::Press, &c);
        clock.advance_ms(300);
        t.handle(TimerInput::Release, &c);

        // same instant as the start
        let step = t.handle(TimerInput::Press, &c);
        assert_eq!(step.to, Phase::Finished);
        assert_eq!(
            step.effects,
            vec![TimerEffect::ScrambleRequested(PuzzleType::ThreeByThree)]
        );
    }

    #[test]
    fn test_scramble_captured_when_attempt_starts() {
        let (mut t, clock) = timer(FinishPolicy::Hold);
        let mut c = ctx();
        start_running(&mut t, &clock, &c, 2_000);

        // a fresh scramble arriving mid-attempt belongs to the next attempt
        c.scramble = Some("F2 B2".to_string());
        let step = t.handle(TimerInput::Press, &c);
        assert_matches!(
            step.effects.first(),
            Some(TimerEffect::SolveCompleted(NewSolve { scramble, .. })) if scramble == "R U R' U'"
        );
    }

    #[test]
    fn test_hints_follow_phase() {
        let (mut t, _) = timer(FinishPolicy::Hold);
        assert_eq!(t.hint(), "Hold space to ready");
        t.handle(TimerInput::Press, &ctx());
        assert_eq!(t.hint(), "Release space to start");
        assert!(t.is_focus_mode());
    }

    #[test]
    fn test_elapsed_ms_clamps() {
        let start = Instant::now();
        let end = start + Duration::from_millis(25);
        assert_eq!(elapsed_ms(start, end), 25);
        assert_eq!(elapsed_ms(end, start), 0);
    }

    #[test]
    fn test_gate_accepts_after_window() {
        let mut gate = PressGate::new(Duration::from_millis(200), Duration::from_millis(100));
        let t0 = Instant::now();
        assert_eq!(gate.admit(t0), Ok(()));
        assert_eq!(gate.admit(t0 + Duration::from_millis(99)), Err(Rejection::Busy));
        assert_eq!(gate.admit(t0 + Duration::from_millis(100)), Err(Rejection::Cooldown));
        assert_eq!(gate.admit(t0 + Duration::from_millis(200)), Ok(()));
    }
}
