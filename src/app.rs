use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::format::{format_solve, format_time, parse_time};
use crate::runtime::AppEvent;
use crate::scramble::{ScrambleResult, ScrambleWorker};
use crate::session::SessionBook;
use crate::solve::{NewSolve, Penalty, Solve};
use crate::stats::{
    compute_statistics, time_distribution, time_series, DistributionBin, Statistics,
};
use crate::store::{SolveStore, StoreError};
use crate::timer::{
    elapsed_ms, AttemptContext, Clock, Phase, Timer, TimerEffect, TimerInput,
};

const MAX_NOTICES: usize = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum View {
    #[default]
    Timer,
    History,
    Stats,
}

impl View {
    pub fn next(self) -> View {
        match self {
            View::Timer => View::History,
            View::History => View::Stats,
            View::Stats => View::Timer,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Timer => "Timer",
            View::History => "History",
            View::Stats => "Statistics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message shown under the timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub posted_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    RenameSession,
    AddTime,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::RenameSession => "Rename session",
            PromptKind::AddTime => "Add time (M:SS.cc)",
        }
    }
}

/// One-line text entry opened from the history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// Composition root: owns the timer, the session book and the collaborators,
/// and routes every event between them.
pub struct App<C: Clock + Clone> {
    clock: C,
    timer: Timer<C>,
    book: SessionBook,
    store: Box<dyn SolveStore>,
    scrambler: ScrambleWorker,
    notices: Vec<Notice>,
    view: View,
    selected: usize,
    prompt: Option<Prompt>,
    config: Config,
    quit: bool,
}

impl<C: Clock + Clone> App<C> {
    pub fn new(
        clock: C,
        config: &Config,
        mut store: Box<dyn SolveStore>,
        scrambler: ScrambleWorker,
    ) -> Result<Self, StoreError> {
        let sessions = store.ensure_default_sessions()?;
        let mut book = SessionBook::new(sessions, config.puzzle_type);
        if let Some(first) = book.sessions().first().map(|s| s.id) {
            book.set_active(first);
        }
        info!(
            sessions = book.sessions().len(),
            puzzle = %config.puzzle_type,
            "app initialised"
        );

        let mut app = Self {
            timer: Timer::new(clock.clone(), config.timer_config()),
            clock,
            book,
            store,
            scrambler,
            notices: Vec::new(),
            view: View::default(),
            selected: 0,
            prompt: None,
            config: config.clone(),
            quit: false,
        };
        app.request_scramble();
        Ok(app)
    }

    pub fn timer(&self) -> &Timer<C> {
        &self.timer
    }

    pub fn book(&self) -> &SessionBook {
        &self.book
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Most recent notice still on screen.
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Index into [`App::history`] of the highlighted row.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Active session's solves, newest first.
    pub fn history(&self) -> Vec<&Solve> {
        self.book.active_solves().iter().rev().collect()
    }

    /// Text entry in progress, if any.
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn selected_solve(&self) -> Option<&Solve> {
        self.book.active_solves().iter().rev().nth(self.selected)
    }

    pub fn session_stats(&self) -> Statistics {
        compute_statistics(self.book.active_solves())
    }

    pub fn overall_stats(&self) -> Statistics {
        compute_statistics(&self.book.overall_solves())
    }

    pub fn distribution(&self) -> Vec<DistributionBin> {
        time_distribution(
            self.book.active_solves(),
            self.config.histogram_bins,
            self.config.bin_edge,
        )
    }

    pub fn series(&self) -> Vec<(f64, f64)> {
        time_series(self.book.active_solves())
    }

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Scramble(result) => self.on_scramble(result),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // an open prompt takes every key, space included
        if self.prompt.is_some() {
            if key.kind == KeyEventKind::Press {
                self.on_prompt_key(key);
            }
            return;
        }

        if key.code == KeyCode::Char(' ') {
            match key.kind {
                KeyEventKind::Press if self.view == View::Timer => {
                    self.drive_timer(TimerInput::Press)
                }
                KeyEventKind::Release if self.view == View::Timer => {
                    self.drive_timer(TimerInput::Release)
                }
                _ => {}
            }
            return;
        }

        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }

        if matches!(key.code, KeyCode::Esc | KeyCode::Char('r')) {
            self.drive_timer(TimerInput::Reset);
            return;
        }

        // arming or running: only the clock keys above do anything
        if self.timer.is_focus_mode() {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('p') => self.cycle_puzzle(),
            KeyCode::Char('s') => self.cycle_session(1),
            KeyCode::Char('S') => self.cycle_session(-1),
            KeyCode::Char('n') => self.new_session(),
            _ if self.view == View::History => self.on_history_key(key.code),
            _ => {}
        }
    }

    fn on_history_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.book.active_solves().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Char('2') => self.toggle_penalty(Penalty::PlusTwo),
            KeyCode::Char('d') => self.toggle_penalty(Penalty::Dnf),
            KeyCode::Char('c') => {
                if let Some(current) = self.selected_solve().map(|s| s.penalty) {
                    self.set_penalty(Penalty::cycle(current));
                }
            }
            KeyCode::Char('x') => self.delete_selected(),
            KeyCode::Char('X') => self.delete_active_session(),
            KeyCode::Char('R') => {
                if let Some(name) = self.book.active().map(|s| s.name.clone()) {
                    self.open_prompt(PromptKind::RenameSession, name);
                }
            }
            KeyCode::Char('a') => self.open_prompt(PromptKind::AddTime, String::new()),
            KeyCode::Char('t') => self.retype_active_session(),
            _ => {}
        }
    }

    fn open_prompt(&mut self, kind: PromptKind, input: String) {
        self.prompt = Some(Prompt { kind, input });
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        match prompt.kind {
            PromptKind::RenameSession => self.rename_active_session(prompt.input.trim()),
            PromptKind::AddTime => self.add_manual_time(&prompt.input),
        }
    }

    fn rename_active_session(&mut self, name: &str) {
        if name.is_empty() {
            self.post(NoticeLevel::Warning, "Session name cannot be empty");
            return;
        }
        let Some(id) = self.book.active_id() else {
            return;
        };
        match self.store.rename_session(id, name) {
            Ok(()) => {
                self.book.rename_session(id, name);
                self.post(NoticeLevel::Info, format!("Session renamed to \"{name}\""));
            }
            Err(e) => {
                error!(error = %e, session_id = id, "failed to rename session");
                self.post(NoticeLevel::Error, "Failed to rename session");
            }
        }
    }

    /// Tags the active session with the puzzle currently being scrambled.
    fn retype_active_session(&mut self) {
        let Some(id) = self.book.active_id() else {
            return;
        };
        let puzzle = self.book.puzzle_type();
        match self.store.retype_session(id, puzzle) {
            Ok(()) => {
                self.book.retype_session(id, puzzle);
                self.post(
                    NoticeLevel::Info,
                    format!("Session puzzle set to {}", puzzle.display_name()),
                );
            }
            Err(e) => {
                error!(error = %e, session_id = id, "failed to retype session");
                self.post(NoticeLevel::Error, "Failed to update session");
            }
        }
    }

    /// Records a time typed in by hand against the current scramble.
    fn add_manual_time(&mut self, input: &str) {
        let time_ms = match parse_time(input) {
            Ok(0) => {
                self.post(NoticeLevel::Warning, "Time must be greater than zero");
                return;
            }
            Ok(ms) => ms,
            Err(e) => {
                debug!(error = %e, "manual time rejected");
                self.post(NoticeLevel::Error, format!("Invalid time: {e}"));
                return;
            }
        };
        let Some(session_id) = self.book.destination() else {
            self.post(NoticeLevel::Warning, "No session to record solve");
            return;
        };

        let solve = NewSolve {
            time_ms,
            scramble: self.book.current_scramble().unwrap_or_default().to_string(),
            puzzle_type: self.book.puzzle_type(),
            session_id,
        };
        self.record_solve(solve);
        self.request_scramble();
    }

    fn on_tick(&mut self) {
        self.drive_timer(TimerInput::Tick);
        self.expire_notices();
    }

    fn drive_timer(&mut self, input: TimerInput) {
        let step = self.timer.handle(input, &self.book);
        for effect in step.effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: TimerEffect) {
        match effect {
            TimerEffect::SolveCompleted(solve) => self.record_solve(solve),
            TimerEffect::SolveDropped { time_ms } => {
                warn!(time_ms, "no session to record solve");
                self.post(NoticeLevel::Warning, "No session to record solve");
            }
            TimerEffect::ScrambleRequested(_) => self.request_scramble(),
        }
    }

    /// The timer has already moved on; a failed write only produces a notice.
    fn record_solve(&mut self, solve: NewSolve) {
        match self.store.append_solve(&solve) {
            Ok(saved) => {
                let shown = format_time(saved.time_ms as f64);
                if !self.book.push_solve(saved) {
                    warn!(session_id = solve.session_id, "recorded solve for unknown session");
                }
                self.selected = 0;
                self.post(NoticeLevel::Info, format!("Solve recorded: {shown}"));
            }
            Err(e) => {
                error!(error = %e, time_ms = solve.time_ms, "failed to record solve");
                self.post(NoticeLevel::Error, "Failed to record solve");
            }
        }
    }

    fn toggle_penalty(&mut self, penalty: Penalty) {
        let Some(current) = self.selected_solve().map(|s| s.penalty) else {
            return;
        };
        let next = if current == Some(penalty) {
            None
        } else {
            Some(penalty)
        };
        self.set_penalty(next);
    }

    fn set_penalty(&mut self, penalty: Option<Penalty>) {
        let Some(id) = self.selected_solve().map(|s| s.id) else {
            return;
        };
        match self.store.update_penalty(id, penalty) {
            Ok(updated) => {
                let shown = format_solve(&updated);
                self.book.replace_solve(updated);
                self.post(NoticeLevel::Info, format!("Solve updated: {shown}"));
            }
            Err(e) => {
                error!(error = %e, solve_id = id, "failed to update penalty");
                self.post(NoticeLevel::Error, "Failed to update solve");
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_solve().map(|s| s.id) else {
            return;
        };
        match self.store.delete_solve(id) {
            Ok(()) => {
                self.book.remove_solve(id);
                self.clamp_selection();
                self.post(NoticeLevel::Info, "Solve deleted");
            }
            Err(e) => {
                error!(error = %e, solve_id = id, "failed to delete solve");
                self.post(NoticeLevel::Error, "Failed to delete solve");
            }
        }
    }

    fn new_session(&mut self) {
        let count = self.book.sessions().len();
        let name = (count + 1..)
            .map(|n| format!("Session {n}"))
            .find(|name| self.book.session_by_name(name).is_none())
            .unwrap_or_else(|| format!("Session {}", count + 1));

        match self.store.create_session(&name, self.book.puzzle_type()) {
            Ok(session) => {
                let id = session.id;
                self.book.insert_session(session);
                self.book.set_active(id);
                self.selected = 0;
                self.post(NoticeLevel::Info, format!("Session \"{name}\" created"));
            }
            Err(e) => {
                error!(error = %e, "failed to create session");
                self.post(NoticeLevel::Error, "Failed to create session");
            }
        }
    }

    fn delete_active_session(&mut self) {
        let Some((id, name)) = self.book.active().map(|s| (s.id, s.name.clone())) else {
            return;
        };
        match self.store.delete_session(id) {
            Ok(()) => {
                self.book.remove_session(id);
                self.selected = 0;
                self.post(NoticeLevel::Info, format!("Session \"{name}\" deleted"));
            }
            Err(e) => {
                error!(error = %e, session_id = id, "failed to delete session");
                self.post(NoticeLevel::Error, "Failed to delete session");
            }
        }
    }

    fn cycle_puzzle(&mut self) {
        let next = self.book.puzzle_type().next();
        self.book.set_puzzle_type(next);
        debug!(puzzle = %next, "puzzle changed");
        self.request_scramble();
    }

    fn cycle_session(&mut self, offset: isize) {
        if let Some(id) = self.book.cycle_active(offset) {
            debug!(session_id = id, "active session changed");
            self.selected = 0;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.book.active_solves().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn request_scramble(&mut self) {
        self.book.set_scramble(None);
        self.scrambler.request(self.book.puzzle_type());
    }

    fn on_scramble(&mut self, result: ScrambleResult) {
        if !self.scrambler.is_current(&result) || result.puzzle != self.book.puzzle_type() {
            trace!(seq = result.seq, "stale scramble dropped");
            return;
        }
        self.book.set_scramble(Some(result.scramble));
    }

    fn post(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
            posted_at: self.clock.instant(),
        });
        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }

    fn expire_notices(&mut self) {
        let now = self.clock.instant();
        let ttl = self.config.notice_ttl().as_millis() as u64;
        self.notices.retain(|n| elapsed_ms(n.posted_at, now) < ttl);
    }

    pub fn phase(&self) -> Phase {
        self.timer.phase()
    }
}
