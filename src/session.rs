use crate::solve::{PuzzleType, Session, SessionId, Solve, SolveId};
use crate::timer::AttemptContext;

pub const DEFAULT_SESSION: &str = "Default Session";
pub const PLAYGROUND_SESSION: &str = "Playground";

/// In-memory view of the user's sessions plus the attempt-level selections
/// (active session, puzzle, current scramble). Owned by the app and passed
/// by reference; never global.
#[derive(Debug, Clone, Default)]
pub struct SessionBook {
    sessions: Vec<Session>,
    active: Option<SessionId>,
    puzzle_type: PuzzleType,
    scramble: Option<String>,
}

impl SessionBook {
    pub fn new(sessions: Vec<Session>, puzzle_type: PuzzleType) -> Self {
        Self {
            sessions,
            active: None,
            puzzle_type,
            scramble: None,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_by_name(&self, name: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.name == name)
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.and_then(|id| self.session(id))
    }

    /// Solves of `id` in recording order; empty for an unknown session.
    pub fn solves(&self, id: SessionId) -> &[Solve] {
        self.session(id).map(|s| s.solves.as_slice()).unwrap_or(&[])
    }

    pub fn active_solves(&self) -> &[Solve] {
        self.active.map(|id| self.solves(id)).unwrap_or(&[])
    }

    /// Every solve outside the playground session, oldest first.
    pub fn overall_solves(&self) -> Vec<Solve> {
        let mut all: Vec<Solve> = self
            .sessions
            .iter()
            .filter(|s| s.name != PLAYGROUND_SESSION)
            .flat_map(|s| s.solves.iter().cloned())
            .collect();
        all.sort_by_key(|s| s.timestamp);
        all
    }

    pub fn current_scramble(&self) -> Option<&str> {
        self.scramble.as_deref()
    }

    pub fn puzzle_type(&self) -> PuzzleType {
        self.puzzle_type
    }

    pub fn set_scramble(&mut self, scramble: Option<String>) {
        self.scramble = scramble;
    }

    /// Switching puzzles invalidates the scramble on display.
    pub fn set_puzzle_type(&mut self, puzzle_type: PuzzleType) {
        if self.puzzle_type != puzzle_type {
            self.puzzle_type = puzzle_type;
            self.scramble = None;
        }
    }

    /// Selects `id` if it exists. Returns whether the selection changed.
    pub fn set_active(&mut self, id: SessionId) -> bool {
        if self.session(id).is_none() || self.active == Some(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Moves the active selection by `offset` positions, wrapping around.
    pub fn cycle_active(&mut self, offset: isize) -> Option<SessionId> {
        if self.sessions.is_empty() {
            return None;
        }
        let len = self.sessions.len() as isize;
        let current = self
            .active
            .and_then(|id| self.sessions.iter().position(|s| s.id == id))
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.active = Some(self.sessions[next].id);
        self.active
    }

    pub fn insert_session(&mut self, session: Session) {
        self.sessions.push(session);
    }

    /// Drops the session and its solves. Clears the selection if it was active.
    pub fn remove_session(&mut self, id: SessionId) -> Option<Session> {
        let idx = self.sessions.iter().position(|s| s.id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.sessions.remove(idx))
    }

    pub fn rename_session(&mut self, id: SessionId, name: &str) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn retype_session(&mut self, id: SessionId, puzzle_type: PuzzleType) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.puzzle_type = puzzle_type;
                true
            }
            None => false,
        }
    }

    pub fn push_solve(&mut self, solve: Solve) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == solve.session_id) {
            Some(session) => {
                session.solves.push(solve);
                true
            }
            None => false,
        }
    }

    /// Swaps in an updated copy of an existing solve, keeping its position.
    pub fn replace_solve(&mut self, updated: Solve) -> bool {
        let slot = self
            .sessions
            .iter_mut()
            .flat_map(|s| s.solves.iter_mut())
            .find(|s| s.id == updated.id);
        match slot {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    pub fn remove_solve(&mut self, id: SolveId) -> Option<Solve> {
        for session in &mut self.sessions {
            if let Some(idx) = session.solves.iter().position(|s| s.id == id) {
                return Some(session.solves.remove(idx));
            }
        }
        None
    }
}

impl AttemptContext for SessionBook {
    fn current_scramble(&self) -> Option<&str> {
        SessionBook::current_scramble(self)
    }

    fn puzzle_type(&self) -> PuzzleType {
        self.puzzle_type
    }

    /// The active session, else the first session as fallback.
    fn destination(&self) -> Option<SessionId> {
        self.active
            .filter(|id| self.session(*id).is_some())
            .or_else(|| self.sessions.first().map(|s| s.id))
    }
}
