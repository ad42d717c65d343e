//! In-memory session state owned by the orchestrator.
//!
//! Nothing here is persisted: a restart always begins a fresh session.

use chrono::{DateTime, Utc};

use crate::classifier::GameMode;

/// The last mode that reached the presence display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentMode {
    #[default]
    NoModeYet,
    Mode {
        mode: GameMode,
        /// Session start the mode was published with.
        session_start: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct SessionState {
    current_mode: CurrentMode,
    is_playing: bool,
    session_start: DateTime<Utc>,
    is_logged_in: bool,
}

impl SessionState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_mode: CurrentMode::NoModeYet,
            is_playing: false,
            session_start: now,
            is_logged_in: false,
        }
    }

    #[cfg(test)]
    pub fn current_mode(&self) -> &CurrentMode {
        &self.current_mode
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.is_logged_in = logged_in;
    }

    /// Starts a session if none is tracked. Returns true when a new start was minted.
    pub fn begin_playing(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_playing {
            return false;
        }
        self.is_playing = true;
        self.session_start = now;
        true
    }

    pub fn stop_playing(&mut self) {
        self.is_playing = false;
    }

    /// True when `mode` is already on the display for this session.
    ///
    /// The published session start is compared too, so close followed by an
    /// update in the same mode republishes with the new start.
    pub fn is_published(&self, mode: &GameMode, session_start: DateTime<Utc>) -> bool {
        match &self.current_mode {
            CurrentMode::NoModeYet => false,
            CurrentMode::Mode {
                mode: current,
                session_start: published_start,
            } => current == mode && *published_start == session_start,
        }
    }

    /// Records a successful publish.
    pub fn commit(&mut self, mode: GameMode, session_start: DateTime<Utc>) {
        self.current_mode = CurrentMode::Mode {
            mode,
            session_start,
        };
    }
}
