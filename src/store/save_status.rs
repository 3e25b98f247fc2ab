//! Session-wide save indicator.
//!
//! One status for the whole session, not per box: with several requests in
//! flight, whichever response lands last decides what is shown.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::constants::SAVE_STATUS_DISPLAY;

/// What the save indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

/// Tracks the save status and reverts `Saved`/`Error` to `Idle` after a delay.
#[derive(Debug, Clone)]
pub struct SaveStatusTracker {
    status: SaveStatus,

    /// When the current `Saved`/`Error` status was set.
    settled_at: Option<Instant>,

    /// How long `Saved`/`Error` stays before reverting.
    display_duration: Duration,
}

impl SaveStatusTracker {
    pub fn new() -> Self {
        Self {
            status: SaveStatus::Idle,
            settled_at: None,
            display_duration: SAVE_STATUS_DISPLAY,
        }
    }

    /// Set how long a settled status stays visible.
    pub fn with_display_duration(mut self, duration: Duration) -> Self {
        self.display_duration = duration;
        self
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// A request went out.
    pub fn mark_saving(&mut self) {
        self.status = SaveStatus::Saving;
        self.settled_at = None;
    }

    /// A request succeeded.
    pub fn mark_saved(&mut self) {
        self.settle(SaveStatus::Saved, Instant::now());
    }

    /// A request failed.
    pub fn mark_error(&mut self) {
        self.settle(SaveStatus::Error, Instant::now());
    }

    fn settle(&mut self, status: SaveStatus, now: Instant) {
        log::trace!("Save status: {:?}", status);
        self.status = status;
        self.settled_at = Some(now);
    }

    /// Revert an expired `Saved`/`Error` to `Idle`.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// [`Self::tick`] against an explicit clock reading.
    pub fn tick_at(&mut self, now: Instant) {
        let Some(settled_at) = self.settled_at else {
            return;
        };
        if now.saturating_duration_since(settled_at) >= self.display_duration {
            self.status = SaveStatus::Idle;
            self.settled_at = None;
        }
    }

    /// Indicator text; empty while idle.
    pub fn display_text(&self) -> &'static str {
        match self.status {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error => "Error saving",
        }
    }
}

impl Default for SaveStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
