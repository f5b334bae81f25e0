//! Session State
//!
//! The `SessionLog` is the append-only record of everything said during a
//! session and the sole source of truth for summaries and feedback
//! aggregation. `SessionState` aggregates the log with the profile, goals,
//! feedback ledger, and engagement counters; it is owned exclusively by the
//! dialogue engine for the lifetime of one session.

use crate::feedback::FeedbackLedger;
use crate::goals::GoalLog;
use crate::profile::{AgeBand, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
    Feedback,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::System => write!(f, "system"),
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
            TurnRole::Feedback => write!(f, "feedback"),
        }
    }
}

/// One immutable entry in the session log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Default)]
pub struct SessionLog {
    turns: Vec<Turn>,
}

impl SessionLog {
    pub fn append(&mut self, role: TurnRole, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn count_role(&self, role: TurnRole) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// Wholesale reset on explicit request; the log is never edited in place.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Aggregate state for one session, discarded when the session ends.
pub struct SessionState {
    pub profile: Option<UserProfile>,
    pub log: SessionLog,
    pub goals: GoalLog,
    pub feedback: FeedbackLedger,
    pub turn_count: u32,
    last_interaction: Instant,
}

impl SessionState {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self {
            profile,
            log: SessionLog::default(),
            goals: GoalLog::default(),
            feedback: FeedbackLedger::default(),
            turn_count: 0,
            last_interaction: Instant::now(),
        }
    }

    pub fn age_band(&self) -> Option<AgeBand> {
        self.profile.as_ref().map(UserProfile::age_band)
    }

    /// Time since the last successful user interaction.
    pub fn idle(&self) -> Duration {
        self.last_interaction.elapsed()
    }

    pub(crate) fn touch(&mut self) {
        self.last_interaction = Instant::now();
    }

    #[cfg(test)]
    pub(crate) fn backdate_interaction(&mut self, by: Duration) {
        self.last_interaction = Instant::now() - by;
    }
}
