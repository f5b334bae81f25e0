//! Goal Tracking
//!
//! A small append-only log of user goals captured during future-planning
//! prompts. Goals are never removed; recording a goal with an existing
//! description replaces the latest entry for that description.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    InProgress,
    NeedsSupport,
    Ongoing,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::InProgress => write!(f, "in progress"),
            GoalStatus::NeedsSupport => write!(f, "needs support"),
            GoalStatus::Ongoing => write!(f, "ongoing"),
        }
    }
}

impl GoalStatus {
    /// Infers a progress status from the user's own words about the goal.
    pub fn from_reply(reply: &str) -> Self {
        let lowered = reply.to_lowercase();
        if lowered.contains("stuck") || lowered.contains("not good") {
            GoalStatus::NeedsSupport
        } else if lowered.contains("good") || lowered.contains("progress") {
            GoalStatus::InProgress
        } else {
            GoalStatus::Ongoing
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Goal {
    pub description: String,
    pub status: GoalStatus,
}

#[derive(Debug, Default)]
pub struct GoalLog {
    goals: Vec<Goal>,
}

impl GoalLog {
    /// Records a goal, replacing the latest entry with the same description.
    pub fn record(&mut self, description: impl Into<String>, status: GoalStatus) {
        let description = description.into();
        if let Some(existing) = self
            .goals
            .iter_mut()
            .rev()
            .find(|g| g.description == description)
        {
            existing.status = status;
        } else {
            self.goals.push(Goal {
                description,
                status,
            });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}
