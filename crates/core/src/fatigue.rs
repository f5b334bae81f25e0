//! Engagement and Fatigue Heuristics
//!
//! Two small policies: when to offer the user a break (turn-count based) and
//! how to react to silence (idle-duration tiers). Both are pure functions of
//! the session state so they are trivially testable.

use std::time::Duration;

/// Default number of turns before a break is offered.
pub const DEFAULT_BREAK_THRESHOLD: u32 = 10;

/// How to respond to a stretch of user silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTier {
    /// Under five seconds: no re-engagement needed.
    Engaged,
    /// Five to fifteen seconds: gentle nudge.
    Nudge,
    /// Over fifteen seconds: close the session gracefully.
    Disengage,
}

/// Turn-count based fatigue policy.
#[derive(Debug, Clone, Copy)]
pub struct FatigueMonitor {
    threshold: u32,
}

impl Default for FatigueMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_BREAK_THRESHOLD)
    }
}

impl FatigueMonitor {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// True once the turn count since the last baseline exceeds the threshold.
    pub fn should_offer_break(&self, turns_since_baseline: u32) -> bool {
        turns_since_baseline > self.threshold
    }

    pub fn idle_tier(idle: Duration) -> IdleTier {
        if idle < Duration::from_secs(5) {
            IdleTier::Engaged
        } else if idle <= Duration::from_secs(15) {
            IdleTier::Nudge
        } else {
            IdleTier::Disengage
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_offer_boundary_at_default_threshold() {
        let monitor = FatigueMonitor::default();
        assert!(!monitor.should_offer_break(10));
        assert!(monitor.should_offer_break(11));
    }

    #[test]
    fn idle_tier_boundaries() {
        assert_eq!(
            FatigueMonitor::idle_tier(Duration::from_secs(4)),
            IdleTier::Engaged
        );
        assert_eq!(
            FatigueMonitor::idle_tier(Duration::from_secs(5)),
            IdleTier::Nudge
        );
        assert_eq!(
            FatigueMonitor::idle_tier(Duration::from_secs(15)),
            IdleTier::Nudge
        );
        assert_eq!(
            FatigueMonitor::idle_tier(Duration::from_secs(16)),
            IdleTier::Disengage
        );
    }
}
