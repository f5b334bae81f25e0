//! Structured Feedback Collection
//!
//! Records rating/comment entries about individual replies and computes the
//! session-level statistics used in the closing recap. Rating validation is
//! the engine's job; the ledger itself never rejects an entry.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedbackEntry {
    /// The assistant reply the feedback is about.
    pub response: String,
    /// Validated by the caller to be within 1..=5.
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackSummary {
    /// `None` when no feedback was collected; never divides by zero.
    pub average_rating: Option<f64>,
    pub total_feedback: usize,
    pub comments: Vec<String>,
}

/// Append-only ledger of feedback entries for one session.
#[derive(Debug, Default)]
pub struct FeedbackLedger {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackLedger {
    pub fn record(&mut self, entry: FeedbackEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> FeedbackSummary {
        let total = self.entries.len();
        let average_rating = if total == 0 {
            None
        } else {
            let sum: u32 = self.entries.iter().map(|e| u32::from(e.rating)).sum();
            Some(f64::from(sum) / total as f64)
        };
        let comments = self
            .entries
            .iter()
            .filter_map(|e| e.comment.clone())
            .collect();
        FeedbackSummary {
            average_rating,
            total_feedback: total,
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rating: u8, comment: Option<&str>) -> FeedbackEntry {
        FeedbackEntry {
            response: "a reply".to_string(),
            rating,
            comment: comment.map(String::from),
        }
    }

    #[test]
    fn empty_ledger_has_no_average() {
        let ledger = FeedbackLedger::default();
        let summary = ledger.summary();
        assert_eq!(summary.total_feedback, 0);
        assert_eq!(summary.average_rating, None);
        assert!(summary.comments.is_empty());
    }

    #[test]
    fn average_of_five_three_four_is_four() {
        let mut ledger = FeedbackLedger::default();
        ledger.record(entry(5, None));
        ledger.record(entry(3, Some("could be warmer")));
        ledger.record(entry(4, None));

        let summary = ledger.summary();
        assert_eq!(summary.total_feedback, 3);
        assert_eq!(summary.average_rating, Some(4.0));
        assert_eq!(summary.comments, vec!["could be warmer".to_string()]);
    }

    #[test]
    fn comments_preserve_order() {
        let mut ledger = FeedbackLedger::default();
        ledger.record(entry(1, Some("first")));
        ledger.record(entry(2, None));
        ledger.record(entry(3, Some("second")));
        assert_eq!(
            ledger.summary().comments,
            vec!["first".to_string(), "second".to_string()]
        );
    }
}
