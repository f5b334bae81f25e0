//! Closing Session Recap
//!
//! Renders the end-of-session summary from the session log, the goal log,
//! and the feedback ledger. Pure formatting; the engine decides when to
//! call it.

use crate::lexicon::Lexicon;
use crate::session::{SessionState, TurnRole};

pub struct SessionSummarizer;

impl SessionSummarizer {
    /// Renders the closing recap: turns exchanged, goals with status, and
    /// feedback statistics, ending with an age-appropriate encouragement.
    pub fn render(state: &SessionState, lexicon: &Lexicon) -> String {
        let mut lines = Vec::new();

        let name = state
            .profile
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("friend");
        lines.push(format!("{name}, here's what we covered today:"));

        let shared = state.log.count_role(TurnRole::User);
        lines.push(format!("You shared {shared} thoughts with me."));

        if !state.goals.is_empty() {
            lines.push("Here are your goals and progress:".to_string());
            for goal in state.goals.iter() {
                lines.push(format!("Goal: {}, Status: {}", goal.description, goal.status));
            }
        }

        let feedback = state.feedback.summary();
        match feedback.average_rating {
            Some(avg) => {
                lines.push(format!(
                    "Thank you for your feedback! My average rating this session was {avg:.1}."
                ));
                for comment in &feedback.comments {
                    lines.push(format!("You said: {comment}"));
                }
            }
            None => {
                lines.push(
                    "I didn't receive any feedback this session. I hope to improve next time!"
                        .to_string(),
                );
            }
        }

        if let Some(band) = state.age_band() {
            lines.push(lexicon.closing_line(band).to_string());
        }
        lines.push(
            "Thank you for talking with me today. Remember, I'm always here if you need me."
                .to_string(),
        );

        lines.join("\n")
    }
}
