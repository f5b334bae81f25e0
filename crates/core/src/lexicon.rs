//! Static Conversational Lexicon
//!
//! This module holds the immutable keyword tables and the SEL prompt catalog
//! that the rest of the engine is configured with. It is pure data: tone
//! keywords, quit phrases, and the category/age-band prompt sets, plus the
//! canned phrasing the engine uses for calming, goal-setting, and closing
//! lines. Constructed once at startup and shared via `Arc`.

use crate::profile::AgeBand;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The social-emotional-learning categories the prompt catalog is keyed by.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SelCategory {
    SelfAwareness,
    SelfManagement,
    SocialAwareness,
    Reflection,
}

impl SelCategory {
    /// All categories, in the rotation order the engine cycles through.
    pub const ALL: [SelCategory; 4] = [
        SelCategory::SelfAwareness,
        SelCategory::SelfManagement,
        SelCategory::SocialAwareness,
        SelCategory::Reflection,
    ];
}

impl fmt::Display for SelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelCategory::SelfAwareness => write!(f, "self-awareness"),
            SelCategory::SelfManagement => write!(f, "self-management"),
            SelCategory::SocialAwareness => write!(f, "social awareness"),
            SelCategory::Reflection => write!(f, "reflection"),
        }
    }
}

/// Prompt catalog: category, then age band, then an ordered set of prompts.
pub type PromptCatalog = HashMap<SelCategory, HashMap<AgeBand, Vec<String>>>;

/// Immutable conversational configuration.
///
/// Keyword sets drive the `EmotionClassifier` and quit detection; the catalog
/// feeds the `PromptSelector`; the per-band phrase tables keep all
/// age-dependent wording in one place so the engine itself stays policy-free.
pub struct Lexicon {
    negative: Vec<&'static str>,
    positive: Vec<&'static str>,
    quit: Vec<&'static str>,
    catalog: PromptCatalog,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            negative: vec![
                "sad",
                "upset",
                "depressed",
                "worthless",
                "angry",
                "mad",
                "jealous",
                "hate",
            ],
            positive: vec!["happy", "excited", "joyful", "proud", "calm"],
            quit: vec!["i am done", "goodbye", "leave", "exit", "quit", "bye"],
            catalog: built_in_catalog(),
        }
    }
}

impl Lexicon {
    pub fn negative_keywords(&self) -> &[&'static str] {
        &self.negative
    }

    pub fn positive_keywords(&self) -> &[&'static str] {
        &self.positive
    }

    /// Whether the utterance, trimmed and lowercased, is exactly a quit phrase.
    ///
    /// Exact matching is deliberate: "goodbye" inside a longer sentence should
    /// not end the session.
    pub fn is_quit(&self, utterance: &str) -> bool {
        let normalized = utterance.trim().to_lowercase();
        self.quit.iter().any(|q| *q == normalized)
    }

    /// Prompts for a `(category, band)` pair; empty when the catalog has none.
    pub fn prompts(&self, category: SelCategory, band: AgeBand) -> &[String] {
        self.catalog
            .get(&category)
            .and_then(|by_band| by_band.get(&band))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A calming, grounding line for the negative-tone branch. Rendered slowly.
    pub fn calming_line(&self, band: AgeBand) -> &'static str {
        match band {
            AgeBand::Child => {
                "It sounds like you're feeling a bit down. Let's do something calming together. \
                 Imagine you're in a cozy fort filled with your favorite things. What would you have in there?"
            }
            AgeBand::Teen => {
                "It sounds like you're feeling a bit down. Let's do something calming together. \
                 Think about a peaceful place that makes you feel calm. Where would it be?"
            }
            AgeBand::Adult => {
                "It sounds like you're feeling a bit down. Let's do something calming together. \
                 Take a deep breath and picture a moment when you felt truly at peace. What made it so calming?"
            }
        }
    }

    /// The future-planning prompt for the goal-oriented positive branch.
    pub fn future_prompt(&self, band: AgeBand) -> &'static str {
        match band {
            AgeBand::Child => {
                "Let's think about your future goals. What's something you dream of being or doing when you grow up?"
            }
            AgeBand::Teen => {
                "Let's think about your future goals. Where do you see yourself in five years? What would you like to achieve?"
            }
            AgeBand::Adult => {
                "Let's think about your future goals. What's a long-term goal that's important to you?"
            }
        }
    }

    /// Invitation appended after an SEL exercise prompt.
    pub fn exercise_invite(&self, band: AgeBand) -> &'static str {
        match band {
            AgeBand::Child => "Take your time to think and tell me what you'd do.",
            AgeBand::Teen => "How would you handle this situation?",
            AgeBand::Adult => "What are your thoughts on this scenario?",
        }
    }

    /// Encouragement after the user names a goal.
    pub fn goal_encouragement(&self, band: AgeBand) -> &'static str {
        match band {
            AgeBand::Child => "That's a great goal!",
            AgeBand::Teen => "That's an ambitious goal!",
            AgeBand::Adult => "That's a meaningful goal.",
        }
    }

    /// Closing encouragement used by the session recap.
    pub fn closing_line(&self, band: AgeBand) -> &'static str {
        match band {
            AgeBand::Child => "I'm so proud of how kind and thoughtful you are!",
            AgeBand::Teen => "You're showing so much growth and maturity. Keep it up!",
            AgeBand::Adult => "You're a great example of resilience and thoughtfulness. Well done!",
        }
    }
}

fn band_map(child: &[&str], teen: &[&str], adult: &[&str]) -> HashMap<AgeBand, Vec<String>> {
    let owned = |ps: &[&str]| ps.iter().map(|p| p.to_string()).collect();
    HashMap::from([
        (AgeBand::Child, owned(child)),
        (AgeBand::Teen, owned(teen)),
        (AgeBand::Adult, owned(adult)),
    ])
}

fn built_in_catalog() -> PromptCatalog {
    let mut catalog = PromptCatalog::new();
    catalog.insert(
        SelCategory::SelfAwareness,
        band_map(
            &[
                "What's something you're really good at?",
                "What makes you smile the most?",
                "Can you think of a time when you were really brave?",
            ],
            &[
                "What's something you've accomplished recently that you're proud of?",
                "What motivates you to keep going when things get tough?",
                "How do you usually respond to challenges?",
            ],
            &[
                "What's one thing you've done recently that makes you feel accomplished?",
                "How do you usually reflect on your own emotions?",
                "What's something you'd like to improve about yourself?",
            ],
        ),
    );
    catalog.insert(
        SelCategory::SelfManagement,
        band_map(
            &[
                "How do you calm yourself down when you feel upset?",
                "What's one way you can stay focused on something important?",
                "What helps you when you feel nervous?",
            ],
            &[
                "How do you handle distractions when you need to focus?",
                "What helps you stay calm when you feel overwhelmed?",
                "What's one way you manage your time when you're busy?",
            ],
            &[
                "How do you prioritize tasks when you're busy?",
                "What's a strategy you use to stay focused on long-term goals?",
                "How do you manage stress when life gets hectic?",
            ],
        ),
    );
    catalog.insert(
        SelCategory::SocialAwareness,
        band_map(
            &[
                "How can you show kindness to someone who is feeling sad?",
                "Why is it important to say 'thank you' when someone helps you?",
                "Can you think of a way to make a new friend?",
            ],
            &[
                "How can you support a friend who is going through a tough time?",
                "Why is it important to respect other people's opinions?",
                "What does being a good listener mean to you?",
            ],
            &[
                "How do you approach resolving conflicts with others?",
                "Why is empathy important in building strong relationships?",
                "What's one way you can contribute to your community?",
            ],
        ),
    );
    catalog.insert(
        SelCategory::Reflection,
        band_map(
            &[
                "What's your favorite thing to do with your friends?",
                "Can you tell me about a time you helped someone?",
                "If you could be any animal, which one would you choose and why?",
            ],
            &[
                "What's a challenge you overcame recently, and how did it feel?",
                "How do you support your friends when they're feeling down?",
                "If you could invent something to help people, what would it be?",
            ],
            &[
                "What's something you've done recently that you're proud of?",
                "How do you usually relax after a long day?",
                "What's a goal you're working towards, and how can I support you?",
            ],
        ),
    );
    catalog
}
