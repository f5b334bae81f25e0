//! Keyword-Based Emotion Classification
//!
//! Coarse tone detection via case-insensitive substring matching against the
//! lexicon's keyword sets. Deliberately not NLP: no stemming, no scoring.

use crate::lexicon::Lexicon;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Coarse emotional tone of an utterance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Negative,
    Positive,
    Neutral,
}

/// Maps an utterance to a [`Tone`] using the lexicon keyword sets.
///
/// Negative is checked first and short-circuits, so an utterance matching
/// both sets classifies as negative. No match yields `Neutral`; there is no
/// failure mode.
pub struct EmotionClassifier {
    lexicon: Arc<Lexicon>,
}

impl EmotionClassifier {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn classify(&self, utterance: &str) -> Tone {
        let lowered = utterance.to_lowercase();
        if self
            .lexicon
            .negative_keywords()
            .iter()
            .any(|kw| lowered.contains(kw))
        {
            Tone::Negative
        } else if self
            .lexicon
            .positive_keywords()
            .iter()
            .any(|kw| lowered.contains(kw))
        {
            Tone::Positive
        } else {
            Tone::Neutral
        }
    }
}
