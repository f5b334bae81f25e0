//! No-Repeat Prompt Selection
//!
//! Selects SEL prompts uniformly at random among the catalog entries not yet
//! surfaced in the current session. Exhaustion is signalled explicitly rather
//! than silently repeating a prompt; the caller decides whether to reset the
//! category or move to another one.

use crate::lexicon::{Lexicon, SelCategory};
use crate::profile::AgeBand;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Outcome of a selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Prompt(String),
    /// Every prompt for the `(category, band)` pair has already been used.
    Exhausted,
}

/// Per-session prompt selector with a seedable random source.
pub struct PromptSelector {
    lexicon: Arc<Lexicon>,
    used: HashMap<SelCategory, HashSet<String>>,
    rng: StdRng,
}

impl PromptSelector {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self::from_rng(lexicon, StdRng::from_os_rng())
    }

    /// Deterministic selector for scenario tests.
    pub fn with_seed(lexicon: Arc<Lexicon>, seed: u64) -> Self {
        Self::from_rng(lexicon, StdRng::seed_from_u64(seed))
    }

    fn from_rng(lexicon: Arc<Lexicon>, rng: StdRng) -> Self {
        Self {
            lexicon,
            used: HashMap::new(),
            rng,
        }
    }

    /// Picks an unused prompt for `(category, band)` and marks it used.
    pub fn next(&mut self, category: SelCategory, band: AgeBand) -> Selection {
        let used = self.used.entry(category).or_default();
        let available: Vec<&String> = self
            .lexicon
            .prompts(category, band)
            .iter()
            .filter(|p| !used.contains(*p))
            .collect();

        if available.is_empty() {
            return Selection::Exhausted;
        }

        let chosen = available[self.rng.random_range(0..available.len())].clone();
        used.insert(chosen.clone());
        Selection::Prompt(chosen)
    }

    /// Clears the used set for one category only.
    pub fn reset_category(&mut self, category: SelCategory) {
        self.used.remove(&category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> PromptSelector {
        PromptSelector::with_seed(Arc::new(Lexicon::default()), 42)
    }

    #[test]
    fn never_repeats_until_exhausted() {
        let mut selector = selector();
        let catalog_len = selector
            .lexicon
            .prompts(SelCategory::Reflection, AgeBand::Child)
            .len();

        let mut seen = HashSet::new();
        for _ in 0..catalog_len {
            match selector.next(SelCategory::Reflection, AgeBand::Child) {
                Selection::Prompt(p) => assert!(seen.insert(p), "prompt repeated before exhaustion"),
                Selection::Exhausted => panic!("exhausted too early"),
            }
        }
        assert_eq!(
            selector.next(SelCategory::Reflection, AgeBand::Child),
            Selection::Exhausted
        );
    }

    #[test]
    fn reset_affects_one_category_only() {
        let mut selector = selector();
        for _ in 0..3 {
            selector.next(SelCategory::Reflection, AgeBand::Teen);
            selector.next(SelCategory::SelfAwareness, AgeBand::Teen);
        }
        assert_eq!(
            selector.next(SelCategory::Reflection, AgeBand::Teen),
            Selection::Exhausted
        );

        selector.reset_category(SelCategory::Reflection);
        assert!(matches!(
            selector.next(SelCategory::Reflection, AgeBand::Teen),
            Selection::Prompt(_)
        ));
        // The other category stays exhausted.
        assert_eq!(
            selector.next(SelCategory::SelfAwareness, AgeBand::Teen),
            Selection::Exhausted
        );
    }

    #[test]
    fn seeded_selectors_are_deterministic() {
        let lexicon = Arc::new(Lexicon::default());
        let mut a = PromptSelector::with_seed(lexicon.clone(), 7);
        let mut b = PromptSelector::with_seed(lexicon, 7);
        for _ in 0..3 {
            assert_eq!(
                a.next(SelCategory::SocialAwareness, AgeBand::Adult),
                b.next(SelCategory::SocialAwareness, AgeBand::Adult)
            );
        }
    }
}
