//! The Dialogue Engine
//!
//! One state machine replaces the many near-duplicate interaction loops of
//! earlier prototypes: slot-filling (name, then age), then an active turn
//! loop that routes each utterance through quit detection, pending
//! sub-dialogues (break offers, feedback, goal capture), fatigue policy, and
//! tone classification. Every error path recovers with a friendly re-prompt;
//! the user never sees raw error text.
//!
//! The engine owns its `SessionState` exclusively and is strictly
//! request/response: `submit_turn` takes one utterance and returns one reply,
//! which makes it usable both from an interactive loop and from a stateless
//! HTTP endpoint.

use crate::emotion::{EmotionClassifier, Tone};
use crate::fatigue::{FatigueMonitor, IdleTier};
use crate::feedback::FeedbackEntry;
use crate::goals::GoalStatus;
use crate::lexicon::{Lexicon, SelCategory};
use crate::profile::{AGE_RANGE, AgeBand, DEFAULT_LISTEN_TIMEOUT, ProfileStore, UserProfile};
use crate::prompts::{PromptSelector, Selection};
use crate::reply::{ReplyError, ReplyGenerator};
use crate::session::{SessionState, TurnRole};
use crate::summary::SessionSummarizer;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Lifecycle phase of a session. `Terminated` is absorbing.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    AwaitingName,
    AwaitingAge,
    Active,
    Paused,
    Terminated,
}

/// What the engine wants said back to the user after one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub text: String,
    /// Render slowly; set on the calming branch for sensitive content.
    pub slow: bool,
    pub phase: EnginePhase,
    pub ended: bool,
}

/// Tunable policy knobs for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Turns between break offers.
    pub break_threshold: u32,
    /// Re-prompt attempts for name/age before giving up gracefully.
    pub max_slot_attempts: u8,
    /// Re-asks for an invalid feedback rating before skipping feedback.
    pub feedback_retries: u8,
    /// Upper bound on one reply-backend call.
    pub backend_timeout: Duration,
    /// Whether to solicit a rating after generated replies.
    pub collect_feedback: bool,
    /// Seed for prompt selection; `None` uses OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            break_threshold: crate::fatigue::DEFAULT_BREAK_THRESHOLD,
            max_slot_attempts: 3,
            feedback_retries: 2,
            backend_timeout: Duration::from_secs(10),
            collect_feedback: false,
            rng_seed: None,
        }
    }
}

/// A sub-dialogue awaiting the user's next utterance.
#[derive(Debug, Clone)]
enum Pending {
    BreakOffer,
    FeedbackRating { response: String, attempts: u8 },
    FeedbackComment { response: String, rating: u8 },
    GoalAnswer,
    GoalStep { description: String },
}

enum EndReason {
    Quit,
    Idle,
    GaveUp,
}

const FALLBACK_REPLY: &str = "Oops! I ran into a small issue. Let me ask you something else instead. \
     What's something that made you smile recently?";

/// Listening timeout while the session is paused. Long enough that the
/// capture loop is effectively waiting for the user to come back.
const PAUSED_LISTEN_TIMEOUT: Duration = Duration::from_secs(300);

pub struct DialogueEngine {
    lexicon: Arc<Lexicon>,
    classifier: EmotionClassifier,
    selector: PromptSelector,
    fatigue: FatigueMonitor,
    reply_gen: Arc<dyn ReplyGenerator>,
    store: Arc<dyn ProfileStore>,
    config: EngineConfig,
    state: SessionState,
    phase: EnginePhase,
    pending: Option<Pending>,
    pending_name: Option<String>,
    slot_attempts: u8,
    fatigue_baseline: u32,
    category_cursor: usize,
    plan_next: bool,
    saved: bool,
}

impl DialogueEngine {
    /// Starts a session, optionally seeded from a persisted profile. With a
    /// profile the engine skips slot-filling and opens in `Active`.
    pub fn new(
        lexicon: Arc<Lexicon>,
        reply_gen: Arc<dyn ReplyGenerator>,
        store: Arc<dyn ProfileStore>,
        config: EngineConfig,
        initial_profile: Option<UserProfile>,
    ) -> Self {
        let classifier = EmotionClassifier::new(lexicon.clone());
        let selector = match config.rng_seed {
            Some(seed) => PromptSelector::with_seed(lexicon.clone(), seed),
            None => PromptSelector::new(lexicon.clone()),
        };
        let phase = if initial_profile.is_some() {
            EnginePhase::Active
        } else {
            EnginePhase::AwaitingName
        };
        Self {
            classifier,
            selector,
            fatigue: FatigueMonitor::new(config.break_threshold),
            reply_gen,
            store,
            state: SessionState::new(initial_profile),
            phase,
            pending: None,
            pending_name: None,
            slot_attempts: 0,
            fatigue_baseline: 0,
            category_cursor: 0,
            plan_next: false,
            saved: false,
            config,
            lexicon,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Listening timeout for the next capture, based on the known age band.
    /// A paused session waits far longer; the break lasts until the user
    /// speaks again.
    pub fn listen_timeout(&self) -> Duration {
        if self.phase == EnginePhase::Paused {
            return PAUSED_LISTEN_TIMEOUT;
        }
        self.state
            .age_band()
            .map(AgeBand::listen_timeout)
            .unwrap_or(DEFAULT_LISTEN_TIMEOUT)
    }

    /// Opening line for the session; logged like any other assistant turn.
    pub fn greeting(&mut self) -> TurnReply {
        let text = match &self.state.profile {
            Some(profile) => format!(
                "Welcome back, {}! It's great to talk to you again. How are you feeling today?",
                profile.name
            ),
            None => {
                "Hi there! I'm Amie, your friendly chatbot. Can you tell me your name?".to_string()
            }
        };
        self.respond(text, false)
    }

    /// Processes one utterance and returns the reply. An empty utterance
    /// means silence (capture timeout or unrecognized speech).
    pub async fn submit_turn(&mut self, utterance: &str) -> TurnReply {
        let utterance = utterance.trim();

        if self.phase == EnginePhase::Terminated {
            return TurnReply {
                text: "Our session has ended, but you can start a new one anytime you want to talk."
                    .to_string(),
                slow: false,
                phase: EnginePhase::Terminated,
                ended: true,
            };
        }

        if utterance.is_empty() {
            return self.handle_silence().await;
        }

        self.state.log.append(TurnRole::User, utterance);
        self.state.turn_count += 1;
        self.state.touch();

        if self.lexicon.is_quit(utterance) {
            return self.finalize(EndReason::Quit).await;
        }

        match self.phase {
            EnginePhase::AwaitingName => self.handle_name(utterance).await,
            EnginePhase::AwaitingAge => self.handle_age(utterance).await,
            EnginePhase::Paused => {
                self.phase = EnginePhase::Active;
                self.respond("Welcome back! What's on your mind?".to_string(), false)
            }
            EnginePhase::Active => self.handle_active(utterance).await,
            EnginePhase::Terminated => unreachable!("terminated sessions return early"),
        }
    }

    /// External cancellation: ends the session immediately with best-effort
    /// summarization and persistence.
    pub async fn cancel(&mut self) -> TurnReply {
        if self.phase == EnginePhase::Terminated {
            return TurnReply {
                text: String::new(),
                slow: false,
                phase: EnginePhase::Terminated,
                ended: true,
            };
        }
        self.finalize(EndReason::Quit).await
    }

    async fn handle_silence(&mut self) -> TurnReply {
        match self.phase {
            EnginePhase::AwaitingName => self.respond(
                "I didn't catch that. Could you say your name again?".to_string(),
                false,
            ),
            EnginePhase::AwaitingAge => self.respond(
                "I didn't catch that. Could you tell me your age again?".to_string(),
                false,
            ),
            // The user asked for the quiet; the break holds until they
            // speak again, however long that takes.
            EnginePhase::Paused => TurnReply {
                text: String::new(),
                slow: false,
                phase: self.phase,
                ended: false,
            },
            _ => match FatigueMonitor::idle_tier(self.state.idle()) {
                IdleTier::Engaged => TurnReply {
                    // Too soon to nudge; the caller simply listens again.
                    text: String::new(),
                    slow: false,
                    phase: self.phase,
                    ended: false,
                },
                IdleTier::Nudge => {
                    let text = match &self.state.profile {
                        Some(profile) => format!(
                            "{}, it's been a little quiet. How are you feeling?",
                            profile.name
                        ),
                        None => "I'm still here. Let me know if you want to talk.".to_string(),
                    };
                    self.respond(text, false)
                }
                IdleTier::Disengage => self.finalize(EndReason::Idle).await,
            },
        }
    }

    async fn handle_name(&mut self, utterance: &str) -> TurnReply {
        match extract_name(utterance) {
            Some(name) => {
                self.slot_attempts = 0;
                self.pending_name = Some(name.clone());
                self.phase = EnginePhase::AwaitingAge;
                self.respond(format!("Nice to meet you, {name}! How old are you?"), false)
            }
            None => {
                self.slot_attempts += 1;
                if self.slot_attempts >= self.config.max_slot_attempts {
                    return self.finalize(EndReason::GaveUp).await;
                }
                self.respond(
                    "I didn't catch your name. Could you tell me again? You can say: my name is Sam."
                        .to_string(),
                    false,
                )
            }
        }
    }

    async fn handle_age(&mut self, utterance: &str) -> TurnReply {
        let parsed = utterance.parse::<u8>().ok().filter(|a| AGE_RANGE.contains(a));
        match parsed {
            Some(age) => {
                self.slot_attempts = 0;
                let name = self.pending_name.take().unwrap_or_default();
                let profile = UserProfile::new(name, age);
                // Best-effort persistence on entering the active phase.
                if let Err(e) = self.store.save(&profile).await {
                    warn!(error = %e, "Could not persist profile; continuing without persistence");
                }
                let text = format!(
                    "Great, {}! Let's start. How are you feeling today?",
                    profile.name
                );
                self.state.profile = Some(profile);
                self.phase = EnginePhase::Active;
                self.respond(text, false)
            }
            None => {
                self.slot_attempts += 1;
                if self.slot_attempts >= self.config.max_slot_attempts {
                    return self.finalize(EndReason::GaveUp).await;
                }
                self.respond(
                    "Please tell me your age as a number between 5 and 50.".to_string(),
                    false,
                )
            }
        }
    }

    async fn handle_active(&mut self, utterance: &str) -> TurnReply {
        if let Some(pending) = self.pending.take() {
            return self.handle_pending(pending, utterance);
        }

        if self
            .fatigue
            .should_offer_break(self.state.turn_count - self.fatigue_baseline)
        {
            // Baseline moves at the offer, so the next offer comes one full
            // threshold later whether the user pauses or declines.
            self.fatigue_baseline = self.state.turn_count;
            self.pending = Some(Pending::BreakOffer);
            return self.respond(
                "It seems like we've been chatting for a while. Would you like to keep going or take a short break?"
                    .to_string(),
                false,
            );
        }

        match self.classifier.classify(utterance) {
            Tone::Negative => self.calming_branch(),
            Tone::Positive => self.positive_branch(),
            Tone::Neutral => self.generated_branch(utterance).await,
        }
    }

    fn handle_pending(&mut self, pending: Pending, utterance: &str) -> TurnReply {
        let lowered = utterance.to_lowercase();
        match pending {
            Pending::BreakOffer => {
                if lowered.contains("break") || lowered.contains("pause") {
                    self.phase = EnginePhase::Paused;
                    self.respond(
                        "Alright, let's take a quick pause. I'll be here when you're ready to continue."
                            .to_string(),
                        false,
                    )
                } else {
                    self.respond(
                        "Great! Let's keep going. What would you like to talk about?".to_string(),
                        false,
                    )
                }
            }
            Pending::FeedbackRating { response, attempts } => {
                match lowered.trim().parse::<u8>().ok().filter(|r| (1..=5).contains(r)) {
                    Some(rating) => {
                        self.pending = Some(Pending::FeedbackComment { response, rating });
                        self.respond(
                            "Thank you! Would you like to add a comment? You can also say no."
                                .to_string(),
                            false,
                        )
                    }
                    None if attempts < self.config.feedback_retries => {
                        self.pending = Some(Pending::FeedbackRating {
                            response,
                            attempts: attempts + 1,
                        });
                        self.respond(
                            "I didn't catch that. Please give me a number between 1 and 5."
                                .to_string(),
                            false,
                        )
                    }
                    None => {
                        // Give up without storing anything.
                        self.respond(
                            "That's okay, let's keep chatting. What's on your mind?".to_string(),
                            false,
                        )
                    }
                }
            }
            Pending::FeedbackComment { response, rating } => {
                let comment = match lowered.as_str() {
                    "no" | "nope" | "none" | "no thanks" => None,
                    _ => Some(utterance.to_string()),
                };
                self.state.log.append(
                    TurnRole::Feedback,
                    match &comment {
                        Some(c) => format!("rating {rating}: {c}"),
                        None => format!("rating {rating}"),
                    },
                );
                self.state.feedback.record(FeedbackEntry {
                    response,
                    rating,
                    comment,
                });
                self.respond("Your feedback is valuable. Thank you!".to_string(), false)
            }
            Pending::GoalAnswer => {
                let band = self.band();
                self.state.goals.record(utterance, GoalStatus::Ongoing);
                self.pending = Some(Pending::GoalStep {
                    description: utterance.to_string(),
                });
                self.respond(
                    format!(
                        "{} What's one small step you can take today to move closer to it?",
                        self.lexicon.goal_encouragement(band)
                    ),
                    false,
                )
            }
            Pending::GoalStep { description } => {
                self.state
                    .goals
                    .record(description, GoalStatus::from_reply(utterance));
                self.respond(
                    "That's a fantastic start! Remember, progress takes time, and you're on the right path."
                        .to_string(),
                    false,
                )
            }
        }
    }

    /// Negative tone: age-appropriate grounding, rendered slowly, no
    /// escalation and no backend call.
    fn calming_branch(&mut self) -> TurnReply {
        let band = self.band();
        let text = format!(
            "I'm really sorry you're feeling this way. You're not alone, and I'm here for you. {}",
            self.lexicon.calming_line(band)
        );
        self.respond(text, true)
    }

    /// Positive tone: alternates between an SEL exercise and a
    /// future-planning prompt that captures a goal.
    fn positive_branch(&mut self) -> TurnReply {
        let band = self.band();
        self.plan_next = !self.plan_next;
        if self.plan_next {
            match self.select_prompt(band) {
                Some((category, prompt)) => self.respond(
                    format!(
                        "I'm so glad to hear that! Let's try a {category} activity. {prompt} {}",
                        self.lexicon.exercise_invite(band)
                    ),
                    false,
                ),
                None => self.respond(
                    "I'm so glad to hear that! What else is making you feel good today?".to_string(),
                    false,
                ),
            }
        } else {
            self.pending = Some(Pending::GoalAnswer);
            self.respond(self.lexicon.future_prompt(band).to_string(), false)
        }
    }

    /// Walks the category rotation for an unused prompt; once every category
    /// is exhausted, resets the current one and retries so variety returns
    /// only after full exhaustion.
    fn select_prompt(&mut self, band: AgeBand) -> Option<(SelCategory, String)> {
        let categories = SelCategory::ALL;
        for _ in 0..categories.len() {
            let category = categories[self.category_cursor % categories.len()];
            self.category_cursor += 1;
            if let Selection::Prompt(prompt) = self.selector.next(category, band) {
                return Some((category, prompt));
            }
        }
        let category = categories[self.category_cursor % categories.len()];
        self.category_cursor += 1;
        self.selector.reset_category(category);
        match self.selector.next(category, band) {
            Selection::Prompt(prompt) => Some((category, prompt)),
            Selection::Exhausted => None,
        }
    }

    /// Neutral tone: forward to the reply backend under a timeout; any
    /// failure substitutes the fixed fallback and leaves the state unchanged.
    async fn generated_branch(&mut self, utterance: &str) -> TurnReply {
        let history = self.state.log.turns();
        let result = match tokio::time::timeout(
            self.config.backend_timeout,
            self.reply_gen.generate(utterance, history),
        )
        .await
        {
            Ok(inner) => inner,
            Err(_) => Err(ReplyError::Timeout),
        };

        match result {
            Ok(text) => {
                if self.config.collect_feedback {
                    self.pending = Some(Pending::FeedbackRating {
                        response: text.clone(),
                        attempts: 0,
                    });
                    self.respond(
                        format!("{text}\nHow helpful was my response on a scale of 1 to 5?"),
                        false,
                    )
                } else {
                    self.respond(text, false)
                }
            }
            Err(e) => {
                warn!(error = %e, "Reply backend failed; using fallback");
                self.respond(FALLBACK_REPLY.to_string(), false)
            }
        }
    }

    async fn finalize(&mut self, reason: EndReason) -> TurnReply {
        self.phase = EnginePhase::Terminated;
        let text = match reason {
            EndReason::Quit => format!(
                "{}\nGoodbye! It was so nice talking to you!",
                SessionSummarizer::render(&self.state, &self.lexicon)
            ),
            EndReason::Idle => {
                "It seems you're busy right now. I'll let you go, but we can talk again soon."
                    .to_string()
            }
            EndReason::GaveUp => {
                "I'm having a little trouble understanding right now. Let's try again another time. Goodbye!"
                    .to_string()
            }
        };

        if let Some(profile) = self.state.profile.clone() {
            if !self.saved {
                self.saved = true;
                match self.store.save(&profile).await {
                    Ok(()) => info!(name = %profile.name, "Profile persisted at session end"),
                    Err(e) => {
                        warn!(error = %e, "Could not persist profile at session end; continuing")
                    }
                }
            }
        }

        self.respond(text, false)
    }

    fn band(&self) -> AgeBand {
        // Active-phase invariant: the profile exists once slot-filling is done.
        self.state.age_band().unwrap_or(AgeBand::Adult)
    }

    fn respond(&mut self, text: String, slow: bool) -> TurnReply {
        self.state.log.append(TurnRole::Assistant, text.clone());
        TurnReply {
            text,
            slow,
            phase: self.phase,
            ended: self.phase == EnginePhase::Terminated,
        }
    }
}

/// Extracts a name from an utterance of the form "my name is <token>".
fn extract_name(utterance: &str) -> Option<String> {
    let words: Vec<&str> = utterance.split_whitespace().collect();
    words.windows(4).find_map(|w| {
        if w[0].eq_ignore_ascii_case("my")
            && w[1].eq_ignore_ascii_case("name")
            && w[2].eq_ignore_ascii_case("is")
        {
            let name = w[3].trim_matches(|c: char| !c.is_alphanumeric());
            (!name.is_empty()).then(|| name.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryProfileStore;
    use crate::reply::StaticReplyGenerator;
    use anyhow::Result;
    use mockall::mock;
    use mockall::predicate::always;

    mock! {
        Store {}

        #[async_trait::async_trait]
        impl ProfileStore for Store {
            async fn load(&self) -> Result<Option<UserProfile>>;
            async fn save(&self, profile: &UserProfile) -> Result<()>;
        }
    }

    mock! {
        Replies {}

        #[async_trait::async_trait]
        impl ReplyGenerator for Replies {
            async fn generate(
                &self,
                utterance: &str,
                history: &[crate::session::Turn],
            ) -> Result<String, ReplyError>;
        }
    }

    fn engine_with(
        reply_gen: Arc<dyn ReplyGenerator>,
        store: Arc<dyn ProfileStore>,
        config: EngineConfig,
        profile: Option<UserProfile>,
    ) -> DialogueEngine {
        DialogueEngine::new(Arc::new(Lexicon::default()), reply_gen, store, config, profile)
    }

    fn fresh_engine() -> DialogueEngine {
        engine_with(
            Arc::new(StaticReplyGenerator::new("I hear you.")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                rng_seed: Some(42),
                ..EngineConfig::default()
            },
            None,
        )
    }

    async fn active_engine() -> DialogueEngine {
        let mut engine = fresh_engine();
        engine.submit_turn("my name is Sam").await;
        engine.submit_turn("7").await;
        assert_eq!(engine.phase(), EnginePhase::Active);
        engine
    }

    #[test]
    fn extract_name_finds_token_after_pattern() {
        assert_eq!(extract_name("my name is Sam"), Some("Sam".to_string()));
        assert_eq!(
            extract_name("hello, My Name is Priya!"),
            Some("Priya".to_string())
        );
        assert_eq!(extract_name("i won't tell you"), None);
        assert_eq!(extract_name("my name is"), None);
    }

    #[test]
    fn default_config_policy_values() {
        let config = EngineConfig::default();
        assert_eq!(config.break_threshold, 10);
        assert_eq!(config.max_slot_attempts, 3);
        assert!(!config.collect_feedback);
    }

    #[tokio::test]
    async fn slot_filling_walks_name_then_age_into_active() {
        let mut engine = fresh_engine();
        assert_eq!(engine.phase(), EnginePhase::AwaitingName);

        let reply = engine.submit_turn("my name is Sam").await;
        assert_eq!(reply.phase, EnginePhase::AwaitingAge);
        assert!(reply.text.contains("Nice to meet you, Sam"));

        let reply = engine.submit_turn("7").await;
        assert_eq!(reply.phase, EnginePhase::Active);
        assert!(reply.text.contains("Great, Sam"));
        assert_eq!(engine.listen_timeout(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn out_of_range_age_is_reprompted() {
        let mut engine = fresh_engine();
        engine.submit_turn("my name is Sam").await;

        let reply = engine.submit_turn("4").await;
        assert_eq!(reply.phase, EnginePhase::AwaitingAge);
        assert!(reply.text.contains("between 5 and 50"));

        let reply = engine.submit_turn("51").await;
        assert_eq!(reply.phase, EnginePhase::AwaitingAge);
        assert!(reply.text.contains("between 5 and 50"));
    }

    #[tokio::test]
    async fn unparseable_name_gives_up_after_bounded_attempts() {
        let mut engine = fresh_engine();
        for _ in 0..2 {
            let reply = engine.submit_turn("not telling").await;
            assert_eq!(reply.phase, EnginePhase::AwaitingName);
            assert!(!reply.ended);
        }
        let reply = engine.submit_turn("still not telling").await;
        assert!(reply.ended);
        assert_eq!(reply.phase, EnginePhase::Terminated);
    }

    #[tokio::test]
    async fn negative_tone_takes_calming_branch_without_backend() {
        let mut replies = MockReplies::new();
        replies.expect_generate().never();
        let mut engine = engine_with(
            Arc::new(replies),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                rng_seed: Some(1),
                ..EngineConfig::default()
            },
            Some(UserProfile::new("Sam", 7)),
        );

        let reply = engine.submit_turn("i feel sad and worthless").await;
        assert!(reply.slow);
        assert!(reply.text.contains("cozy fort"));
        assert_eq!(reply.phase, EnginePhase::Active);
    }

    #[tokio::test]
    async fn neutral_tone_uses_generated_reply() {
        let mut engine = active_engine().await;
        let reply = engine.submit_turn("tell me about the weather").await;
        assert_eq!(reply.text, "I hear you.");
        assert!(!reply.slow);
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_safe_reply() {
        let mut replies = MockReplies::new();
        replies
            .expect_generate()
            .returning(|_, _| Err(ReplyError::Backend("boom".to_string())));
        let mut engine = engine_with(
            Arc::new(replies),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig::default(),
            Some(UserProfile::new("Ada", 30)),
        );

        let reply = engine.submit_turn("tell me something").await;
        assert!(reply.text.contains("ran into a small issue"));
        assert_eq!(reply.phase, EnginePhase::Active);
    }

    #[tokio::test]
    async fn quit_phrase_ends_session_and_saves_once() {
        let mut store = MockStore::new();
        store
            .expect_save()
            .with(always())
            .times(1)
            .returning(|_| Ok(()));
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("ok")),
            Arc::new(store),
            EngineConfig::default(),
            Some(UserProfile::new("Sam", 7)),
        );

        let reply = engine.submit_turn("bye").await;
        assert!(reply.ended);
        assert!(reply.text.contains("here's what we covered today"));
        assert!(reply.text.contains("Goodbye"));

        // Terminated is absorbing and does not save again.
        let reply = engine.submit_turn("hello?").await;
        assert!(reply.ended);
        assert!(reply.text.contains("session has ended"));
    }

    #[tokio::test]
    async fn quit_phrase_inside_sentence_does_not_end() {
        let mut engine = active_engine().await;
        let reply = engine.submit_turn("my dog ran away and i said goodbye").await;
        assert!(!reply.ended);
    }

    #[tokio::test]
    async fn break_is_offered_past_threshold_and_pause_resumes() {
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("ok")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                break_threshold: 2,
                ..EngineConfig::default()
            },
            Some(UserProfile::new("Ada", 30)),
        );

        engine.submit_turn("hello").await;
        engine.submit_turn("more chat").await;
        let reply = engine.submit_turn("still here").await;
        assert!(reply.text.contains("take a short break"));

        let reply = engine.submit_turn("a break sounds nice").await;
        assert_eq!(reply.phase, EnginePhase::Paused);

        let reply = engine.submit_turn("i'm back").await;
        assert_eq!(reply.phase, EnginePhase::Active);
        assert!(reply.text.contains("Welcome back"));
    }

    #[tokio::test]
    async fn paused_session_survives_long_silence() {
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("ok")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                break_threshold: 2,
                ..EngineConfig::default()
            },
            Some(UserProfile::new("Ada", 30)),
        );

        engine.submit_turn("hello").await;
        engine.submit_turn("more chat").await;
        engine.submit_turn("still here").await;
        let reply = engine.submit_turn("let's take a break").await;
        assert_eq!(reply.phase, EnginePhase::Paused);
        assert_eq!(engine.listen_timeout(), Duration::from_secs(300));

        // Silence well past the disengage tier must not end the session.
        engine.state.backdate_interaction(Duration::from_secs(20));
        let reply = engine.submit_turn("").await;
        assert!(!reply.ended);
        assert!(reply.text.is_empty());
        assert_eq!(reply.phase, EnginePhase::Paused);

        let reply = engine.submit_turn("i'm back").await;
        assert_eq!(reply.phase, EnginePhase::Active);
        assert!(reply.text.contains("Welcome back"));
    }

    #[tokio::test]
    async fn declining_break_continues_without_reoffering_immediately() {
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("ok")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                break_threshold: 2,
                ..EngineConfig::default()
            },
            Some(UserProfile::new("Ada", 30)),
        );

        engine.submit_turn("hello").await;
        engine.submit_turn("more chat").await;
        let reply = engine.submit_turn("still here").await;
        assert!(reply.text.contains("take a short break"));

        let reply = engine.submit_turn("keep going").await;
        assert!(reply.text.contains("keep going"));
        // The baseline moved, so the very next turn is not another offer.
        let reply = engine.submit_turn("what next").await;
        assert!(!reply.text.contains("take a short break"));
    }

    #[tokio::test]
    async fn feedback_flow_records_rating_and_comment() {
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("Here is a thought.")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                collect_feedback: true,
                ..EngineConfig::default()
            },
            Some(UserProfile::new("Ada", 30)),
        );

        let reply = engine.submit_turn("tell me something").await;
        assert!(reply.text.contains("scale of 1 to 5"));

        let reply = engine.submit_turn("4").await;
        assert!(reply.text.contains("add a comment"));

        let reply = engine.submit_turn("very thoughtful").await;
        assert!(reply.text.contains("feedback is valuable"));

        let summary = engine.state().feedback.summary();
        assert_eq!(summary.average_rating, Some(4.0));
        assert_eq!(summary.comments, vec!["very thoughtful".to_string()]);
    }

    #[tokio::test]
    async fn invalid_rating_is_retried_then_skipped() {
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("Here is a thought.")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig {
                collect_feedback: true,
                ..EngineConfig::default()
            },
            Some(UserProfile::new("Ada", 30)),
        );

        engine.submit_turn("tell me something").await;
        let reply = engine.submit_turn("seven").await;
        assert!(reply.text.contains("between 1 and 5"));
        let reply = engine.submit_turn("ten").await;
        assert!(reply.text.contains("between 1 and 5"));
        let reply = engine.submit_turn("maybe").await;
        assert!(reply.text.contains("let's keep chatting"));
        assert!(engine.state().feedback.is_empty());
    }

    #[tokio::test]
    async fn positive_tone_alternates_exercise_and_goal_capture() {
        let mut engine = active_engine().await;

        let reply = engine.submit_turn("i feel happy today").await;
        assert!(reply.text.contains("activity"));

        let reply = engine.submit_turn("i feel so excited").await;
        assert!(reply.text.contains("dream of being or doing"));

        let reply = engine.submit_turn("get better at reading").await;
        assert!(reply.text.contains("one small step"));

        let reply = engine.submit_turn("i will read every night").await;
        assert!(reply.text.contains("fantastic start"));

        let goals: Vec<_> = engine.state().goals.iter().collect();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].description, "get better at reading");
    }

    #[tokio::test]
    async fn short_silence_is_ignored_and_long_silence_closes() {
        let mut engine = active_engine().await;

        let reply = engine.submit_turn("").await;
        assert!(reply.text.is_empty());
        assert!(!reply.ended);

        engine.state.backdate_interaction(Duration::from_secs(8));
        let reply = engine.submit_turn("").await;
        assert!(reply.text.contains("Sam"));
        assert!(!reply.ended);

        engine.state.backdate_interaction(Duration::from_secs(20));
        let reply = engine.submit_turn("").await;
        assert!(reply.ended);
        assert!(reply.text.contains("busy right now"));
    }

    #[tokio::test]
    async fn cancel_terminates_with_summary() {
        let mut engine = active_engine().await;
        engine.submit_turn("i like drawing dinosaurs").await;

        let reply = engine.cancel().await;
        assert!(reply.ended);
        assert!(reply.text.contains("here's what we covered today"));

        let reply = engine.cancel().await;
        assert!(reply.ended);
        assert!(reply.text.is_empty());
    }

    #[tokio::test]
    async fn returning_profile_skips_slot_filling() {
        let mut engine = engine_with(
            Arc::new(StaticReplyGenerator::new("ok")),
            Arc::new(MemoryProfileStore::default()),
            EngineConfig::default(),
            Some(UserProfile::new("Priya", 15)),
        );
        assert_eq!(engine.phase(), EnginePhase::Active);
        assert_eq!(engine.listen_timeout(), Duration::from_secs(12));
        let greeting = engine.greeting();
        assert!(greeting.text.contains("Welcome back, Priya"));
    }
}
