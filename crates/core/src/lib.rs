//! Core library for Amie, a turn-based, age-adaptive, emotion-aware
//! conversational companion. The `DialogueEngine` is the entry point; the
//! surrounding modules supply its collaborators: keyword and prompt tables,
//! tone classification, fatigue policy, profile persistence, and the reply
//! backend contract.

pub mod emotion;
pub mod engine;
pub mod fatigue;
pub mod feedback;
pub mod goals;
pub mod lexicon;
pub mod profile;
pub mod prompts;
pub mod reply;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod summary;

pub use emotion::{EmotionClassifier, Tone};
pub use engine::{DialogueEngine, EngineConfig, EnginePhase, TurnReply};
pub use lexicon::{Lexicon, SelCategory};
pub use profile::{AgeBand, JsonProfileStore, MemoryProfileStore, ProfileStore, UserProfile};
pub use reply::{OpenAIReplyGenerator, ReplyError, ReplyGenerator, StaticReplyGenerator};
pub use runtime::SessionRuntime;
pub use speech::{Captured, ConsoleInput, ConsoleOutput, SpeechInput, SpeechOutput};
