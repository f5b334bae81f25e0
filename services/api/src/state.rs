//! Shared Application State
//!
//! `AppState` holds the resources shared by all handlers: the immutable
//! lexicon, the reply backend, the profile store, and the live session map.
//! Each session owns one `DialogueEngine` behind its own lock so concurrent
//! sessions never serialize on each other; the outer map lock is only held
//! long enough to look an engine up.

use crate::config::Config;
use amie_core::{DialogueEngine, EngineConfig, Lexicon, ProfileStore, ReplyGenerator};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub type SessionMap = Mutex<HashMap<Uuid, Arc<Mutex<DialogueEngine>>>>;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub lexicon: Arc<Lexicon>,
    pub reply_gen: Arc<dyn ReplyGenerator>,
    pub profile_store: Arc<dyn ProfileStore>,
    pub engine_config: EngineConfig,
    pub sessions: Arc<SessionMap>,
    pub config: Arc<Config>,
}
