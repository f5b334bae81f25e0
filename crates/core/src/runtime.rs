//! Interactive Session Runtime
//!
//! Drives one complete session over a pair of speech bindings: capture an
//! utterance with the band-appropriate timeout, submit it to the engine,
//! render the reply, repeat until the engine reports the session has ended.
//! Rendering failures are logged and skipped; the session itself never dies
//! because output stuttered.

use crate::engine::{DialogueEngine, TurnReply};
use crate::speech::{Captured, SpeechInput, SpeechOutput};
use std::sync::Arc;
use tracing::warn;

pub struct SessionRuntime {
    engine: DialogueEngine,
    input: Arc<dyn SpeechInput>,
    output: Arc<dyn SpeechOutput>,
}

impl SessionRuntime {
    pub fn new(
        engine: DialogueEngine,
        input: Arc<dyn SpeechInput>,
        output: Arc<dyn SpeechOutput>,
    ) -> Self {
        Self {
            engine,
            input,
            output,
        }
    }

    /// Runs the session to completion. Returns the engine for inspection.
    pub async fn run(mut self) -> DialogueEngine {
        let greeting = self.engine.greeting();
        self.render(&greeting).await;

        loop {
            let captured = match self.input.capture(self.engine.listen_timeout()).await {
                Ok(captured) => captured,
                // Recognition failures are recoverable; the idle policy closes
                // the session if they persist.
                Err(e) => {
                    warn!(error = %e, "Speech capture failed; treating as silence");
                    Captured::Empty
                }
            };
            let utterance = match &captured {
                Captured::Text(text) => text.as_str(),
                // Silence and timeouts both route through the idle policy.
                Captured::Empty | Captured::TimedOut => "",
            };

            let reply = self.engine.submit_turn(utterance).await;
            self.render(&reply).await;
            if reply.ended {
                break;
            }
        }

        self.engine
    }

    async fn render(&self, reply: &TurnReply) {
        if reply.text.is_empty() {
            return;
        }
        if let Err(e) = self.output.render(&reply.text, reply.slow).await {
            warn!(error = %e, "Could not render reply; continuing session");
        }
    }
}
