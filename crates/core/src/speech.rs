//! Speech Capability Contracts
//!
//! Audio capture and synthesis are external collaborators; the engine only
//! sees these two traits. Console bindings are provided so a session can be
//! driven end-to-end from a terminal without any audio hardware.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Result of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    Text(String),
    /// Input arrived but carried nothing usable.
    Empty,
    /// Nothing arrived within the timeout.
    TimedOut,
}

/// Captures one user utterance, bounded by a timeout.
///
/// Bindings should map recognition failures to `Captured::Empty` with a log
/// rather than erroring: unrecognized speech is a recoverable condition.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    async fn capture(&self, timeout: Duration) -> Result<Captured>;
}

/// Renders a reply to the user. Fire-and-forget; the engine ignores failures.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn render(&self, text: &str, slow: bool) -> Result<()>;
}

async fn capture_line<R>(reader: &mut R, timeout: Duration) -> Result<Captured>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = String::new();
    match tokio::time::timeout(timeout, reader.read_line(&mut line)).await {
        Err(_) => Ok(Captured::TimedOut),
        Ok(Err(e)) => Err(e.into()),
        Ok(Ok(0)) => Ok(Captured::Empty),
        Ok(Ok(_)) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Ok(Captured::Empty)
            } else {
                Ok(Captured::Text(trimmed.to_string()))
            }
        }
    }
}

/// Line-oriented stdin binding for `SpeechInput`.
///
/// One reader lives for the life of the binding, so bytes buffered beyond
/// the current line survive between captures.
pub struct ConsoleInput {
    reader: Mutex<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechInput for ConsoleInput {
    async fn capture(&self, timeout: Duration) -> Result<Captured> {
        let mut reader = self.reader.lock().await;
        capture_line(&mut *reader, timeout).await
    }
}

/// Stdout binding for `SpeechOutput`.
pub struct ConsoleOutput;

#[async_trait]
impl SpeechOutput for ConsoleOutput {
    async fn render(&self, text: &str, slow: bool) -> Result<()> {
        // A real TTS binding slows its speaking rate here; on a console the
        // flag is informational only.
        let _ = slow;
        println!("Amie: {text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consecutive_captures_share_buffered_input() {
        let mut reader = BufReader::new(&b"first line\nsecond line\n"[..]);
        let timeout = Duration::from_secs(1);

        assert_eq!(
            capture_line(&mut reader, timeout).await.unwrap(),
            Captured::Text("first line".to_string())
        );
        // The second line was buffered during the first read and must not
        // be lost.
        assert_eq!(
            capture_line(&mut reader, timeout).await.unwrap(),
            Captured::Text("second line".to_string())
        );
        assert_eq!(
            capture_line(&mut reader, timeout).await.unwrap(),
            Captured::Empty
        );
    }

    #[tokio::test]
    async fn blank_line_captures_as_empty() {
        let mut reader = BufReader::new(&b"   \n"[..]);
        assert_eq!(
            capture_line(&mut reader, Duration::from_secs(1))
                .await
                .unwrap(),
            Captured::Empty
        );
    }
}
