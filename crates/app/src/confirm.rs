//! Terminal confirmation prompts.

use async_trait::async_trait;
use keydesk_application::ports::Confirmer;
use keydesk_domain::Confirmation;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Asks on stderr and reads the answer from stdin.
///
/// With `assume_yes` every prompt is accepted without reading input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer {
    assume_yes: bool,
}

impl TerminalConfirmer {
    /// Creates a confirmer.
    #[must_use]
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, confirmation: &Confirmation) -> bool {
        if self.assume_yes {
            return true;
        }

        let prompt = format!("{}: {} [y/N] ", confirmation.title(), confirmation.message());
        let mut stderr = tokio::io::stderr();
        if stderr.write_all(prompt.as_bytes()).await.is_err() || stderr.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::debug!(error = %e, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
