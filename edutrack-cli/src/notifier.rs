//! Terminal notifier: messages on stderr, confirmations on stdin.

use async_trait::async_trait;
use edutrack::backup::{ConfirmDecision, Notifier, Severity};
use std::io::{self, BufRead, Write};

pub struct ConsoleNotifier {
    assume_yes: bool,
}

impl ConsoleNotifier {
    /// With `assume_yes`, every prompt is answered with confirm.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        let label = match severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("[{}] {}", label, message);
    }

    async fn confirm(&self, title: &str, message: &str) -> ConfirmDecision {
        eprintln!();
        eprintln!("{}", title);
        eprintln!("{}", "-".repeat(title.len()));
        eprintln!("{}", message);
        eprintln!();

        if self.assume_yes {
            eprintln!("Proceeding (--yes)");
            return ConfirmDecision::Confirm;
        }

        let answer = tokio::task::spawn_blocking(|| -> io::Result<String> {
            eprint!("Continue? [y/N] ");
            io::stderr().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => ConfirmDecision::from(is_yes(&line)),
            Ok(Err(e)) => {
                tracing::warn!("Could not read confirmation: {}", e);
                ConfirmDecision::Decline
            }
            Err(e) => {
                tracing::warn!("Confirmation prompt failed: {}", e);
                ConfirmDecision::Decline
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[tokio::test]
    async fn test_assume_yes_skips_prompt() {
        let notifier = ConsoleNotifier::new(true);
        let decision = notifier.confirm("Confirm Restore", "3 Students").await;
        assert_eq!(decision, ConfirmDecision::Confirm);
    }
}
