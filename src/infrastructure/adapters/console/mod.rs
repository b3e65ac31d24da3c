//! Console adapter for development/testing

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::errors::BotError;
use crate::domain::traits::{ConnectionHandle, HandleId};

/// Connection that prints replies to stdout
pub struct ConsoleConnection {
    id: HandleId,
    label: String,
    closed: AtomicBool,
}

impl ConsoleConnection {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: HandleId::new(),
            label: label.into(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionHandle for ConsoleConnection {
    fn id(&self) -> HandleId {
        self.id
    }

    fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Console connection {} closed", self.label);
        }
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        if self.is_closed() {
            return Err(BotError::Closed(self.label.clone()));
        }
        println!("[{}@{}] {}", self.label, chat_id, text);
        Ok(())
    }
}

/// Line reader over stdin
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next trimmed line, or `None` on EOF
    pub async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `bot: text` into its bot name and text. Plain text has no bot name.
pub fn split_addressed(line: &str) -> (Option<&str>, &str) {
    match line.split_once(':') {
        Some((bot, text)) if !bot.trim().is_empty() && !bot.trim().contains(char::is_whitespace) => {
            (Some(bot.trim()), text.trim())
        }
        _ => (None, line.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_addressed() {
        assert_eq!(split_addressed("alpha: ban 42 10m"), (Some("alpha"), "ban 42 10m"));
        assert_eq!(split_addressed("ping"), (None, "ping"));
        assert_eq!(split_addressed("say hello: world"), (None, "say hello: world"));
    }

    #[tokio::test]
    async fn test_closed_connection_refuses_messages() {
        let connection = ConsoleConnection::new("alpha");
        assert!(connection.send_message("console", "hi").await.is_ok());
        connection.shutdown();
        connection.shutdown();
        assert!(connection.is_closed());
        assert!(matches!(
            connection.send_message("console", "hi").await,
            Err(BotError::Closed(_))
        ));
    }
}
