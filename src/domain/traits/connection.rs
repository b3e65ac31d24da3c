use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::errors::BotError;

/// Identity of a live platform connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ConnectionHandle trait - the platform client's side of a bot connection
#[async_trait]
pub trait ConnectionHandle: Send + Sync {
    /// Stable identity, used to resolve which bot received an event
    fn id(&self) -> HandleId;

    /// Signal the connection to shut down. Must not block.
    ///
    /// Called while the bot registry holds its write lock, so implementations must not
    /// call back into the registry.
    fn shutdown(&self);

    /// Send a text message to a chat
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError>;
}
