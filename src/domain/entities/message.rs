use super::User;
use crate::domain::traits::HandleId;
use chrono::{DateTime, Utc};

/// An inbound chat message, tagged with the connection that delivered it
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub handle: HandleId,
    pub chat_id: String,
    pub sender: Option<User>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(handle: HandleId, chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            handle,
            chat_id: chat_id.into(),
            sender: None,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }
}
