use std::fmt;
use std::sync::Arc;

use super::CommandTable;
use crate::domain::traits::{ConnectionHandle, HandleId};

/// A named, live bot connection and the commands registered against it
pub struct BotConnection {
    name: String,
    handle: Arc<dyn ConnectionHandle>,
    commands: CommandTable,
}

impl BotConnection {
    pub fn new(name: impl Into<String>, handle: Arc<dyn ConnectionHandle>) -> Self {
        Self {
            name: name.into(),
            handle,
            commands: CommandTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &Arc<dyn ConnectionHandle> {
        &self.handle
    }

    pub fn handle_id(&self) -> HandleId {
        self.handle.id()
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }
}

impl fmt::Debug for BotConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConnection")
            .field("name", &self.name)
            .field("handle", &self.handle.id())
            .field("commands", &self.commands.len())
            .finish()
    }
}
