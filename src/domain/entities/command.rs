use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::Message;
use crate::application::errors::{CommandError, RegistrationError};
use crate::domain::catalog::{ArgumentCatalog, CatalogEntry, Value};

/// Command handler function type. `Some` is sent back to the originating chat.
pub type CommandHandler = Arc<dyn Fn(Invocation) -> Result<Option<String>, CommandError> + Send + Sync>;

/// A positional argument backed by a catalog entry
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub position: usize,
    pub entry: Arc<CatalogEntry>,
}

/// Represents a text command bound to a bot
pub struct CommandDefinition {
    pub trigger: String,
    trigger_tokens: Vec<String>,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub arguments: Vec<ArgumentSpec>,
    pub handler: Option<CommandHandler>,
}

impl CommandDefinition {
    /// Whitespace inside the trigger is collapsed, so `"quit  now"` and `"quit now"` are the same trigger.
    pub fn new(trigger: impl AsRef<str>) -> Self {
        let trigger_tokens: Vec<String> = trigger.as_ref().split_whitespace().map(str::to_string).collect();
        Self {
            trigger: trigger_tokens.join(" "),
            trigger_tokens,
            description: None,
            usage: None,
            arguments: Vec::new(),
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Appends the next positional argument.
    pub fn with_argument(mut self, entry: Arc<CatalogEntry>) -> Self {
        let position = self.arguments.len();
        self.arguments.push(ArgumentSpec { position, entry });
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Invocation) -> Result<Option<String>, CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn trigger_len(&self) -> usize {
        self.trigger_tokens.len()
    }

    /// Usage line, derived from the argument types when none was given.
    pub fn usage(&self) -> String {
        if let Some(usage) = &self.usage {
            return usage.clone();
        }
        let mut usage = self.trigger.clone();
        for spec in &self.arguments {
            usage.push_str(&format!(" <{}>", spec.entry.name));
        }
        usage
    }

    /// True when the leading tokens of a message equal this trigger, ignoring case.
    pub fn matches(&self, tokens: &[&str]) -> bool {
        !self.trigger_tokens.is_empty()
            && tokens.len() >= self.trigger_tokens.len()
            && self
                .trigger_tokens
                .iter()
                .zip(tokens)
                .all(|(t, m)| t.to_lowercase() == m.to_lowercase())
    }

    fn same_trigger(&self, other: &CommandDefinition) -> bool {
        self.trigger.to_lowercase() == other.trigger.to_lowercase()
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("trigger", &self.trigger)
            .field("arguments", &self.arguments)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Per-bot command table, kept in registration order
#[derive(Default)]
pub struct CommandTable {
    commands: RwLock<Vec<Arc<CommandDefinition>>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and adds a command. Nothing is added if any check fails.
    pub fn register(&self, command: CommandDefinition) -> Result<(), RegistrationError> {
        if command.trigger_tokens.is_empty() {
            return Err(RegistrationError::EmptyTrigger);
        }
        if command.handler.is_none() {
            return Err(RegistrationError::MissingHandler(command.trigger.clone()));
        }
        if let Some(spec) = command
            .arguments
            .iter()
            .find(|spec| !ArgumentCatalog::validate(&spec.entry))
        {
            return Err(RegistrationError::UnsafeArgumentType {
                command: command.trigger.clone(),
                entry: spec.entry.name.clone(),
            });
        }

        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        if commands.iter().any(|c| c.same_trigger(&command)) {
            return Err(RegistrationError::DuplicateTrigger(command.trigger));
        }
        commands.push(Arc::new(command));
        Ok(())
    }

    /// Removes a command by trigger. Returns whether anything was removed.
    pub fn unregister(&self, trigger: &str) -> bool {
        let key = CommandDefinition::new(trigger);
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        let before = commands.len();
        commands.retain(|c| !c.same_trigger(&key));
        commands.len() != before
    }

    /// Finds the command for a tokenized message.
    ///
    /// The trigger with the most tokens wins; on an equal token count the one registered first wins.
    pub fn find(&self, tokens: &[&str]) -> Option<Arc<CommandDefinition>> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        let mut best: Option<&Arc<CommandDefinition>> = None;
        for command in commands.iter().filter(|c| c.matches(tokens)) {
            match best {
                Some(current) if current.trigger_len() >= command.trigger_len() => {}
                _ => best = Some(command),
            }
        }
        best.cloned()
    }

    pub fn get(&self, trigger: &str) -> Option<Arc<CommandDefinition>> {
        let key = CommandDefinition::new(trigger);
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| c.same_trigger(&key))
            .cloned()
    }

    pub fn all(&self) -> Vec<Arc<CommandDefinition>> {
        self.commands.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.commands.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed arguments of one dispatch, in positional order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    values: Vec<Value>,
}

impl ParsedArguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        match self.get(index)? {
            Value::Text(s) | Value::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, index: usize) -> Option<i64> {
        match self.get(index)? {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        match self.get(index)? {
            Value::Number(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn boolean(&self, index: usize) -> Option<bool> {
        match self.get(index)? {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn duration(&self, index: usize) -> Option<Duration> {
        match self.get(index)? {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn user_id(&self, index: usize) -> Option<u64> {
        match self.get(index)? {
            Value::UserId(id) => Some(*id),
            _ => None,
        }
    }
}

/// Everything a handler receives for one dispatch
#[derive(Debug, Clone)]
pub struct Invocation {
    pub bot: String,
    pub command: String,
    pub args: ParsedArguments,
    pub message: Message,
}
