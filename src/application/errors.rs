//! Application layer errors

use thiserror::Error;

/// Errors reported by a live connection handle
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection closed: {0}")]
    Closed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command registration errors. A registration that fails leaves the command table untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Bot not registered: {0}")]
    UnknownBot(String),

    #[error("Unknown argument type '{entry}' for command '{command}'")]
    UnknownArgumentType { command: String, entry: String },

    #[error("You cannot use the argument type '{entry}' in command '{command}', as it doesn't have a parser")]
    UnsafeArgumentType { command: String, entry: String },

    #[error("Command '{0}' has no handler")]
    MissingHandler(String),

    #[error("Command trigger cannot be empty")]
    EmptyTrigger,

    #[error("Command '{0}' is already registered")]
    DuplicateTrigger(String),
}

/// A token that an argument type could not convert
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{token}' is not a valid {entry}: {reason}")]
pub struct ParseFailure {
    pub entry: String,
    pub token: String,
    pub reason: String,
}

impl ParseFailure {
    pub fn new(entry: impl Into<String>, token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Dispatch-time failures: a trigger matched but the message could not be turned into a call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Command '{command}' expects {expected} argument(s) but got {found}. Usage: {usage}")]
    ArityMismatch {
        command: String,
        expected: usize,
        found: usize,
        usage: String,
    },

    /// `position` is zero-based
    #[error("Argument {} of command '{command}' is invalid: {source}", .position + 1)]
    InvalidArgument {
        command: String,
        position: usize,
        #[source]
        source: ParseFailure,
    },
}

impl DispatchError {
    pub fn command(&self) -> &str {
        match self {
            DispatchError::ArityMismatch { command, .. } => command,
            DispatchError::InvalidArgument { command, .. } => command,
        }
    }
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
