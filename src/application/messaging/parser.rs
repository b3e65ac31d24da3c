//! Command parser - matches message text against a command table and converts its arguments

use std::sync::Arc;

use crate::application::errors::DispatchError;
use crate::domain::catalog::ArgumentCatalog;
use crate::domain::entities::{CommandDefinition, CommandTable, ParsedArguments};

/// A matched command and the raw tokens that followed its trigger
#[derive(Debug, Clone)]
pub struct MatchedCommand {
    pub command: Arc<CommandDefinition>,
    pub raw_args: Vec<String>,
}

/// Find the command a message invokes. `None` when no trigger matches.
pub fn match_command(table: &CommandTable, text: &str) -> Option<MatchedCommand> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    let command = table.find(&tokens)?;
    let raw_args = tokens[command.trigger_len()..]
        .iter()
        .map(|s| s.to_string())
        .collect();
    Some(MatchedCommand { command, raw_args })
}

/// Convert raw tokens into typed arguments.
///
/// The token count must equal the argument count, and the first token that fails to
/// parse stops the conversion.
pub fn parse_arguments(
    command: &CommandDefinition,
    raw_args: &[String],
) -> Result<ParsedArguments, DispatchError> {
    if raw_args.len() != command.arguments.len() {
        return Err(DispatchError::ArityMismatch {
            command: command.trigger.clone(),
            expected: command.arguments.len(),
            found: raw_args.len(),
            usage: command.usage(),
        });
    }

    let mut values = Vec::with_capacity(raw_args.len());
    for (spec, raw) in command.arguments.iter().zip(raw_args) {
        let value = ArgumentCatalog::parse(&spec.entry, raw).map_err(|source| {
            DispatchError::InvalidArgument {
                command: command.trigger.clone(),
                position: spec.position,
                source,
            }
        })?;
        values.push(value);
    }
    Ok(ParsedArguments::new(values))
}
