use std::sync::{Arc, Weak};

use crate::application::errors::RegistrationError;
use crate::application::registry::BotRegistry;
use crate::domain::catalog::ArgumentCatalog;
use crate::domain::entities::{BotConnection, CommandDefinition};

/// Entry point for registering and removing commands on registered bots
pub struct CommandService {
    registry: Arc<BotRegistry>,
    catalog: Arc<ArgumentCatalog>,
}

impl CommandService {
    pub fn new(registry: Arc<BotRegistry>, catalog: Arc<ArgumentCatalog>) -> Self {
        Self { registry, catalog }
    }

    pub fn catalog(&self) -> &Arc<ArgumentCatalog> {
        &self.catalog
    }

    /// Start a command whose arguments are catalog entries named by `arg_types`.
    pub fn define(&self, trigger: &str, arg_types: &[&str]) -> Result<CommandDefinition, RegistrationError> {
        let mut command = CommandDefinition::new(trigger);
        for name in arg_types {
            let entry = self
                .catalog
                .get(name)
                .ok_or_else(|| RegistrationError::UnknownArgumentType {
                    command: command.trigger.clone(),
                    entry: name.to_string(),
                })?;
            command = command.with_argument(entry);
        }
        Ok(command)
    }

    /// Register a command on a bot. Every argument type must have a parser.
    pub fn register(&self, bot: &str, command: CommandDefinition) -> Result<(), RegistrationError> {
        let connection = self.bot(bot)?;
        let trigger = command.trigger.clone();
        match connection.commands().register(command) {
            Ok(()) => {
                tracing::info!("[{}] Registered command '{}'", bot, trigger);
                Ok(())
            }
            Err(e) => {
                tracing::error!("[{}] {}", bot, e);
                Err(e)
            }
        }
    }

    pub fn unregister(&self, bot: &str, trigger: &str) -> bool {
        self.registry
            .get(bot)
            .is_some_and(|connection| connection.commands().unregister(trigger))
    }

    /// Registers `help` and `version` on a bot.
    pub fn register_defaults(&self, bot: &str) -> Result<(), RegistrationError> {
        let registry: Weak<BotRegistry> = Arc::downgrade(&self.registry);
        self.register(
            bot,
            CommandDefinition::new("help")
                .with_description("Show available commands")
                .with_handler(move |inv| {
                    Ok(registry
                        .upgrade()
                        .and_then(|registry| registry.get(&inv.bot))
                        .map(|connection| help_text(&connection)))
                }),
        )?;

        self.register(
            bot,
            CommandDefinition::new("version")
                .with_description("Show bot version")
                .with_handler(|_| Ok(Some(format!("multibot v{}", env!("CARGO_PKG_VERSION"))))),
        )
    }

    /// Command listing for a bot, or `None` if it isn't registered
    pub fn help(&self, bot: &str) -> Option<String> {
        self.registry.get(bot).map(|connection| help_text(&connection))
    }

    fn bot(&self, name: &str) -> Result<Arc<BotConnection>, RegistrationError> {
        self.registry
            .get(name)
            .ok_or_else(|| RegistrationError::UnknownBot(name.to_string()))
    }
}

fn help_text(connection: &BotConnection) -> String {
    let mut help = "Available commands:\n".to_string();
    for cmd in connection.commands().all() {
        help.push_str(&format!(
            "  {} - {}\n",
            cmd.usage(),
            cmd.description.as_deref().unwrap_or("No description")
        ));
    }
    help
}
