//! Command router - routes inbound messages to the handler of the matching command
//!
//! Each message is handled in one pass: resolve the receiving bot by handle, match a trigger
//! in that bot's command table, convert the arguments, then hand the call off to a blocking
//! task. [`CommandRouter::route`] never waits for a handler, so a slow handler cannot hold up
//! other messages or other bots.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::parser::{match_command, parse_arguments};
use crate::application::errors::{CommandError, DispatchError};
use crate::application::registry::BotRegistry;
use crate::domain::entities::{Invocation, Message};
use crate::domain::text_safety::{truncate, TextKind};
use crate::domain::traits::HandleId;

/// Why a message was not treated as a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No registered bot owns the delivering connection (e.g. it is being torn down)
    UnknownConnection,
    EmptyContent,
    NoMatchingCommand,
    /// The router has no tokio runtime to run handlers on
    NoRuntime,
}

/// Result of routing one message
#[derive(Debug)]
pub enum RouteOutcome {
    Ignored(IgnoreReason),
    /// A trigger matched but the arguments did not fit; the message counts as handled
    Rejected(DispatchError),
    Dispatched(DispatchHandle),
}

impl RouteOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, RouteOutcome::Dispatched(_))
    }
}

/// A handler invocation running in the background
#[derive(Debug)]
pub struct DispatchHandle {
    bot: String,
    command: String,
    task: JoinHandle<Result<Option<String>, CommandError>>,
}

impl DispatchHandle {
    pub fn bot(&self) -> &str {
        &self.bot
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Wait for the handler. Dropping the handle instead leaves it running.
    pub async fn join(self) -> Result<Option<String>, CommandError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(CommandError::Panicked(e.to_string())),
        }
    }
}

/// Router behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Send dispatch-time mismatches back to the originating chat
    pub report_errors: bool,
    /// Limit applied to replies before they are sent
    pub reply_kind: TextKind,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            report_errors: true,
            reply_kind: TextKind::Content,
        }
    }
}

/// Routes inbound messages to command handlers
#[derive(Clone)]
pub struct CommandRouter {
    registry: Arc<BotRegistry>,
    options: RouterOptions,
    runtime: Option<Handle>,
}

impl CommandRouter {
    /// Picks up the current tokio runtime, if there is one. Use [`CommandRouter::with_runtime`]
    /// when building the router outside a runtime.
    pub fn new(registry: Arc<BotRegistry>) -> Self {
        Self {
            registry,
            options: RouterOptions::default(),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Run handlers and replies on the given runtime, whichever thread calls `route`.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<BotRegistry> {
        &self.registry
    }

    /// Route one inbound message. Safe to call from any thread.
    pub fn route(&self, message: Message) -> RouteOutcome {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!("No tokio runtime available, dropping message {}", message.id);
            return RouteOutcome::Ignored(IgnoreReason::NoRuntime);
        };

        let Some(bot) = self.registry.get_by_handle(message.handle) else {
            tracing::debug!("Ignoring message {} from unknown connection {}", message.id, message.handle);
            return RouteOutcome::Ignored(IgnoreReason::UnknownConnection);
        };

        if message.text.trim().is_empty() {
            return RouteOutcome::Ignored(IgnoreReason::EmptyContent);
        }

        let Some(matched) = match_command(bot.commands(), &message.text) else {
            return RouteOutcome::Ignored(IgnoreReason::NoMatchingCommand);
        };

        let args = match parse_arguments(&matched.command, &matched.raw_args) {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!("[{}] Rejected '{}': {}", bot.name(), matched.command.trigger, e);
                if self.options.report_errors {
                    self.reply(&runtime, message.handle, message.chat_id.clone(), e.to_string());
                }
                return RouteOutcome::Rejected(e);
            }
        };

        // Registration rejects definitions without a handler.
        let Some(handler) = matched.command.handler.clone() else {
            return RouteOutcome::Ignored(IgnoreReason::NoMatchingCommand);
        };

        let bot_name = bot.name().to_string();
        let command = matched.command.trigger.clone();
        tracing::debug!("[{}] Dispatching '{}' with {} argument(s)", bot_name, command, args.len());

        let handle_id = message.handle;
        let chat_id = message.chat_id.clone();
        let invocation = Invocation {
            bot: bot_name.clone(),
            command: command.clone(),
            args,
            message,
        };

        let router = self.clone();
        let log_bot = bot_name.clone();
        let log_command = command.clone();
        let blocking = runtime.clone();
        let task = runtime.spawn(async move {
            let result = match blocking.spawn_blocking(move || handler(invocation)).await {
                Ok(result) => result,
                Err(e) => Err(CommandError::Panicked(e.to_string())),
            };
            match &result {
                Ok(Some(reply)) => router.send_reply(handle_id, &chat_id, reply).await,
                Ok(None) => {}
                Err(e) => tracing::warn!("[{}] Command '{}' failed: {}", log_bot, log_command, e),
            }
            result
        });

        RouteOutcome::Dispatched(DispatchHandle {
            bot: bot_name,
            command,
            task,
        })
    }

    fn reply(&self, runtime: &Handle, handle: HandleId, chat_id: String, text: String) {
        let router = self.clone();
        runtime.spawn(async move {
            router.send_reply(handle, &chat_id, &text).await;
        });
    }

    /// Sends through the bot only if it is still registered.
    async fn send_reply(&self, handle: HandleId, chat_id: &str, text: &str) {
        let Some(bot) = self.registry.get_by_handle(handle) else {
            tracing::debug!("Dropping reply to {}: connection {} is gone", chat_id, handle);
            return;
        };
        let text = truncate(text, self.options.reply_kind);
        let connection = bot.handle().clone();
        drop(bot);
        if let Err(e) = connection.send_message(chat_id, text).await {
            tracing::warn!("Failed to send reply to {}: {}", chat_id, e);
        }
    }
}
