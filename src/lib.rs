//! multibot - runs several named chat bot connections in one process and routes their
//! text commands to handlers with typed, validated arguments.
//!
//! The host owns a [`BotRegistry`], registers commands through a [`CommandService`], and
//! passes every inbound message to [`CommandRouter::route`].

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{BotError, CommandError, ConfigError, DispatchError, ParseFailure, RegistrationError};
pub use application::messaging::{CommandRouter, DispatchHandle, IgnoreReason, RouteOutcome, RouterOptions};
pub use application::registry::BotRegistry;
pub use application::services::CommandService;
pub use domain::catalog::{ArgumentCatalog, CatalogEntry, TypeTag, Value};
pub use domain::entities::{BotConnection, CommandDefinition, Invocation, Message, ParsedArguments, User};
pub use domain::text_safety::{is_safe, truncate, TextKind};
pub use domain::traits::{ConnectionHandle, HandleId};
