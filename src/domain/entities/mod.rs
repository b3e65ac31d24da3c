//! Domain entities - connections, messages and command definitions

pub mod command;
pub mod connection;
pub mod message;
pub mod user;

pub use command::{ArgumentSpec, CommandDefinition, CommandHandler, CommandTable, Invocation, ParsedArguments};
pub use connection::BotConnection;
pub use message::Message;
pub use user::User;
