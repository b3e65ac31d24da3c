//! Message handling - matching inbound messages to commands and dispatching them

pub mod parser;
pub mod router;

pub use parser::{match_command, parse_arguments, MatchedCommand};
pub use router::{CommandRouter, DispatchHandle, IgnoreReason, RouteOutcome, RouterOptions};
