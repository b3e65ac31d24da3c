//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Registry: The live bot connections of the process
//! - Services: Command registration
//! - Messaging: Command matching, argument conversion, dispatch
//! - Errors: Registration, dispatch and handler errors

pub mod errors;
pub mod messaging;
pub mod registry;
pub mod services;
