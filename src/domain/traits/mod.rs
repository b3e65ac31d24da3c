//! Domain traits - Abstractions for infrastructure implementations

pub mod connection;

pub use connection::{ConnectionHandle, HandleId};
