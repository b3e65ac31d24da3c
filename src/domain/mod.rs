//! Domain layer - Core types with no knowledge of the live platform
//! 
//! This layer contains:
//! - Entities: Connections, messages, command definitions and tables
//! - Traits: Abstractions for the platform client (ConnectionHandle)
//! - Catalog: Argument types and their parsers
//! - Text safety and name lookup helpers

pub mod catalog;
pub mod entities;
pub mod lookup;
pub mod text_safety;
pub mod traits;
