//! Subcommand implementations.

pub mod catalog;
pub mod invoice;
pub mod password;
