//! # Adapters Module
//!
//! Concrete implementations of outbound ports.

pub mod command_shutdown;

pub use command_shutdown::CommandShutdown;
