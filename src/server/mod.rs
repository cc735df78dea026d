//! Server core functionality
//!
//! Listener, per-connection sessions, and the registry of live clients.

pub mod listener;
pub mod registry;
pub mod session;

pub use listener::Server;
