//! File server client
//!
//! A connection type for sending requests and the interactive prompt built on
//! top of it.

pub mod connection;
pub mod prompt;

pub use connection::FileClient;
