pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod storage;

pub use server::Server;
pub use storage::{FileEngine, StorageRoot};
