//! RAX File Server - Entry Point
//!
//! Serves read, overwrite, append, delete, copy and move requests on files
//! under a single storage root.

use log::{error, info};
use std::process::ExitCode;

use rax_file_server::config::ServerConfig;
use rax_file_server::error::ServerError;
use rax_file_server::{FileEngine, Server, StorageRoot, logging};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("info");

    info!("Launching file server...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;

    let root = StorageRoot::open(config.storage_root_path()).await?;
    info!("Storage root: {}", root.path().display());

    let server = Server::bind(config, FileEngine::new(root)).await?;
    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Server stopped");
    Ok(())
}
