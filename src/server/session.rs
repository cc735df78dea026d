//! Client session loop
//!
//! Reads request lines from one connection and answers each in order.

use log::{info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::ProtocolError;
use crate::error::handlers::protocol_status_code;
use crate::protocol::handle_request;
use crate::protocol::responses::{BAD_REQUEST, Response};
use crate::server::registry::ClientRegistry;
use crate::storage::FileEngine;

/// Serves requests from one connected client until it disconnects.
///
/// A request line longer than `max_request_bytes` is answered with 413 and
/// the connection is closed, since the rest of that line cannot be framed.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    registry: ClientRegistry,
    engine: FileEngine,
    max_request_bytes: usize,
) -> io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = (&mut reader)
            .take(max_request_bytes as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;

        if n == 0 {
            info!("Connection closed by client {}", client_addr);
            return Ok(());
        }

        if line.len() > max_request_bytes && line.last() != Some(&b'\n') {
            let err = ProtocolError::RequestTooLarge(max_request_bytes);
            warn!("Client {}: {}", client_addr, err);
            let response = Response::new(protocol_status_code(&err), err.to_string());
            write_half.write_all(response.to_line().as_bytes()).await?;
            write_half.shutdown().await?;
            return Ok(());
        }

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        registry.record_request(client_addr).await;

        let response = match std::str::from_utf8(&line) {
            Ok(raw) => handle_request(&engine, raw).await,
            Err(_) => Response::new(BAD_REQUEST, "Request is not valid UTF-8"),
        };

        info!(
            "Sending response to client {}: {} {}",
            client_addr, response.status, response.message
        );
        write_half.write_all(response.to_line().as_bytes()).await?;
    }
}
