//! Client connection
//!
//! Sends requests to a running server and reads back the responses.

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::ClientError;
use crate::protocol::{Response, encode_request};
use crate::storage::OperationRequest;

/// One open connection to a file server.
pub struct FileClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl FileClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to {}", stream.peer_addr()?);

        let (read_half, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    /// Sends one request and waits for its response.
    pub async fn send(&mut self, request: &OperationRequest) -> Result<Response, ClientError> {
        let line = encode_request(request)?;
        self.send_raw(&line).await
    }

    /// Sends a pre-encoded line as-is and reads one response line.
    pub async fn send_raw(&mut self, line: &str) -> Result<Response, ClientError> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;

        self.read_response().await
    }

    /// Reads the next response line from the server.
    pub async fn read_response(&mut self) -> Result<Response, ClientError> {
        let mut reply = String::new();
        if self.reader.read_line(&mut reply).await? == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(serde_json::from_str(reply.trim_end())?)
    }
}
