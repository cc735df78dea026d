//! Interactive client prompt
//!
//! Asks for the server address, then loops reading commands until EXIT or
//! end of input. Generic over its input and output so it can be scripted.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::client::connection::FileClient;
use crate::error::ClientError;
use crate::storage::OperationRequest;

const COMMAND_PROMPT: &str = "Enter command (GET, PUT, POST, DELETE, COPY, MOVE, EXIT): ";

/// What the user asked for at the command prompt.
enum Step {
    Send(OperationRequest),
    Invalid,
    Exit,
}

struct Prompter<'a, R, W> {
    lines: Lines<R>,
    output: &'a mut W,
}

impl<R, W> Prompter<'_, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Prints `question` and reads one line. `None` means end of input.
    async fn ask(&mut self, question: &str) -> Result<Option<String>, ClientError> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self.lines.next_line().await?)
    }

    async fn say(&mut self, text: &str) -> Result<(), ClientError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Reads a command and its arguments. `None` means end of input.
    async fn next_step(&mut self) -> Result<Option<Step>, ClientError> {
        let Some(command) = self.ask(COMMAND_PROMPT).await? else {
            return Ok(None);
        };

        let step = match command.trim().to_ascii_uppercase().as_str() {
            "EXIT" => Step::Exit,
            "GET" => {
                let Some(path) = self.ask("Enter filepath: ").await? else {
                    return Ok(None);
                };
                Step::Send(OperationRequest::Read {
                    path: path.trim().into(),
                })
            }
            "PUT" => {
                let Some(path) = self.ask("Enter filepath: ").await? else {
                    return Ok(None);
                };
                let Some(data) = self.ask("Enter new data: ").await? else {
                    return Ok(None);
                };
                Step::Send(OperationRequest::Overwrite {
                    path: path.trim().into(),
                    data,
                })
            }
            "POST" => {
                let Some(path) = self.ask("Enter filepath: ").await? else {
                    return Ok(None);
                };
                let Some(data) = self.ask("Enter data to append: ").await? else {
                    return Ok(None);
                };
                Step::Send(OperationRequest::Append {
                    path: path.trim().into(),
                    data,
                })
            }
            "DELETE" => {
                let Some(path) = self.ask("Enter filepath: ").await? else {
                    return Ok(None);
                };
                Step::Send(OperationRequest::Delete {
                    path: path.trim().into(),
                })
            }
            verb @ ("COPY" | "MOVE") => {
                let Some(path) = self.ask("Enter source filepath: ").await? else {
                    return Ok(None);
                };
                let Some(destination) = self.ask("Enter destination filepath: ").await? else {
                    return Ok(None);
                };
                let (path, destination) = (path.trim().to_string(), destination.trim().to_string());
                Step::Send(if verb == "COPY" {
                    OperationRequest::Copy { path, destination }
                } else {
                    OperationRequest::Move { path, destination }
                })
            }
            _ => Step::Invalid,
        };

        Ok(Some(step))
    }
}

/// Full interactive session: prompts for host and port, connects, then runs
/// the command loop.
pub async fn run<R, W>(input: R, output: &mut W) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut prompter = Prompter {
        lines: input.lines(),
        output,
    };

    let Some(host) = prompter.ask("Enter the host: ").await? else {
        return prompter.say("Terminated").await;
    };
    let Some(port) = prompter.ask("Enter the port number: ").await? else {
        return prompter.say("Terminated").await;
    };

    let mut client = FileClient::connect(format!("{}:{}", host.trim(), port.trim())).await?;
    command_loop(&mut prompter, &mut client).await
}

/// Runs only the command loop against an already connected client.
pub async fn run_commands<R, W>(
    input: R,
    output: &mut W,
    client: &mut FileClient,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut prompter = Prompter {
        lines: input.lines(),
        output,
    };
    command_loop(&mut prompter, client).await
}

async fn command_loop<R, W>(
    prompter: &mut Prompter<'_, R, W>,
    client: &mut FileClient,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(step) = prompter.next_step().await? {
        let request = match step {
            Step::Exit => break,
            Step::Invalid => {
                prompter.say("Invalid command.").await?;
                continue;
            }
            Step::Send(request) => request,
        };

        let response = match client.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                prompter.say(&format!("Error: {e}")).await?;
                return Err(e);
            }
        };

        let text = match (&request, response.is_success()) {
            (OperationRequest::Read { .. }, true) => {
                format!("File content: {}", response.body.unwrap_or_default())
            }
            (_, true) => response.message,
            (_, false) => format!("Error: {}", response.message),
        };
        prompter.say(&text).await?;
    }

    prompter.say("Terminated").await
}
