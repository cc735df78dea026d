//! RAX File Client - interactive command prompt for a running server.

use std::process::ExitCode;
use tokio::io::BufReader;

use rax_file_server::client::prompt;
use rax_file_server::logging;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("warn");

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    match prompt::run(input, &mut output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
