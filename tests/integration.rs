use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use rax_file_server::client::{FileClient, prompt};
use rax_file_server::config::ServerConfig;
use rax_file_server::error::ClientError;
use rax_file_server::protocol::Response;
use rax_file_server::storage::OperationRequest;
use rax_file_server::{FileEngine, Server, StorageRoot};

struct TestServer {
    _temp_dir: TempDir,
    addr: SocketAddr,
    storage: std::path::PathBuf,
    _shutdown: oneshot::Sender<()>,
}

// Start a server on an ephemeral port with its own storage root
async fn start_test_server(max_clients: usize) -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let root = StorageRoot::open(temp_dir.path().join("storage"))
        .await
        .unwrap();
    let storage = root.path().to_path_buf();

    let config = ServerConfig::from_toml_str(&format!(
        "max_clients = {max_clients}\nmax_request_bytes = 4096"
    ))
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener, config, FileEngine::new(root));
    let addr = server.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server.serve(async move {
        let _ = rx.await;
    }));

    TestServer {
        _temp_dir: temp_dir,
        addr,
        storage,
        _shutdown: tx,
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn overwrite(path: &str, data: &str) -> OperationRequest {
    OperationRequest::Overwrite {
        path: path.into(),
        data: data.into(),
    }
}

fn copy(path: &str, destination: &str) -> OperationRequest {
    OperationRequest::Copy {
        path: path.into(),
        destination: destination.into(),
    }
}

#[tokio::test]
async fn test_note_backup_scenario() {
    let server = start_test_server(8).await;
    let mut client = FileClient::connect(server.addr).await.unwrap();

    let response = client.send(&overwrite("note.txt", "hello")).await.unwrap();
    assert_eq!(response, Response::new(200, "File updated"));

    let response = client
        .send(&OperationRequest::Append {
            path: "note.txt".into(),
            data: " world".into(),
        })
        .await
        .unwrap();
    assert_eq!(response, Response::new(200, "Data appended to file"));

    let response = client
        .send(&OperationRequest::Read {
            path: "note.txt".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_deref(), Some("hello world"));

    let response = client.send(&copy("note.txt", "backup")).await.unwrap();
    assert_eq!(response, Response::new(200, "File copied"));
    let response = client.send(&copy("note.txt", "backup")).await.unwrap();
    assert_eq!(response, Response::new(200, "File copied"));

    let backup = server.storage.join("backup");
    let names = file_names(&backup);
    assert_eq!(names.len(), 2);
    for name in &names {
        assert_eq!(
            std::fs::read_to_string(backup.join(name)).unwrap(),
            "hello world"
        );
    }
    assert!(names.contains(&"note.txt".to_string()));
    assert!(
        names
            .iter()
            .any(|n| n.starts_with("note_") && n.ends_with(".txt"))
    );
}

#[tokio::test]
async fn test_move_and_delete_report_not_found_afterwards() {
    let server = start_test_server(8).await;
    let mut client = FileClient::connect(server.addr).await.unwrap();

    client.send(&overwrite("inbox/a.txt", "A")).await.unwrap();
    let response = client
        .send(&OperationRequest::Move {
            path: "inbox/a.txt".into(),
            destination: "archive".into(),
        })
        .await
        .unwrap();
    assert_eq!(response, Response::new(200, "File moved"));

    let response = client
        .send(&OperationRequest::Read {
            path: "inbox/a.txt".into(),
        })
        .await
        .unwrap();
    assert_eq!(response, Response::new(404, "File not found"));

    let response = client
        .send(&OperationRequest::Delete {
            path: "archive/a.txt".into(),
        })
        .await
        .unwrap();
    assert_eq!(response, Response::new(200, "File deleted"));

    let response = client
        .send(&OperationRequest::Move {
            path: "archive/a.txt".into(),
            destination: "elsewhere".into(),
        })
        .await
        .unwrap();
    assert_eq!(response, Response::new(404, "Source file not found"));
}

#[tokio::test]
async fn test_traversal_is_rejected_over_the_wire() {
    let server = start_test_server(8).await;
    let mut client = FileClient::connect(server.addr).await.unwrap();

    let response = client
        .send(&overwrite("../../escaped.txt", "x"))
        .await
        .unwrap();

    assert_eq!(response, Response::new(400, "Invalid path"));
    let parent = server.storage.parent().unwrap();
    assert!(!parent.join("escaped.txt").exists());
}

#[tokio::test]
async fn test_malformed_request_keeps_connection_open() {
    let server = start_test_server(8).await;
    let mut client = FileClient::connect(server.addr).await.unwrap();

    let response = client.send_raw("RETR note.txt").await.unwrap();
    assert_eq!(response.status, 400);

    let response = client
        .send_raw(r#"{"op":"read","path":""}"#)
        .await
        .unwrap();
    assert_eq!(response.status, 400);

    let response = client.send(&overwrite("ok.txt", "fine")).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_oversized_request_gets_413_and_close() {
    let server = start_test_server(8).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    stream.write_all(&vec![b'a'; 4097]).await.unwrap();

    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.unwrap();
    let response: Response = serde_json::from_str(reply.trim_end()).unwrap();
    assert_eq!(response.status, 413);
}

#[tokio::test]
async fn test_client_limit_is_enforced() {
    let server = start_test_server(1).await;

    let mut first = FileClient::connect(server.addr).await.unwrap();
    first.send(&overwrite("a.txt", "x")).await.unwrap();

    let mut second = FileClient::connect(server.addr).await.unwrap();
    let response = second.read_response().await.unwrap();
    assert_eq!(response.status, 503);

    drop(first);

    // The slot frees once the server notices the disconnect
    let mut accepted = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut third = FileClient::connect(server.addr).await.unwrap();
        if let Ok(response) = third.send(&overwrite("b.txt", "y")).await {
            if response.status == 200 {
                accepted = true;
                break;
            }
        }
    }
    assert!(accepted);
}

#[tokio::test]
async fn test_concurrent_copies_never_clobber() {
    let server = start_test_server(32).await;
    let mut setup = FileClient::connect(server.addr).await.unwrap();
    setup.send(&overwrite("shared.txt", "payload")).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let addr = server.addr;
            tokio::spawn(async move {
                let mut client = FileClient::connect(addr).await.unwrap();
                client.send(&copy("shared.txt", "fanout")).await.unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().status, 200);
    }

    let fanout = server.storage.join("fanout");
    let names = file_names(&fanout);
    assert_eq!(names.len(), 8);
    for name in names {
        assert_eq!(
            std::fs::read_to_string(fanout.join(name)).unwrap(),
            "payload"
        );
    }
}

#[tokio::test]
async fn test_prompt_session() {
    let server = start_test_server(8).await;
    let script = format!(
        "127.0.0.1\n{}\nput\nnote.txt\nhello\nPOST\n  note.txt  \n world\nGET\nnote.txt\nbogus\nDELETE\nmissing.txt\nCOPY\nnote.txt\nbackup\nEXIT\n",
        server.addr.port()
    );

    let mut output = Vec::new();
    prompt::run(BufReader::new(script.as_bytes()), &mut output)
        .await
        .unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("Enter the host: "));
    assert!(printed.contains("File updated"));
    assert!(printed.contains("Data appended to file"));
    assert!(printed.contains("File content: hello world"));
    assert!(printed.contains("Invalid command."));
    assert!(printed.contains("Error: File not found"));
    assert!(printed.contains("File copied"));
    assert!(printed.trim_end().ends_with("Terminated"));
    assert!(server.storage.join("backup/note.txt").exists());
}

#[tokio::test]
async fn test_prompt_stops_at_end_of_input() {
    let server = start_test_server(8).await;
    let mut client = FileClient::connect(server.addr).await.unwrap();

    let mut output = Vec::new();
    prompt::run_commands(BufReader::new(&b"GET\n"[..]), &mut output, &mut client)
        .await
        .unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("Enter filepath: "));
    assert!(printed.trim_end().ends_with("Terminated"));
}

#[tokio::test]
async fn test_connection_refused_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = FileClient::connect(addr).await;
    assert!(matches!(result, Err(ClientError::Io(_))));
}
