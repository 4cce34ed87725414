//! Exercises the Ollama client against a one-shot HTTP stub on localhost.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use vaultdb_core::config::EmbeddingConfig;
use vaultdb_core::traits::Embedder;
use vaultdb_core::Error;
use vaultdb_embed::{probe, OllamaEmbedder, PROBE_TEXT};

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 { break; }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(pos) = text.find("\r\n\r\n") {
            let content_length = text[..pos]
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.trim().eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok()).flatten()
                })
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length { break; }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve exactly one request with the given status line and JSON body.
/// The join handle yields the raw request text.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (url, handle)
}

fn client(base_url: &str, timeout_secs: u64) -> OllamaEmbedder {
    let config = EmbeddingConfig { model: "gemma".into(), base_url: base_url.into(), timeout_secs };
    OllamaEmbedder::new(&config).unwrap()
}

#[test]
fn returns_vector_from_service() {
    let (url, handle) = serve_once("HTTP/1.1 200 OK", r#"{"embedding":[0.25,-0.5,1.0]}"#);
    let v = client(&url, 5).embed_text("hello vault").expect("embed");
    assert_eq!(v, vec![0.25, -0.5, 1.0]);

    let request = handle.join().unwrap();
    assert!(request.starts_with("POST /api/embeddings"));
    assert!(request.contains(r#""model":"gemma""#));
    assert!(request.contains(r#""prompt":"hello vault""#));
}

#[test]
fn unknown_model_is_embedding_error() {
    let (url, handle) = serve_once("HTTP/1.1 404 Not Found", r#"{"error":"model \"gemma\" not found, try pulling it first"}"#);
    let err = client(&url, 5).embed_text("x").unwrap_err();
    handle.join().unwrap();
    match err {
        Error::Embedding { model, reason } => {
            assert_eq!(model, "gemma");
            assert!(reason.contains("404"));
            assert!(reason.contains("not found"));
        }
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[test]
fn malformed_body_is_embedding_error() {
    let (url, handle) = serve_once("HTTP/1.1 200 OK", r#"{"embedding":"nope"}"#);
    let err = client(&url, 5).embed_text("x").unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, Error::Embedding { .. }));
}

#[test]
fn empty_vector_is_embedding_error() {
    let (url, handle) = serve_once("HTTP/1.1 200 OK", r#"{"embedding":[]}"#);
    let err = client(&url, 5).embed_text("x").unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, Error::Embedding { .. }));
}

#[test]
fn refused_connection_is_embedding_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = client(&format!("http://127.0.0.1:{port}"), 5).embed_text("x").unwrap_err();
    match err {
        Error::Embedding { reason, .. } => assert!(reason.contains("could not connect")),
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[test]
fn slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(3));
        drop(stream);
    });
    let err = client(&url, 1).embed_text("x").unwrap_err();
    match err {
        Error::Embedding { reason, .. } => assert!(reason.contains("timed out")),
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[test]
fn probe_uses_fixed_sentence() {
    let (url, handle) = serve_once("HTTP/1.1 200 OK", r#"{"embedding":[1.0,2.0,3.0,4.0,5.0,6.0]}"#);
    let report = probe(&client(&url, 5)).expect("probe");
    assert_eq!(report.dimensions, 6);
    assert_eq!(report.head, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(report.tail, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
    assert!(handle.join().unwrap().contains(PROBE_TEXT));
}
