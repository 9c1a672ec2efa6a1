//! Minimal HTTP/1.1 server standing in for a picky streaming endpoint.
//!
//! Answers 403 when the request carries a forbidden header, otherwise 200
//! with `audio/mpeg` and (for GET) a body that never ends. Can also stall
//! without answering (or after the headers) to force client timeouts.
//! Counts every request.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct StreamServerOptions {
    /// Requests carrying this header (case-insensitive) get 403.
    pub forbidden_header: Option<&'static str>,
    /// Sent as `Access-Control-Allow-Origin` on every response when set.
    pub cors_origin: Option<&'static str>,
    /// Read the request, then never answer.
    pub stall: bool,
    /// Send status and headers, then never send the body.
    pub stall_body: bool,
    /// Write this many body bytes, pause, then continue the endless body.
    pub split_body: Option<usize>,
}

pub struct StreamServer {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl StreamServer {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts the server on a background thread. Runs until the process exits.
pub fn start(opts: StreamServerOptions) -> StreamServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let counter = Arc::clone(&counter);
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &opts, &counter));
        }
    });
    StreamServer {
        url: format!("http://127.0.0.1:{}/groovesalad-128-mp3", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, opts: &StreamServerOptions, counter: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    counter.fetch_add(1, Ordering::SeqCst);
    if opts.stall {
        thread::sleep(Duration::from_secs(10));
        return;
    }
    let (method, names) = parse_request(request);
    let cors = opts
        .cors_origin
        .map(|o| format!("Access-Control-Allow-Origin: {}\r\n", o))
        .unwrap_or_default();

    let forbidden = opts
        .forbidden_header
        .is_some_and(|f| names.iter().any(|n| n.eq_ignore_ascii_case(f)));
    if forbidden {
        let body = b"Forbidden";
        let head = format!(
            "HTTP/1.1 403 Forbidden\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            body.len(),
            cors
        );
        let _ = stream.write_all(head.as_bytes());
        if !method.eq_ignore_ascii_case("HEAD") {
            let _ = stream.write_all(body);
        }
        return;
    }

    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\n{}Cache-Control: no-cache\r\nConnection: close\r\n\r\n",
        cors
    );
    if stream.write_all(head.as_bytes()).is_err() || method.eq_ignore_ascii_case("HEAD") {
        return;
    }
    if opts.stall_body {
        let _ = stream.flush();
        thread::sleep(Duration::from_secs(10));
        return;
    }
    let chunk = [0x55u8; 4096];
    if let Some(n) = opts.split_body {
        let _ = stream.set_nodelay(true);
        if stream.write_all(&chunk[..n.min(chunk.len())]).is_err() {
            return;
        }
        let _ = stream.flush();
        thread::sleep(Duration::from_millis(200));
    }
    // Endless body until the client hangs up.
    while stream.write_all(&chunk).is_ok() {}
}

/// Returns (method, header names).
fn parse_request(request: &str) -> (&str, Vec<&str>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("");
    let names = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':').map(|(n, _)| n.trim()))
        .collect();
    (method, names)
}
