//! In-process beacon node serving fixtures over HTTP.
//!
//! Routes:
//! - `/eth/v1/node/syncing`: the configured sync status
//! - `/eth/v2/beacon/blocks/{slot}`: fixture block, or 404
//! - `/eth/v1/events?topics=head`: event stream fed by [`BeaconNodeStub::publish_head`]

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use shared_types::Slot;

use super::block_response_json;

const ROOT: &str = "0x9a2fefd2fdb57f74993c7780ea5b9030d2897b615b89f808011ca5aebed54eaf";

/// A minimal beacon node for integration tests.
pub struct BeaconNodeStub {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
    frames: broadcast::Sender<String>,
    accept: JoinHandle<()>,
}

struct Shared {
    head_slot: Slot,
    requests: Arc<Mutex<Vec<String>>>,
    frames: broadcast::Sender<String>,
}

impl BeaconNodeStub {
    /// Start serving on an ephemeral local port, synced at `head_slot`.
    pub async fn start(head_slot: Slot) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (frames, _) = broadcast::channel(64);

        let shared = Arc::new(Shared {
            head_slot,
            requests: requests.clone(),
            frames: frames.clone(),
        });
        let accept = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(handle(socket, shared.clone()));
            }
        });

        Self {
            url,
            requests,
            frames,
            accept,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Paths requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Slots requested from the block endpoint, in order.
    pub fn fetched_slots(&self) -> Vec<Slot> {
        self.requests()
            .iter()
            .filter_map(|path| path.strip_prefix("/eth/v2/beacon/blocks/"))
            .filter_map(|slot| slot.parse().ok())
            .collect()
    }

    /// Number of open event-stream listeners.
    pub fn stream_listeners(&self) -> usize {
        self.frames.receiver_count()
    }

    /// Announce a new head on every open event stream.
    pub fn publish_head(&self, slot: Slot) {
        let frame = format!(
            "event: head\ndata: {{\"slot\":\"{slot}\",\"block\":\"{ROOT}\",\"state\":\"{ROOT}\",\"epoch_transition\":false,\"execution_optimistic\":false}}\n\n"
        );
        let _ = self.frames.send(frame);
    }
}

impl Drop for BeaconNodeStub {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

async fn handle(mut socket: TcpStream, shared: Arc<Shared>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    shared.requests.lock().expect("requests lock").push(path.clone());

    if path.starts_with("/eth/v1/events") {
        let mut frames = shared.frames.subscribe();
        let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        while let Ok(frame) = frames.recv().await {
            if socket.write_all(frame.as_bytes()).await.is_err() {
                return;
            }
        }
        return;
    }

    let (status, body) = if path == "/eth/v1/node/syncing" {
        (
            "200 OK",
            format!(
                "{{\"data\":{{\"head_slot\":\"{}\",\"sync_distance\":\"0\",\"is_syncing\":false,\"is_optimistic\":false,\"el_offline\":false}}}}",
                shared.head_slot
            ),
        )
    } else if let Some(slot) = path
        .strip_prefix("/eth/v2/beacon/blocks/")
        .and_then(|slot| slot.parse::<Slot>().ok())
    {
        match block_response_json(slot) {
            Some(json) => ("200 OK", json.to_string()),
            None => (
                "404 Not Found",
                format!("{{\"code\":404,\"message\":\"NOT_FOUND: beacon block at slot {}\"}}", slot),
            ),
        }
    } else {
        ("400 Bad Request", "{\"code\":400}".to_string())
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
