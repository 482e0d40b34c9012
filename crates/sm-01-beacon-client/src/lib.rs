//! # SM-01 Beacon Client
//!
//! Client for the standard beacon node REST API.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Adapter crate (no domain logic)
//!
//! ## Purpose
//!
//! Supplies the chain data the slashing monitor needs:
//! - Node sync status (`/eth/v1/node/syncing`)
//! - Blocks by identifier (`/eth/v2/beacon/blocks/{block_id}`)
//! - Live `head` events (`/eth/v1/events?topics=head`, server-sent events)
//!
//! ## Event Stream
//!
//! The first event-stream connection is opened before
//! [`BeaconHttpClient::subscribe_events`] returns, so a caller knows the
//! subscription is live. A background task then owns the connection and
//! reconnects with capped exponential backoff whenever the server closes
//! the stream or a read fails. It stops when the subscription is closed.
//!
//! ## Module Structure
//!
//! ```text
//! sm-01-beacon-client/
//! ├── client.rs    # BeaconHttpClient: REST queries, subscription setup
//! ├── stream.rs    # Event stream task with reconnection
//! ├── sse.rs       # Server-sent-event frame decoder
//! ├── error.rs     # BeaconClientError
//! └── config.rs    # BeaconClientConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod sse;
mod stream;

pub use client::{
    parse_base_url, validate_topics, BeaconHttpClient, BEACON_BLOCK_PATH, EVENT_STREAM_PATH,
    SYNC_STATUS_PATH,
};
pub use config::BeaconClientConfig;
pub use error::BeaconClientError;
pub use sse::{decode_frame, SseDecoder, SseFrame, SseItem, MAX_FRAME_BYTES};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
