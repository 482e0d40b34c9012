//! Beacon node HTTP client.

use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, Instrument, Span};

use shared_types::{
    BeaconBlockResponse, BlockId, EventSubscription, SyncStatus, SyncStatusResponse, HEAD_TOPIC,
};

use crate::config::BeaconClientConfig;
use crate::error::BeaconClientError;
use crate::stream::EventStreamTask;

/// Node sync status endpoint.
pub const SYNC_STATUS_PATH: &str = "/eth/v1/node/syncing";

/// Block endpoint prefix; the block identifier is appended.
pub const BEACON_BLOCK_PATH: &str = "/eth/v2/beacon/blocks";

/// Server-sent event endpoint.
pub const EVENT_STREAM_PATH: &str = "/eth/v1/events";

const JSON_CONTENT_TYPE: &str = "application/json";
const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Check that every requested topic is supported. Runs before any request.
pub fn validate_topics(topics: &[&str]) -> Result<(), BeaconClientError> {
    if topics.is_empty() {
        return Err(BeaconClientError::UnsupportedTopic(String::new()));
    }
    match topics.iter().find(|topic| **topic != HEAD_TOPIC) {
        Some(topic) => Err(BeaconClientError::UnsupportedTopic(topic.to_string())),
        None => Ok(()),
    }
}

/// Parse a beacon node address. Only absolute http(s) URLs with a host are accepted.
pub fn parse_base_url(address: &str) -> Result<Url, BeaconClientError> {
    let parsed = Url::parse(address)
        .map_err(|e| BeaconClientError::InvalidUrl(format!("{}: {}", address, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BeaconClientError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            address,
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(BeaconClientError::InvalidUrl(format!("{}: missing host", address)));
    }
    Ok(parsed)
}

/// HTTP client for the beacon node REST API.
#[derive(Clone)]
pub struct BeaconHttpClient {
    config: BeaconClientConfig,
    base_url: String,
    /// Client for bounded REST requests.
    http: Client,
    /// Client for the event stream; no overall request timeout.
    stream_http: Client,
    span: Span,
}

impl BeaconHttpClient {
    /// Create a new client. Fails if the base URL is not an http(s) URL.
    pub fn new(config: BeaconClientConfig) -> Result<Self, BeaconClientError> {
        parse_base_url(&config.base_url)?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        let stream_http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let span = info_span!("beacon_client", node = %base_url);

        Ok(Self {
            config,
            base_url,
            http,
            stream_http,
            span,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Query the node's sync status.
    pub async fn node_syncing(&self) -> Result<SyncStatus, BeaconClientError> {
        let (status, body) = self.get(SYNC_STATUS_PATH).await?;
        if status != StatusCode::OK {
            return Err(status_error(SYNC_STATUS_PATH, status, &body));
        }
        let response: SyncStatusResponse = decode(SYNC_STATUS_PATH, &body)?;
        Ok(response.data)
    }

    /// Fetch a block. A 404 (e.g. a skipped slot) is `Ok(None)`.
    pub async fn beacon_block(
        &self,
        block_id: &BlockId,
    ) -> Result<Option<BeaconBlockResponse>, BeaconClientError> {
        let path = format!("{}/{}", BEACON_BLOCK_PATH, block_id);
        let (status, body) = self.get(&path).await?;

        if status == StatusCode::NOT_FOUND {
            debug!(parent: &self.span, block_id = %block_id, "Block not found");
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(status_error(&path, status, &body));
        }
        decode(&path, &body).map(Some)
    }

    /// Open the event stream for `topics` and hand it to a background task.
    ///
    /// Only `head` is supported; anything else fails before any request.
    /// Returns once the first connection has been accepted by the node.
    pub async fn subscribe_events(
        &self,
        topics: &[&str],
    ) -> Result<EventSubscription, BeaconClientError> {
        validate_topics(topics)?;

        let url = format!(
            "{}?topics={}",
            self.endpoint(EVENT_STREAM_PATH),
            topics.join(",")
        );
        let initial = open_event_stream(&self.stream_http, &url).await?;
        info!(parent: &self.span, topics = %topics.join(","), "Event stream opened");

        let (publisher, subscription) = EventSubscription::channel(self.config.event_buffer);
        let task = EventStreamTask::new(
            self.stream_http.clone(),
            url,
            publisher,
            self.config.clone(),
        );
        let span = info_span!(parent: &self.span, "event_stream");
        tokio::spawn(task.run(initial).instrument(span));

        Ok(subscription)
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Vec<u8>), BeaconClientError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

/// Open one event-stream connection and check the status.
pub(crate) async fn open_event_stream(
    http: &Client,
    url: &str,
) -> Result<Response, BeaconClientError> {
    let response = http
        .get(url)
        .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let path = url.split_once('?').map_or(url, |(path, _)| path).to_string();
        let body = response.text().await.unwrap_or_default();
        return Err(BeaconClientError::Status {
            path,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn status_error(path: &str, status: StatusCode, body: &[u8]) -> BeaconClientError {
    BeaconClientError::Status {
        path: path.to_string(),
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, BeaconClientError> {
    serde_json::from_slice(body).map_err(|e| BeaconClientError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
