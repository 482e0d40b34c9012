//! Event stream task with reconnection.

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use shared_types::{EventPublisher, StreamEvent};

use crate::client::open_event_stream;
use crate::config::BeaconClientConfig;
use crate::error::BeaconClientError;
use crate::sse::{decode_frame, SseDecoder, SseItem, MAX_FRAME_BYTES};

/// How a single connection ended.
enum StreamEnd {
    /// The subscriber went away; stop for good.
    Closed,
    /// The server finished the body.
    Finished,
    /// Reading the body failed.
    Failed(BeaconClientError),
}

/// Owns the event-stream connection for one subscription.
pub(crate) struct EventStreamTask {
    http: Client,
    url: String,
    publisher: EventPublisher,
    config: BeaconClientConfig,
}

impl EventStreamTask {
    pub(crate) fn new(
        http: Client,
        url: String,
        publisher: EventPublisher,
        config: BeaconClientConfig,
    ) -> Self {
        Self {
            http,
            url,
            publisher,
            config,
        }
    }

    /// Pump `initial`, then keep reconnecting until the subscription closes.
    pub(crate) async fn run(mut self, initial: Response) {
        let mut connection = Some(initial);
        let mut failures = 0u32;

        loop {
            if let Some(response) = connection.take() {
                match self.pump(response).await {
                    StreamEnd::Closed => break,
                    StreamEnd::Finished => info!("Event stream ended by server"),
                    StreamEnd::Failed(e) => warn!(error = %e, "Error reading event stream"),
                }
            }

            let delay = self.config.reconnect_delay(failures);
            debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnecting event stream");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.publisher.closed() => break,
            }

            match open_event_stream(&self.http, &self.url).await {
                Ok(response) => {
                    info!("Event stream reconnected");
                    failures = 0;
                    connection = Some(response);
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    warn!(error = %e, failures, "Failed to reconnect event stream");
                }
            }
        }

        info!("Event stream closed");
    }

    async fn pump(&mut self, response: Response) -> StreamEnd {
        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();

        loop {
            tokio::select! {
                _ = self.publisher.closed() => return StreamEnd::Closed,
                chunk = body.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for item in decoder.feed(&bytes) {
                            let event = match item {
                                SseItem::Frame(frame) => decode_frame(&frame),
                                SseItem::Oversized { bytes } => StreamEvent::Malformed(format!(
                                    "event frame exceeded {} bytes ({} buffered)",
                                    MAX_FRAME_BYTES, bytes
                                )),
                            };
                            if !self.publisher.publish(event).await {
                                return StreamEnd::Closed;
                            }
                        }
                    }
                    Some(Err(e)) => return StreamEnd::Failed(e.into()),
                    None => return StreamEnd::Finished,
                },
            }
        }
    }
}
