//! WebSocket link to the DataPuller mod with fixed-delay reconnect.

use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use url::Url;

use super::channel::FeedPublisher;
use crate::error::FeedError;

pub const LIVE_DATA_PATH: &str = "/BSDataPuller/LiveData";
pub const MAP_DATA_PATH: &str = "/BSDataPuller/MapData";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn endpoint(host: &str, port: u16, path: &str) -> Result<Url, FeedError> {
    let base = Url::parse(&format!("ws://{}:{}", host, port))?;
    Ok(base.join(path)?)
}

/// Spawns a task that keeps `url` connected and publishes every decoded frame.
/// Aborting the returned handle unsubscribes from the feed.
pub fn spawn_feed_connection<T>(
    url: Url,
    publisher: FeedPublisher<T>,
    reconnect_delay: Duration,
) -> JoinHandle<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    tokio::spawn(connection_loop(url, publisher, reconnect_delay))
}

async fn connection_loop<T>(url: Url, publisher: FeedPublisher<T>, reconnect_delay: Duration)
where
    T: DeserializeOwned,
{
    loop {
        info!(url = %url, "Connecting to DataPuller");

        match tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(url.as_str()))
            .await
        {
            Ok(Ok((ws_stream, _))) => {
                info!(url = %url, "DataPuller connected");
                let (_write, mut read) = ws_stream.split();

                while let Some(msg_result) = read.next().await {
                    match msg_result {
                        Ok(WsMessage::Text(text)) => {
                            if let Some(snapshot) = decode_frame::<T>(&text) {
                                publisher.publish(snapshot);
                            }
                        }
                        Ok(WsMessage::Close(_)) => {
                            info!(url = %url, "DataPuller closed connection");
                            break;
                        }
                        Err(e) => {
                            warn!(url = %url, error = %e, "DataPuller WebSocket error");
                            break;
                        }
                        _ => {}
                    }
                }
            }
            Ok(Err(e)) => {
                debug!(url = %url, error = %e, "DataPuller not reachable");
            }
            Err(_elapsed) => {
                warn!(url = %url, "DataPuller connection timed out");
            }
        }

        tokio::time::sleep(reconnect_delay).await;
    }
}

fn decode_frame<T: DeserializeOwned>(text: &str) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!(error = %e, "Ignoring unrecognized DataPuller frame");
            None
        }
    }
}
