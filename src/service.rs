//! Startup, notification loop and shutdown for the presence coordinator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::discord::DiscordPresence;
use crate::error::FeedError;
use crate::feed::{
    endpoint, snapshot_feed, spawn_feed_connection, PlaybackSnapshot, SnapshotFeed, SongSnapshot,
    LIVE_DATA_PATH, MAP_DATA_PATH,
};
use crate::presence::{
    Clock, Deferred, PresenceClient, PresenceCoordinator, SystemClock, TokioDeferred, MAIN_MENU,
};
use crate::settings::Settings;

pub struct PresenceService {
    coordinator: PresenceCoordinator,
    live_changes: SnapshotFeed<PlaybackSnapshot>,
    map_changes: SnapshotFeed<SongSnapshot>,
    connections: Vec<JoinHandle<()>>,
}

impl PresenceService {
    /// Connects to Discord, subscribes to both DataPuller feeds and shows the menu.
    ///
    /// A Discord failure is logged and the service keeps running with presence disabled.
    pub async fn start(settings: &Settings) -> Result<Self, FeedError> {
        tracing::info!("Beat Saber Rich Presence starting");

        let client: Option<Arc<dyn PresenceClient>> =
            match DiscordPresence::connect(settings.discord_app_id).await {
                Ok(client) => {
                    tracing::info!("Discord RPC initialized successfully");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!("Error initializing Discord RPC: {}", e);
                    None
                }
            };

        let live_url = endpoint(
            &settings.data_puller_host,
            settings.data_puller_port,
            LIVE_DATA_PATH,
        )?;
        let map_url = endpoint(
            &settings.data_puller_host,
            settings.data_puller_port,
            MAP_DATA_PATH,
        )?;

        let (live_publisher, live) = snapshot_feed::<PlaybackSnapshot>();
        let (map_publisher, map) = snapshot_feed::<SongSnapshot>();

        let reconnect_delay = Duration::from_secs(settings.reconnect_delay_secs);
        let connections = vec![
            spawn_feed_connection(live_url, live_publisher, reconnect_delay),
            spawn_feed_connection(map_url, map_publisher, reconnect_delay),
        ];

        let mut service = Self::with_parts(
            client,
            live,
            map,
            Arc::new(SystemClock),
            Arc::new(TokioDeferred::current()),
            Duration::from_secs(settings.song_settle_delay_secs),
        );
        service.connections = connections;
        service.show_main_menu();

        Ok(service)
    }

    /// Builds a service over caller-supplied feeds and collaborators without
    /// publishing anything.
    pub fn with_parts(
        client: Option<Arc<dyn PresenceClient>>,
        live: SnapshotFeed<PlaybackSnapshot>,
        map: SnapshotFeed<SongSnapshot>,
        clock: Arc<dyn Clock>,
        deferred: Arc<dyn Deferred>,
        settle_delay: Duration,
    ) -> Self {
        let live_changes = live.clone();
        let map_changes = map.clone();

        Self {
            coordinator: PresenceCoordinator::new(client, live, map, clock, deferred, settle_delay),
            live_changes,
            map_changes,
            connections: Vec::new(),
        }
    }

    pub fn show_main_menu(&self) {
        self.coordinator.show_menu(MAIN_MENU);
    }

    pub fn coordinator(&self) -> &PresenceCoordinator {
        &self.coordinator
    }

    /// Processes change notifications one at a time until `shutdown` resolves
    /// or a feed closes.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = self.live_changes.changed() => result,
                result = self.map_changes.changed() => result,
            };

            if let Err(e) = result {
                tracing::warn!("Stopped listening for game state: {}", e);
                break;
            }

            self.coordinator.on_notification();
        }
    }

    /// Unsubscribes from the feeds and releases the presence client.
    pub async fn shutdown(mut self) {
        tracing::info!("Beat Saber Rich Presence shutting down");

        for connection in self.connections.drain(..) {
            connection.abort();
        }

        match self.coordinator.take_client() {
            Some(client) => {
                client.shutdown().await;
                tracing::info!("{} presence client released", client.name());
            }
            None => tracing::warn!("Presence client was never initialized"),
        }
    }
}
