//! Discord Rich Presence integration using discord-sdk

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::PresenceError;
use crate::presence::{PresenceClient, PresenceMessage};

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

enum DiscordCommand {
    Update(PresenceMessage),
    Shutdown,
}

/// Discord presence client. The connection lives in a background task;
/// updates are queued to it so sending never waits on Discord.
pub struct DiscordPresence {
    commands: mpsc::UnboundedSender<DiscordCommand>,
    ready: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscordPresence {
    /// Connect to the local Discord client and wait for the handshake.
    pub async fn connect(app_id: i64) -> Result<Self, PresenceError> {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));

        let mut user_spoke = wheel.user();

        let discord = Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler))
            .map_err(|e| PresenceError::Discord(format!("{:?}", e)))?;

        tracing::info!("Discord connecting...");

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                Err(PresenceError::Discord("connection closed".to_string()))
            } else {
                match &*user_spoke.0.borrow() {
                    UserState::Connected(user) => Ok(user.username.clone()),
                    UserState::Disconnected(err) => {
                        Err(PresenceError::Discord(format!("disconnected: {:?}", err)))
                    }
                }
            }
        })
        .await
        .unwrap_or(Err(PresenceError::HandshakeTimeout(
            HANDSHAKE_TIMEOUT.as_secs(),
        )));

        let username = match handshake {
            Ok(username) => username,
            Err(e) => {
                discord.disconnect().await;
                return Err(e);
            }
        };

        tracing::info!("Discord Rich Presence connected as {}", username);

        let ready = Arc::new(AtomicBool::new(true));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_discord_task(
            discord,
            wheel,
            user_spoke.0,
            command_rx,
            Arc::clone(&ready),
        ));

        Ok(Self {
            commands,
            ready,
            task: Mutex::new(Some(task)),
        })
    }
}

/// Background task that owns the Discord connection and applies queued updates
async fn run_discord_task(
    discord: Discord,
    _wheel: Wheel,
    mut user_state: watch::Receiver<UserState>,
    mut command_rx: mpsc::UnboundedReceiver<DiscordCommand>,
    ready: Arc<AtomicBool>,
) {
    loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                Some(DiscordCommand::Update(message)) => {
                    if let Err(e) = discord.update_activity(activity_for(&message)).await {
                        tracing::warn!("Failed to update Discord activity: {:?}", e);
                    }
                }
                Some(DiscordCommand::Shutdown) | None => break,
            },
            changed = user_state.changed() => {
                if changed.is_err() {
                    tracing::warn!("Discord user state channel closed");
                    break;
                }
                let connected = matches!(&*user_state.borrow(), UserState::Connected(_));
                ready.store(connected, Ordering::SeqCst);
                if connected {
                    tracing::info!("Discord Rich Presence reconnected");
                } else {
                    tracing::warn!("Discord Rich Presence lost connection");
                }
            }
        }
    }

    ready.store(false, Ordering::SeqCst);
    if let Err(e) = discord.clear_activity().await {
        tracing::debug!("Failed to clear Discord activity: {:?}", e);
    }
    discord.disconnect().await;
    tracing::info!("Discord Rich Presence disconnected");
}

fn activity_for(message: &PresenceMessage) -> ActivityBuilder {
    let mut activity = ActivityBuilder::new()
        .details(message.details.clone())
        .state(message.state.clone())
        .assets(Assets::default().large(message.image_key.clone(), Some(message.image_text.clone())));

    if let Some(start) = message.start_timestamp {
        activity = activity.start_timestamp(start.timestamp());
    }
    if let Some(end) = message.end_timestamp {
        activity = activity.end_timestamp(end.timestamp());
    }

    activity
}

#[async_trait]
impl PresenceClient for DiscordPresence {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn send(&self, message: &PresenceMessage) -> Result<(), PresenceError> {
        self.commands
            .send(DiscordCommand::Update(message.clone()))
            .map_err(|_| PresenceError::Closed)
    }

    async fn shutdown(&self) {
        self.ready.store(false, Ordering::SeqCst);
        let _ = self.commands.send(DiscordCommand::Shutdown);

        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                tracing::warn!("Discord task ended abnormally: {}", e);
            }
        }
    }
}
