//! Discord Rich Presence integration using discord-sdk
//!
//! The SDK is async; the bridge worker is not. `DiscordPresence` owns a small
//! tokio runtime and blocks on each call, so the orchestrator keeps a plain
//! synchronous `PresenceService`.

use std::time::Duration;

use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    wheel::{UserSpoke, UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::error::PresenceError;
use crate::presence::{Activity, PresenceService};

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a single activity command
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

struct Connection {
    discord: Discord,
    user: UserSpoke,
    _wheel: Wheel,
}

impl Connection {
    fn is_alive(&self) -> bool {
        matches!(&*self.user.0.borrow(), UserState::Connected(_))
    }
}

/// Discord presence service implementing the generic PresenceService trait
pub struct DiscordPresence {
    runtime: Runtime,
    connection: Option<Connection>,
}

impl DiscordPresence {
    pub fn new() -> Result<Self, PresenceError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("discord-io")
            .enable_all()
            .build()
            .map_err(PresenceError::Runtime)?;
        Ok(Self {
            runtime,
            connection: None,
        })
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.runtime.block_on(connection.discord.disconnect());
            debug!("Discord client disconnected");
        }
    }

    /// Drops a client whose user state went to `Disconnected` since login.
    fn check_alive(&mut self) -> Result<(), PresenceError> {
        let alive = match &self.connection {
            None => return Err(PresenceError::NotConnected),
            Some(connection) => connection.is_alive(),
        };
        if !alive {
            warn!("Discord connection lost");
            self.disconnect();
            return Err(PresenceError::ConnectionClosed);
        }
        Ok(())
    }

    fn run_command(
        &mut self,
        command: &'static str,
        activity: Option<ActivityBuilder>,
    ) -> Result<(), PresenceError> {
        self.check_alive()?;
        let Some(connection) = &self.connection else {
            return Err(PresenceError::NotConnected);
        };

        let result = self.runtime.block_on(async {
            let request = async {
                match activity {
                    Some(activity) => connection
                        .discord
                        .update_activity(activity)
                        .await
                        .map(|_| ()),
                    None => connection.discord.clear_activity().await.map(|_| ()),
                }
            };
            tokio::time::timeout(COMMAND_TIMEOUT, request).await
        });

        let outcome = match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(PresenceError::sdk(command, source)),
            Err(_) => Err(PresenceError::Timeout(command)),
        };
        if outcome.is_err() {
            self.disconnect();
        }
        outcome
    }
}

impl Drop for DiscordPresence {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl PresenceService for DiscordPresence {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn login(&mut self, app_id: &str) -> Result<(), PresenceError> {
        self.disconnect();
        let app_id: i64 = app_id
            .trim()
            .parse()
            .map_err(|_| PresenceError::InvalidAppId(app_id.to_string()))?;

        let connection = self.runtime.block_on(connect(app_id))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn logout(&mut self) {
        self.disconnect();
    }

    fn set_activity(&mut self, activity: &Activity) -> Result<(), PresenceError> {
        self.run_command("update activity", Some(activity_builder(activity)))
    }

    fn clear_activity(&mut self) -> Result<(), PresenceError> {
        self.run_command("clear activity", None)
    }
}

async fn connect(app_id: i64) -> Result<Connection, PresenceError> {
    let (wheel, handler) = Wheel::new(Box::new(|err| {
        warn!("Discord error: {:?}", err);
    }));
    let mut user = wheel.user();

    let discord = Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler))
        .map_err(|source| PresenceError::sdk("connect", source))?;

    debug!(app_id, "Discord connecting...");
    let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
        if user.0.changed().await.is_err() {
            return Err(PresenceError::ConnectionClosed);
        }
        match &*user.0.borrow() {
            UserState::Connected(account) => Ok(account.username.clone()),
            UserState::Disconnected(err) => {
                Err(PresenceError::HandshakeFailed(format!("{:?}", err)))
            }
        }
    })
    .await;

    match handshake {
        Ok(Ok(username)) => {
            info!(user = %username, "Discord Rich Presence connected");
            Ok(Connection {
                discord,
                user,
                _wheel: wheel,
            })
        }
        Ok(Err(err)) => {
            discord.disconnect().await;
            Err(err)
        }
        Err(_) => {
            discord.disconnect().await;
            Err(PresenceError::HandshakeTimeout)
        }
    }
}

fn activity_builder(activity: &Activity) -> ActivityBuilder {
    let mut assets = Assets::default();
    if !activity.large_image.is_empty() {
        assets = assets.large(activity.large_image.clone(), non_empty(&activity.large_text));
    }
    if !activity.small_image.is_empty() {
        assets = assets.small(activity.small_image.clone(), non_empty(&activity.small_text));
    }

    ActivityBuilder::new()
        .state(activity.state.clone())
        .details(activity.details.clone())
        .assets(assets)
        .start_timestamp(activity.start.timestamp())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn activity() -> Activity {
        Activity {
            state: "Playing".to_string(),
            details: "Duels".to_string(),
            large_image: "large".to_string(),
            large_text: "GeoGuessr by @xvcf".to_string(),
            small_image: "ranked".to_string(),
            small_text: "Ranked Duels".to_string(),
            start: DateTime::<Utc>::from_timestamp(1_769_817_600, 0).unwrap(),
        }
    }

    #[test]
    fn invalid_app_id_fails_without_connecting() {
        let mut discord = DiscordPresence::new().unwrap();
        let err = discord.login("not-an-id").unwrap_err();

        assert!(matches!(err, PresenceError::InvalidAppId(ref id) if id == "not-an-id"));
        assert!(!discord.is_connected());
    }

    #[test]
    fn commands_before_login_are_not_connected() {
        let mut discord = DiscordPresence::new().unwrap();

        assert!(matches!(
            discord.set_activity(&activity()),
            Err(PresenceError::NotConnected)
        ));
        assert!(matches!(
            discord.clear_activity(),
            Err(PresenceError::NotConnected)
        ));
    }

    #[test]
    fn logout_without_connection_is_a_noop() {
        let mut discord = DiscordPresence::new().unwrap();
        discord.logout();
        discord.logout();
        assert!(!discord.is_connected());
    }

    #[test]
    fn empty_hover_text_is_left_out() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("Ranked Duels"), Some("Ranked Duels".to_string()));
    }
}
