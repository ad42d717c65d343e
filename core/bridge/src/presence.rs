//! Outbound presence service interface and the activity payload it receives.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::classifier::GameMode;
use crate::error::PresenceError;

pub const DEFAULT_APP_ID: &str = "1341072184113762305";
pub const DEFAULT_LARGE_IMAGE: &str = "large";
pub const DEFAULT_LARGE_TEXT: &str = "GeoGuessr by @xvcf";

const STATE_PLAYING: &str = "Playing";
const STATE_MENUS: &str = "In the menus";

/// A rich presence display (Discord, or a fake in tests).
pub trait PresenceService: Send {
    /// Returns the name of this presence service (for logging)
    fn name(&self) -> &'static str;

    fn login(&mut self, app_id: &str) -> Result<(), PresenceError>;

    fn logout(&mut self);

    fn set_activity(&mut self, activity: &Activity) -> Result<(), PresenceError>;

    fn clear_activity(&mut self) -> Result<(), PresenceError>;
}

/// Fixed large-image identity shown next to every activity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_large_image")]
    pub large_image: String,
    #[serde(default = "default_large_text")]
    pub large_text: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            large_image: default_large_image(),
            large_text: default_large_text(),
        }
    }
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn default_large_image() -> String {
    DEFAULT_LARGE_IMAGE.to_string()
}

fn default_large_text() -> String {
    DEFAULT_LARGE_TEXT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub state: String,
    pub details: String,
    pub large_image: String,
    pub large_text: String,
    pub small_image: String,
    pub small_text: String,
    pub start: DateTime<Utc>,
}

impl Activity {
    pub fn for_mode(mode: &GameMode, start: DateTime<Utc>, config: &PresenceConfig) -> Self {
        let state = if mode.is_playing() {
            STATE_PLAYING
        } else {
            STATE_MENUS
        };
        Self {
            state: state.to_string(),
            details: mode.label().to_string(),
            large_image: config.large_image.clone(),
            large_text: config.large_text.clone(),
            small_image: mode.small_icon_key().to_string(),
            small_text: mode.small_icon_text().to_string(),
            start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_769_817_600, 0).unwrap()
    }

    #[test]
    fn playing_mode_payload() {
        let mode = GameMode::new("Duels Game", "ranked", "Ranked Duels Game", true);
        let activity = Activity::for_mode(&mode, start(), &PresenceConfig::default());
        assert_eq!(activity.state, "Playing");
        assert_eq!(activity.details, "Duels Game");
        assert_eq!(activity.large_image, "large");
        assert_eq!(activity.large_text, "GeoGuessr by @xvcf");
        assert_eq!(activity.small_image, "ranked");
        assert_eq!(activity.small_text, "Ranked Duels Game");
        assert_eq!(activity.start, start());
    }

    #[test]
    fn menu_mode_payload() {
        let activity =
            Activity::for_mode(&GameMode::not_in_game(), start(), &PresenceConfig::default());
        assert_eq!(activity.state, "In the menus");
        assert_eq!(activity.details, "Not in a game");
    }
}
