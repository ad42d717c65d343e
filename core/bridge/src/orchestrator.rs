//! Turns notifications into presence updates.
//!
//! The orchestrator is the single owner of `SessionState` and of the presence
//! service connection. Callers must feed it one notification at a time.

use chrono::{DateTime, Utc};
use geo_presence_protocol::Action;
use std::thread;
use tracing::{debug, info, warn};

use crate::classifier::{GameMode, ModeClassifier};
use crate::error::{BridgeError, PresenceError};
use crate::presence::{Activity, PresenceConfig, PresenceService};
use crate::retry::RetryPolicy;
use crate::session::SessionState;

pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// What handling a notification did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Closed,
    /// The display already showed this mode; nothing was sent.
    Unchanged,
    Published { attempts: u32 },
}

pub struct Orchestrator<P: PresenceService> {
    service: P,
    classifier: ModeClassifier,
    presence: PresenceConfig,
    retry: RetryPolicy,
    state: SessionState,
    clock: Clock,
}

impl<P: PresenceService> Orchestrator<P> {
    pub fn new(
        service: P,
        classifier: ModeClassifier,
        presence: PresenceConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self::with_clock(service, classifier, presence, retry, Box::new(Utc::now))
    }

    pub fn with_clock(
        service: P,
        classifier: ModeClassifier,
        presence: PresenceConfig,
        retry: RetryPolicy,
        clock: Clock,
    ) -> Self {
        let state = SessionState::new(clock());
        Self {
            service,
            classifier,
            presence,
            retry,
            state,
            clock,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn service(&self) -> &P {
        &self.service
    }

    pub fn handle(&mut self, url: &str, action: Action) -> Result<Handled, BridgeError> {
        match action {
            Action::Close => {
                self.close();
                Ok(Handled::Closed)
            }
            Action::Update => self.update(url),
        }
    }

    fn close(&mut self) {
        debug!("Game closed, clearing presence");
        self.state.stop_playing();
        if let Err(err) = self.service.clear_activity() {
            warn!(
                service = self.service.name(),
                error = %err,
                "Failed to clear presence"
            );
        }
    }

    fn update(&mut self, url: &str) -> Result<Handled, BridgeError> {
        let mode = self.classifier.classify(url);

        if !self.state.is_logged_in() {
            self.login()?;
        }

        let now = (self.clock)();
        if self.state.begin_playing(now) {
            debug!(session_start = %now.to_rfc3339(), "Game started, now playing");
        }

        let session_start = self.state.session_start();
        self.publish(&mode, session_start)
    }

    fn login(&mut self) -> Result<(), BridgeError> {
        debug!(service = self.service.name(), "Sending login request");
        match self.service.login(&self.presence.app_id) {
            Ok(()) => {
                self.state.set_logged_in(true);
                info!(service = self.service.name(), "Logged in to presence service");
                Ok(())
            }
            Err(err) => {
                self.state.set_logged_in(false);
                warn!(service = self.service.name(), error = %err, "Failed to login");
                Err(BridgeError::Login(err))
            }
        }
    }

    fn logout(&mut self) {
        if self.state.is_logged_in() {
            self.service.logout();
            self.state.set_logged_in(false);
            info!(service = self.service.name(), "Logged out of presence service");
        } else {
            debug!(service = self.service.name(), "Already logged out");
        }
    }

    fn publish(
        &mut self,
        mode: &GameMode,
        session_start: DateTime<Utc>,
    ) -> Result<Handled, BridgeError> {
        if self.state.is_published(mode, session_start) {
            info!(mode = mode.label(), "Presence already up to date");
            return Ok(Handled::Unchanged);
        }

        let activity = Activity::for_mode(mode, session_start, &self.presence);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let result = if self.state.is_logged_in() {
                self.service.set_activity(&activity)
            } else {
                Err(PresenceError::NotConnected)
            };

            let err = match result {
                Ok(()) => {
                    self.state.commit(mode.clone(), session_start);
                    info!(mode = mode.label(), attempts, "Presence updated");
                    return Ok(Handled::Published { attempts });
                }
                Err(err) => err,
            };

            warn!(error = %err, attempt = attempts, "Failed to update presence");
            if !self.retry.allows_retry(attempts) {
                // The service may have dropped its connection; the next
                // update must log in before publishing.
                self.logout();
                return Err(BridgeError::Publish {
                    attempts,
                    source: err,
                });
            }

            info!("Attempting to re-login");
            self.logout();
            thread::sleep(self.retry.logout_pause);
            self.login()?;
            thread::sleep(self.retry.settle_pause);
        }
    }
}
