//! Inactivity watchdog rules.

use std::time::Duration;

use crate::domain::session::DisconnectReason;

/// Watchdog timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// How often the session is checked.
    pub poll_interval: Duration,
    /// How long the session may stay silent.
    pub inactivity: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            inactivity: Duration::from_secs(60),
        }
    }
}

/// What one watchdog poll observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// A track is audibly playing.
    pub playing: bool,
    /// Members in the voice channel other than the bot.
    pub occupants: usize,
}

/// Decision after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep the session.
    Keep,
    /// Tear the session down.
    Disconnect(DisconnectReason),
}

/// Silence accumulated since playback was last active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleCounter {
    idle: Duration,
}

impl IdleCounter {
    /// Accounts for one poll interval.
    pub fn tick(&mut self, observation: Observation, config: &WatchdogConfig) -> Verdict {
        if observation.occupants == 0 {
            return Verdict::Disconnect(DisconnectReason::Alone);
        }
        if observation.playing {
            self.idle = Duration::ZERO;
            return Verdict::Keep;
        }
        self.idle += config.poll_interval;
        if self.idle >= config.inactivity {
            Verdict::Disconnect(DisconnectReason::Inactive)
        } else {
            Verdict::Keep
        }
    }

    /// Silence accumulated so far.
    #[must_use]
    pub fn idle(&self) -> Duration {
        self.idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WatchdogConfig {
        WatchdogConfig {
            poll_interval: Duration::from_secs(10),
            inactivity: Duration::from_secs(30),
        }
    }

    const SILENT: Observation = Observation {
        playing: false,
        occupants: 2,
    };

    #[test]
    fn test_disconnects_after_inactivity_window() {
        let mut counter = IdleCounter::default();

        assert_eq!(counter.tick(SILENT, &config()), Verdict::Keep);
        assert_eq!(counter.tick(SILENT, &config()), Verdict::Keep);
        assert_eq!(
            counter.tick(SILENT, &config()),
            Verdict::Disconnect(DisconnectReason::Inactive)
        );
    }

    #[test]
    fn test_playback_resets_the_counter() {
        let mut counter = IdleCounter::default();
        counter.tick(SILENT, &config());
        counter.tick(SILENT, &config());

        let verdict = counter.tick(
            Observation {
                playing: true,
                occupants: 1,
            },
            &config(),
        );

        assert_eq!(verdict, Verdict::Keep);
        assert_eq!(counter.idle(), Duration::ZERO);
    }

    #[test]
    fn test_empty_channel_disconnects_immediately() {
        let mut counter = IdleCounter::default();

        let verdict = counter.tick(
            Observation {
                playing: true,
                occupants: 0,
            },
            &config(),
        );

        assert_eq!(verdict, Verdict::Disconnect(DisconnectReason::Alone));
    }
}
