use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlaybackConfig {
    /// Upper bound on how long a reattachment waits for the engine to become
    /// ready before reporting a recoverable resume failure.
    #[serde(default = "default_resume_timeout_ms")]
    pub resume_timeout_ms: u64,
    /// Delay between readiness probes while waiting to resume.
    #[serde(default = "default_resume_poll_ms")]
    pub resume_poll_ms: u64,
    /// How long the built-in HTTP engine stays in a buffering state after a
    /// successful load before `play` is accepted.
    #[serde(default = "default_ready_delay_ms")]
    pub ready_delay_ms: u64,
    /// Interval at which engine playback state is folded into the session
    /// snapshot.
    #[serde(default = "default_observe_interval_ms")]
    pub observe_interval_ms: u64,
}

impl PlaybackConfig {
    pub fn resume_timeout(&self) -> Duration {
        Duration::from_millis(self.resume_timeout_ms)
    }

    pub fn resume_poll(&self) -> Duration {
        Duration::from_millis(self.resume_poll_ms)
    }

    pub fn ready_delay(&self) -> Duration {
        Duration::from_millis(self.ready_delay_ms)
    }

    pub fn observe_interval(&self) -> Duration {
        Duration::from_millis(self.observe_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            resume_timeout_ms: default_resume_timeout_ms(),
            resume_poll_ms: default_resume_poll_ms(),
            ready_delay_ms: default_ready_delay_ms(),
            observe_interval_ms: default_observe_interval_ms(),
        }
    }
}

fn default_resume_timeout_ms() -> u64 {
    5000
}

fn default_resume_poll_ms() -> u64 {
    200
}

fn default_ready_delay_ms() -> u64 {
    250
}

fn default_observe_interval_ms() -> u64 {
    1000
}
