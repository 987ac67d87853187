use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Window used by the pending-RSVP listing when `days` is not given.
    #[serde(default = "default_reminder_days")]
    pub default_reminder_days: i64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            default_reminder_days: default_reminder_days(),
        }
    }
}

fn default_reminder_days() -> i64 {
    7
}
