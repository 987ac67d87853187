use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Buffered live events per user before slow streams start losing them.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            max_text_len: default_max_text_len(),
        }
    }
}

fn default_channel_capacity() -> usize {
    64
}

fn default_max_text_len() -> usize {
    2000
}
