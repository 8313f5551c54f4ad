use serde::{Deserialize, Serialize};

/// Board-wide settings. The server copy is authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub organizer_pin: String,
}

impl Settings {
    pub fn requires_pin(&self) -> bool {
        !self.organizer_pin.is_empty()
    }

    pub fn check_pin(&self, pin: &str) -> bool {
        !self.requires_pin() || self.organizer_pin == pin
    }
}
