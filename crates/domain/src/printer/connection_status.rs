use serde::{Deserialize, Serialize};

/// Connection status of a printer link
///
/// `Connected` holds exactly while one socket is live, together with the
/// router and liveness prober bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No socket, nothing running
    #[default]
    None,
    /// Socket open, router and prober active
    Connected,
}

impl ConnectionStatus {
    /// Check if state allows connection attempt
    pub fn can_connect(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Transition to connected state
    pub fn to_connected(&self) -> Result<Self, &'static str> {
        match self {
            Self::None => Ok(Self::Connected),
            Self::Connected => Err("Already connected"),
        }
    }

    /// Transition to none; valid from any state
    pub fn to_none(&self) -> Self {
        Self::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Connected => "connected",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
