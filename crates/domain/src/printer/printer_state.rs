use serde::{Deserialize, Serialize};

/// Printer activity as observed on the link
///
/// Event-only: values are pushed once to current subscribers and never
/// stored as a "current state".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrinterState {
    #[default]
    None,
    /// Payload written or device reports busy
    Printing,
    /// Device reports not busy after a status query
    Finished,
    /// Socket closed by the remote end
    Stopped,
    /// Socket failed
    Error,
}

impl PrinterState {
    /// Verdict a pending print job resolves to when this state is observed.
    ///
    /// `None` means keep waiting.
    pub fn completion_verdict(&self) -> Option<bool> {
        match self {
            Self::Printing => None,
            Self::Finished => Some(true),
            Self::None | Self::Error | Self::Stopped => Some(false),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Printing => "printing",
            Self::Finished => "finished",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for PrinterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printing_is_not_terminal() {
        assert_eq!(PrinterState::Printing.completion_verdict(), None);
    }

    #[test]
    fn test_finished_resolves_true() {
        assert_eq!(PrinterState::Finished.completion_verdict(), Some(true));
    }

    #[test]
    fn test_failures_resolve_false() {
        for state in [PrinterState::None, PrinterState::Error, PrinterState::Stopped] {
            assert_eq!(state.completion_verdict(), Some(false), "{state}");
        }
    }

    #[test]
    fn test_round_trips_through_json() {
        let json = serde_json::to_string(&PrinterState::Finished).unwrap();
        assert_eq!(json, "\"finished\"");
        let back: PrinterState = serde_json::from_str("\"stopped\"").unwrap();
        assert_eq!(back, PrinterState::Stopped);
    }
}
