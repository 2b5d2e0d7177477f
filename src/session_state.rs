use tracing::info;

/// Runtime state that lives only as long as the process
/// Nothing here is ever written to the settings store, so a restart always starts fresh
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Temporary fade toggled from the overlay's fade button
    pub temp_fade_enabled: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the temporary fade and return the new value
    pub fn toggle_fade(&mut self) -> bool {
        self.temp_fade_enabled = !self.temp_fade_enabled;
        info!(temp_fade_enabled = self.temp_fade_enabled, "Toggled temporary fade");
        self.temp_fade_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_unfaded() {
        assert!(!SessionState::new().temp_fade_enabled);
    }

    #[test]
    fn test_toggle_fade_flips() {
        let mut state = SessionState::new();
        assert!(state.toggle_fade());
        assert!(!state.toggle_fade());
    }
}
