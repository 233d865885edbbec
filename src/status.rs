use crate::state::SessionState;

/// What the status line and the explain button currently display.
///
/// Always derived from the last state received; the client never keeps an
/// authoritative copy of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    pub text: String,
    pub explain_pressed: bool,
}

impl StatusBar {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            text: status_text(state),
            explain_pressed: state.explain,
        }
    }

    pub fn explain_label(&self) -> &'static str {
        if self.explain_pressed {
            "Explain: On"
        } else {
            "Explain: Off"
        }
    }

    /// Command asking the server to flip explain mode relative to what is shown.
    pub fn explain_command(&self) -> &'static str {
        if self.explain_pressed {
            "explain mode: off"
        } else {
            "explain mode: on"
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::from_state(&SessionState::default())
    }
}

/// `Session: <topic>[, <n> words]`, treating empty topic and zero count as unset.
pub fn status_text(state: &SessionState) -> String {
    let topic = state
        .topic
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("topic not set");
    let words = match state.word_count {
        Some(n) if n > 0 => format!(", {} words", n),
        _ => String::new(),
    };
    format!("Session: {}{}", topic, words)
}
