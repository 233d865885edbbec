use ratatui::layout::Rect;
use tracing::debug;

use crate::client::{ClientError, CoachClient};
use crate::state::{ChatMessage, ChatResponse, ChatRole, SessionState};
use crate::status::StatusBar;

pub const INTRO_MESSAGE: &str =
    "Hi — I’m Research Coach. Start with: set topic: <your topic> (or click Help).";
pub const FALLBACK_MESSAGE: &str = "Could not reach server. Is Flask running?";

/// A user action that results in one request to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Help,
    /// Carries the command computed from the explain state on display
    Explain { command: String },
    Submit { message: String },
}

impl Action {
    /// The text sent as the `message` field.
    pub fn message(&self) -> &str {
        match self {
            Action::Help => "help",
            Action::Explain { command } => command,
            Action::Submit { message } => message,
        }
    }
}

pub struct App {
    pub should_quit: bool,

    // Chat log
    pub messages: Vec<ChatMessage>,
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, for scroll calculations
    pub chat_width: u16,  // inner width, for wrap calculations

    // Status line and explain button
    pub status: StatusBar,

    // Input line
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Requests in flight (no guard against overlap)
    pub pending: usize,
    pub animation_frame: u8,

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub help_button_area: Option<Rect>,
    pub explain_button_area: Option<Rect>,

    pub client: CoachClient,
}

impl App {
    pub fn new(client: CoachClient) -> Self {
        let mut app = Self {
            should_quit: false,
            messages: Vec::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            status: StatusBar::default(),
            input: String::new(),
            input_cursor: 0,
            pending: 0,
            animation_frame: 0,
            chat_area: None,
            help_button_area: None,
            explain_button_area: None,
            client,
        };

        // Shown before any server contact
        app.add_message(ChatRole::Bot, INTRO_MESSAGE);
        app.update_status(&SessionState::default());
        app
    }

    /// Append a bubble to the log and keep the newest one in view.
    pub fn add_message(&mut self, role: ChatRole, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, text));
        self.scroll_chat_to_bottom();
    }

    /// Replace the status display with what the server last reported.
    pub fn update_status(&mut self, state: &SessionState) {
        self.status = StatusBar::from_state(state);
    }

    pub fn help(&self) -> Action {
        Action::Help
    }

    /// Ask for the opposite of what the button shows; the reply settles it.
    pub fn toggle_explain(&self) -> Action {
        Action::Explain {
            command: self.status.explain_command().to_string(),
        }
    }

    /// Take the input line. Blank input is left alone and produces nothing.
    pub fn submit(&mut self) -> Option<Action> {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        self.input.clear();
        self.input_cursor = 0;
        self.add_message(ChatRole::User, message.clone());
        Some(Action::Submit { message })
    }

    /// Render the outcome of a request. Every failure becomes one fallback bubble.
    pub fn complete(&mut self, action: Action, result: Result<ChatResponse, ClientError>) {
        self.pending = self.pending.saturating_sub(1);

        match result {
            Ok(response) => {
                match &action {
                    Action::Help => self.add_message(ChatRole::Meta, "Showing help"),
                    Action::Explain { command } => self.add_message(ChatRole::Meta, command.clone()),
                    Action::Submit { .. } => {}
                }
                self.add_message(ChatRole::Bot, response.reply);
                self.update_status(&response.state);
            }
            Err(e) => {
                debug!(action = ?action, error = %e, "chat request failed");
                self.add_message(ChatRole::Bot, FALLBACK_MESSAGE);
            }
        }
    }

    /// Send and apply in one step, without spawning.
    pub async fn dispatch(&mut self, action: Action) {
        self.pending += 1;
        let result = self.client.send(action.message()).await;
        self.complete(action, result);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max_scroll = self.chat_line_count().saturating_sub(self.visible_height());
        self.chat_scroll = (self.chat_scroll + lines).min(max_scroll);
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();
        let visible_height = self.visible_height();
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered lines of the chat log at the current width, wrapped the way `ui` draws it.
    pub fn chat_line_count(&self) -> u16 {
        // Default to 50 columns before the first render
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let total_lines = crate::ui::chat_paragraph(self).line_count(wrap_width);
        total_lines.min(u16::MAX as usize) as u16
    }
}
