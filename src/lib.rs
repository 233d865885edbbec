pub mod app;
pub mod client;
pub mod coach;
pub mod config;
pub mod handler;
pub mod logging;
pub mod server;
pub mod state;
pub mod status;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use app::{Action, App};
pub use client::{ClientError, CoachClient};
pub use config::Config;
pub use state::{ChatMessage, ChatResponse, ChatRole, SessionState};
pub use status::StatusBar;
