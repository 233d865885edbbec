use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use research_coach::app::{App, FALLBACK_MESSAGE};
use research_coach::client::CoachClient;
use research_coach::config::Config;
use research_coach::state::ChatRole;
use research_coach::{handler, logging, server, tui, ui};

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Chat with the research coach, or run its server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat in the terminal (default)
    Chat {
        /// Coach server URL
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Send one message and print the reply and session status
    Ask {
        /// Message to send
        message: String,
        /// Coach server URL
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Run the coach server
    Serve {
        /// Address to bind
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Print the resolved configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat { server: None });

    // The TUI owns the terminal, so it logs to a file. Keep the guard alive until exit.
    let _log_guard = match command {
        Commands::Chat { .. } => match logging::init_file() {
            Ok((guard, path)) => {
                info!("Chat client v{} starting, logging to {}", env!("CARGO_PKG_VERSION"), path.display());
                Some(guard)
            }
            Err(_) => None,
        },
        _ => {
            logging::init_stderr();
            None
        }
    };

    let config = Config::load();

    match command {
        Commands::Chat { server } => run_chat(&server.unwrap_or(config.server_url)).await,
        Commands::Ask { message, server } => ask(&server.unwrap_or(config.server_url), &message).await,
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or(config.bind);
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            server::serve(listener).await
        }
        Commands::Config { save } => show_config(&config, save),
    }
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        config.save()?;
        println!("\nSaved to {}", Config::get_config_path()?.display());
    }
    Ok(())
}

/// One turn through the same path the chat window uses.
async fn ask(server_url: &str, message: &str) -> Result<()> {
    let mut app = App::new(CoachClient::new(server_url)?);
    app.input = message.to_string();
    let Some(action) = app.submit() else {
        anyhow::bail!("Nothing to send");
    };
    app.dispatch(action).await;

    let reply = app
        .messages
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::Bot)
        .map(|m| m.text.as_str())
        .unwrap_or_default();
    println!("{}", reply);
    if reply == FALLBACK_MESSAGE {
        std::process::exit(1);
    }
    println!("\n{}", app.status.text);
    Ok(())
}

async fn run_chat(server_url: &str) -> Result<()> {
    let mut app = App::new(CoachClient::new(server_url)?);
    info!("Using coach server {}", server_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let tx = events.sender();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event, &tx),
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!("Chat client exiting");
    result
}
