use clap::Parser;
use std::path::PathBuf;

/// go-client: play casual-go over a binary WebSocket
#[derive(Parser, Debug)]
#[command(name = "go-client")]
#[command(about = "Join a game and play it from the terminal", long_about = None)]
pub struct Cli {
    /// WebSocket endpoint of the game server
    #[arg(long, default_value = "ws://localhost:8000/ws")]
    pub url: String,

    /// File holding the persisted session id and token
    #[arg(long, default_value = ".go-session.json")]
    pub session_file: PathBuf,

    /// Session to rejoin, overriding the persisted one
    #[arg(long)]
    pub session_id: Option<String>,

    /// Token for the session, overriding the persisted one
    #[arg(long)]
    pub token: Option<String>,

    /// Play random moves instead of reading commands from stdin
    #[arg(long, default_value_t = false)]
    pub auto: bool,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
