use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use geniesite_model::DEFAULT_GEMINI_MODEL;
use std::path::PathBuf;

/// CLI arguments for geniesite
#[derive(Parser)]
#[command(name = "geniesite")]
#[command(about = "GenieSite - describe a website, watch the model think, get the HTML")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the streaming relay server
    Serve(ServeArgs),
    /// Generate a website through a running relay
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "5000", env = "PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "BIND_ADDR")]
    pub bind: String,

    /// Allowed CORS origin (repeatable or comma separated, "*" for any)
    #[arg(long = "allowed-origin", value_name = "ORIGIN", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Gemini API key
    #[arg(long, value_name = "KEY", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for generation
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_GEMINI_MODEL, env = "GEMINI_MODEL")]
    pub model: String,

    /// Gemini API base URL (e.g., a local proxy)
    #[arg(long, value_name = "URL", env = "GEMINI_API_URL")]
    pub api_url: Option<String>,

    /// Pause after each reasoning fragment, in milliseconds (0 disables)
    #[arg(long, default_value = "40", env = "THOUGHT_DELAY_MS")]
    pub thought_delay_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Description of the website
    pub prompt: String,

    /// Relay base URL
    #[arg(long, value_name = "URL", default_value = "http://localhost:5000", env = "GENIESITE_SERVER")]
    pub server: String,

    /// Where to write the generated HTML
    #[arg(long, short, value_name = "PATH", default_value = "website.html")]
    pub output: PathBuf,

    /// Use the legacy generate route
    #[arg(long)]
    pub legacy: bool,
}
