use anyhow::Result;
use colored::Colorize;

use crate::cli::ServeArgs;
use crate::config::ServerConfig;
use crate::web::WebServer;

/// Run the relay server
pub async fn run_web_server(args: &ServeArgs) -> Result<()> {
    let config = ServerConfig::from_args(args)?;

    println!("{}", "🧞 Starting GenieSite relay...".bright_cyan().bold());
    println!("   Model: {}", config.model);
    if config.api_key.is_none() {
        log::error!("❌ GEMINI_API_KEY is missing. Generation requests will fail until it is set.");
    }

    WebServer::new(config).start().await
}
