use anyhow::Result;
use clap::{CommandFactory, Parser};

use geniesite::app::{run_generate, run_web_server};
use geniesite::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return Ok(());
    }

    match cli.command {
        Some(Commands::Serve(args)) => run_web_server(&args).await,
        Some(Commands::Generate(args)) => run_generate(&args).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
