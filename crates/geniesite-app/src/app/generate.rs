use anyhow::{bail, Context, Result};
use colored::Colorize;
use geniesite_client::{GenerationClient, GenerationSession, Phase};
use geniesite_protocol::ProtocolEvent;
use std::io::Write;

use crate::cli::GenerateArgs;

/// Generate a website through a running relay and export it to a file
pub async fn run_generate(args: &GenerateArgs) -> Result<()> {
    let mut client = GenerationClient::new(args.server.as_str());
    if args.legacy {
        client = client.legacy();
    }

    println!("{} {}", "🧞".bright_cyan(), args.prompt.bold());
    println!("   Relay: {}", client.endpoint());

    let mut session = GenerationSession::new();
    let outcome = client
        .run(&mut session, &args.prompt, |session, event| render(session, event))
        .await;
    println!();

    if let Some(message) = session.messages().last() {
        println!("{}", message.content);
    }
    outcome.context("generation did not complete")?;

    match (session.phase(), session.code()) {
        (Phase::Done, Some(code)) => {
            std::fs::write(&args.output, code)
                .with_context(|| format!("failed to write {}", args.output.display()))?;
            println!(
                "{} Saved {} bytes to {}",
                "💾".green(),
                code.len(),
                args.output.display()
            );
            Ok(())
        }
        _ => bail!("generation failed"),
    }
}

fn render(session: &GenerationSession, event: &ProtocolEvent) {
    match event {
        ProtocolEvent::ThoughtsStart { message } | ProtocolEvent::AnswerStart { message } => {
            println!("\n{}", message.bright_black());
        }
        ProtocolEvent::Thoughts { content } => {
            print!("{}", content.italic());
        }
        ProtocolEvent::Progress { .. } => {
            print!("\r   {:>3.0}% ({} updates)", session.progress(), session.progress_updates());
        }
        ProtocolEvent::Complete { .. } | ProtocolEvent::Error { .. } => {}
    }
    let _ = std::io::stdout().flush();
}
