mod cli;
mod context;
mod handlers;
mod output;

use branchy_core::AppConfig;
use branchy_tui::App;
use clap::Parser;
use cli::{Cli, Commands};
use context::CliContext;

fn init_logging(interactive: bool) -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("BRANCHY_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else if !interactive {
        // Stays silent under the TUI, which owns the terminal
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none())?;
    let config = AppConfig::load();

    match cli.command {
        None => {
            let ctx = CliContext::open(cli.repo, &config).await?;
            let label = ctx.label();
            let mut app = App::new(ctx.project, label);
            app.run().await?;
        }
        Some(Commands::Completions { shell }) => handlers::completions::handle(shell),
        Some(Commands::Branch(action)) => {
            let ctx = match CliContext::open(cli.repo, &config).await {
                Ok(ctx) => ctx,
                Err(e) => output::output_error(&e.to_string()),
            };
            let result = handlers::branch::handle(&ctx, action).await;
            ctx.shutdown().await;
            if let Err(e) = result {
                output::output_error(&e.to_string());
            }
        }
    }

    Ok(())
}
