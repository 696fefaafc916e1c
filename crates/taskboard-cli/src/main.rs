mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use taskboard_core::AppConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing(command: &Commands) -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("TASKBOARD_DEBUG_LOG") {
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
        return Ok(());
    }

    let default_level = match command {
        // The terminal board owns stdout/stderr; only the debug file may log.
        Commands::Tui => return Ok(()),
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.command)?;

    let config = AppConfig::load();
    let ctx = CliContext::resolve(&cli, config);

    match cli.command {
        Commands::Serve(args) => handlers::serve::handle(&ctx.config, args).await?,
        Commands::Tui => {
            let gateway = ctx.gateway()?;
            taskboard_tui::run(gateway, ctx.user_label()).await?;
        }
        Commands::Task(task_cmd) => {
            if let Err(e) = handlers::task::handle(&ctx, task_cmd.action).await {
                output::output_error(&e.to_string());
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "taskboard", &mut std::io::stdout());
        }
    }

    Ok(())
}
