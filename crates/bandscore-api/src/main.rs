//! Bandscore CLI and web wizard entry point.
//!
//! Binary name: `bandscore`
//!
//! Parses CLI arguments, loads configuration and secrets, then dispatches to
//! the matching command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;

use bandscore_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};

use cli::{Cli, Commands, CriteriaAction};
use state::{AppState, LoadedConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    shutdown_tracing();

    if let Err(e) = result {
        eprintln!("  {} {e:#}", style("✗").red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_override = cli.config.as_deref();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "bandscore", &mut std::io::stdout());
        }

        Commands::Keygen => cli::keys::keygen(cli.json)?,

        Commands::Count { task, text, file } => {
            let loaded = LoadedConfig::load(config_override).await;
            cli::count::count(task, text, file, loaded.config.word_count_policy, cli.json).await?;
        }

        Commands::Tasks => {
            let loaded = LoadedConfig::load(config_override).await;
            cli::tasks::list_tasks(&loaded, cli.json)?;
        }

        Commands::Status => {
            let loaded = LoadedConfig::load(config_override).await;
            cli::status::status(&loaded, cli.json).await?;
        }

        Commands::Encrypt {
            dir,
            key,
            key_file,
            write_key,
            force,
        } => {
            let loaded = LoadedConfig::load(config_override).await;
            let args = cli::keys::EncryptArgs {
                dir,
                key,
                key_file,
                write_key,
                force,
            };
            cli::keys::encrypt(&loaded, args, cli.json).await?;
        }

        Commands::Criteria { action } => {
            let state = AppState::init(config_override).await?;
            match action {
                CriteriaAction::Show { task } => {
                    cli::criteria::show_criteria(&state, task, cli.json).await?;
                }
            }
        }

        Commands::Evaluate {
            task,
            question,
            question_file,
            response,
            response_file,
            save,
        } => {
            let state = AppState::init(config_override).await?;
            let args = cli::evaluate::EvaluateArgs {
                task,
                question,
                question_file,
                response,
                response_file,
                save,
            };
            cli::evaluate::evaluate(&state, args, cli.json, cli.quiet).await?;
        }

        Commands::Serve { port, host } => {
            let state = AppState::init(config_override).await?;
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                %addr,
                data_dir = %state.data_dir.display(),
                config = %state.config_path.display(),
                criteria_dir = %state.config.criteria_dir.display(),
                "Server starting"
            );
            if !cli.quiet {
                println!(
                    "  {} Bandscore listening on {}",
                    style("⚡").bold(),
                    style(format!("http://{addr}")).cyan()
                );
                println!("  {}", style("Press Ctrl+C to stop").dim());
            }

            let sweeper = state.spawn_session_sweeper();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            sweeper.abort();

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
