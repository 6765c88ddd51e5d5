//! TEAcare command line client.
//!
//! Signs professionals in, keeps their session on disk and drives the
//! clinical API: patients, records, dashboard and the diagnostic wizard.

mod cli;
mod commands;
mod output;

use clap::Parser;
use teacare_infrastructure::ClientConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::load(&cli.overrides())?;
    tracing::info!(
        base_url = %config.base_url,
        token_file = %config.token_file.display(),
        "Starting teacare v{}",
        env!("CARGO_PKG_VERSION")
    );

    let api = teacare_infrastructure::connect(&config).await?;
    let ctx = Context::new(api, cli.json);

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&ctx, email, password).await,
        Commands::Register(args) => commands::auth::register(&ctx, args).await,
        Commands::Logout => {
            commands::auth::logout(&ctx).await;
            Ok(())
        }
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Profile(args) => commands::auth::update_profile(&ctx, args).await,
        Commands::Patients { command } => commands::patients::run(&ctx, command).await,
        Commands::Records { command } => commands::records::run(&ctx, command).await,
        Commands::Dashboard => commands::dashboard::run(&ctx).await,
        Commands::Diagnostic {
            patient,
            report_dir,
        } => commands::diagnostic::run(&ctx, patient, report_dir).await,
        Commands::Report { id, output } => commands::diagnostic::report(&ctx, id, output).await,
    }
}
