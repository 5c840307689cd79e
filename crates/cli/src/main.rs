mod cli;
mod commands;
mod config;
mod utils;

use std::sync::Arc;

use clap::{CommandFactory, Parser};
use eyre::WrapErr;
use regswitch_registry::{AuthRequest, NpmCli, PublishOptions, RecordStore, RegistryManager};
use tracing_subscriber::EnvFilter;

use crate::cli::Commands;
use crate::commands::{
    handle_add_command, handle_config_command, handle_current_command, handle_del_command,
    handle_home_command, handle_list_command, handle_publish_command, handle_set_auth_command,
    handle_set_email_command, handle_set_hosted_repo_command, handle_test_command,
    handle_use_command,
};
use crate::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // no arguments prints help and succeeds
    if cli::Cli::is_bare_invocation(std::env::args_os()) {
        cli::Cli::command().print_help()?;
        return Ok(());
    }

    let cli = cli::Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::get_config_path);

    // `config reset` must work even when the file no longer parses
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config_command(command, &config_path).await;
        }
        other => other,
    };

    let config = Config::load(&config_path)
        .await
        .wrap_err_with(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let npm = Arc::new(NpmCli::new(config.npm.command.clone()));
    let records = RecordStore::new(config.record_path());
    tracing::debug!("Using record file {}", records.path().display());
    let manager =
        RegistryManager::new(records, npm.clone()).with_fallback(config.record.fallback.clone());

    match command {
        Commands::Ls => handle_list_command(&manager).await?,
        Commands::Current => handle_current_command(&manager).await?,
        Commands::Use { name } => handle_use_command(name, &manager).await?,
        Commands::Add { name, url, home } => handle_add_command(name, url, home, &manager).await?,
        Commands::Del { name } => handle_del_command(name, &manager).await?,
        Commands::SetAuth {
            name,
            value,
            always_auth,
            username,
            password,
        } => {
            let request = AuthRequest {
                value,
                username,
                password,
                always_auth,
            };
            handle_set_auth_command(name, request, &manager).await?
        }
        Commands::SetEmail { name, value } => {
            handle_set_email_command(name, value, &manager).await?
        }
        Commands::SetHostedRepo { name, value } => {
            handle_set_hosted_repo_command(name, value, &manager).await?
        }
        Commands::Home { name, browser } => handle_home_command(name, browser, &manager).await?,
        Commands::Publish {
            target,
            tag,
            access,
            otp,
            dry_run,
        } => {
            let options = PublishOptions {
                tag,
                access,
                otp,
                dry_run,
            };
            handle_publish_command(target, options, &manager, &*npm).await?
        }
        Commands::Test { name } => handle_test_command(name, &config.probe, &manager).await?,
        Commands::Config { command } => handle_config_command(command, &config_path).await?,
    }

    Ok(())
}
