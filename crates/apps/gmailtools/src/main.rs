//! gmailtools - quota-aware Gmail label maintenance
//!
//! `relabel` makes labels inherit across conversations: every message in a
//! thread carrying a user label gets that label too.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use mail::{
    GmailAuth, GmailClient, GmailCredentials, Mailbox, QuotaCosts, RateLimiter, Relabeler,
    Selection, Status, parse_date_arg,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Gmail maintenance tools that stay within the API quota.
#[derive(Parser)]
#[command(name = "gmailtools")]
#[command(version)]
struct Cli {
    /// Enable debugging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Run in dry-run mode (do not modify anything)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Credentials file to use
    #[arg(long = "creds", value_name = "FILE", global = true)]
    creds: Option<PathBuf>,

    /// Saved token file to use
    #[arg(long = "token", value_name = "FILE", global = true)]
    token: Option<PathBuf>,

    /// Quota policy file to use
    #[arg(long = "quota", value_name = "FILE", global = true)]
    quota: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relabel all messages in a labeled thread (label inheritance)
    Relabel {
        /// Consider threads/messages more recent than a date
        /// (YYYY-MM-DD, today, yesterday, "N days|weeks|years ago")
        #[arg(long, value_name = "DATE")]
        since: Option<String>,

        /// Consider threads/messages older than a date
        #[arg(long, value_name = "DATE")]
        until: Option<String>,

        /// Labels to consider, comma-separated and repeatable (default: all user labels)
        #[arg(long = "label", value_name = "LABEL[,..]")]
        labels: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    let status = Arc::new(Status::new());
    match run(&cli, status.clone()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.debug {
                error!("{:?}", e);
            } else {
                error!("{:#}", e);
            }
            error!("At: {}", status.get());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, status: Arc<Status>) -> Result<()> {
    match &cli.command {
        Commands::Relabel {
            since,
            until,
            labels,
        } => {
            let today = chrono::Local::now().date_naive();
            let selection = Selection {
                labels: Selection::parse_label_args(labels),
                since: since
                    .as_deref()
                    .map(|arg| parse_date_arg(arg, today))
                    .transpose()
                    .context("Invalid --since")?,
                until: until
                    .as_deref()
                    .map(|arg| parse_date_arg(arg, today))
                    .transpose()
                    .context("Invalid --until")?,
                dry_run: cli.dry_run,
            };

            let mailbox = connect(cli, status)?;
            let stats = Relabeler::new(&mailbox).run(&selection)?;

            for failure in &stats.failures {
                warn!(
                    "Failed: label {}, thread {}: {}",
                    failure.label,
                    failure.thread_id.as_str(),
                    failure.error
                );
            }
            Ok(())
        }
    }
}

/// Build an authenticated, quota-gated mailbox
fn connect(cli: &Cli, status: Arc<Status>) -> Result<Mailbox> {
    if let Err(e) = config::init() {
        warn!("Failed to initialize config directory: {:#}", e);
    }

    let costs = QuotaCosts::load(cli.quota.as_deref())?;
    info!(
        "Quota: {} units/s (thread modify {}, batch modify {})",
        costs.rate, costs.threads_modify, costs.messages_batch_modify
    );

    status.set("Auth: connecting to gmail api service");
    let creds = GmailCredentials::load(cli.creds.as_deref()).map_err(|e| {
        if let Some(path) = GmailCredentials::default_credentials_path() {
            warn!(
                "To configure Gmail access, either:\n\
                 1. Pass --creds <file> with your Google OAuth credentials\n\
                 2. Place them at: {}\n\
                 3. Or set environment variables: GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                path.display()
            );
        }
        e
    })?;
    let token_path = match &cli.token {
        Some(path) => path.clone(),
        None => GmailAuth::default_token_path()?,
    };

    let client = GmailClient::new(GmailAuth::new(&creds, token_path));
    client.authenticate()?;

    let limiter = Arc::new(RateLimiter::new(costs.rate));
    Ok(Mailbox::new(Arc::new(client), limiter, costs).with_status(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_relabel_args() {
        let cli = Cli::try_parse_from([
            "gmailtools",
            "--dry-run",
            "relabel",
            "--since",
            "2 weeks ago",
            "--label",
            "Project,Travel",
            "--label",
            "Receipts",
        ])
        .unwrap();

        assert!(cli.dry_run);
        let Commands::Relabel { since, labels, .. } = cli.command;
        assert_eq!(since.as_deref(), Some("2 weeks ago"));
        assert_eq!(
            Selection::parse_label_args(&labels),
            vec!["Project", "Travel", "Receipts"]
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["gmailtools", "--debug"]).is_err());
    }
}
