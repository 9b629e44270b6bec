//! Registro - command line access to the grading backend.
//!
//! Verifies credentials and dumps average-grade aggregates as JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use registro::{Credentials, FilterBy, GradeQuery, RegistroClient, Session, Settings};

#[derive(Parser)]
#[command(name = "registro")]
#[command(about = "Command line client for the school grading backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with REGISTRO_USER / REGISTRO_PASSWORD and print the profile
    Login,

    /// Fetch average grades grouped by one dimension
    Averages {
        /// Start date (YYYY-MM-DD). Default: 2020-12-12
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Default: 2025-12-12
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Grouping: students, teachers, groups, years, subjects
        #[arg(long, short, default_value = "teachers")]
        by: FilterBy,

        /// Log in first so the session can be attached to the request
        #[arg(long)]
        login: bool,

        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env().context("Failed to load settings")?;
    let client = RegistroClient::new(&settings).context("Failed to build HTTP client")?;
    info!(backend = %client.base_url(), "Using backend");

    match cli.command {
        Commands::Login => {
            let session = login(&client).await?;
            println!("Logged in as {}", session.display_name());
        }
        Commands::Averages {
            from,
            to,
            by,
            login: with_login,
            output,
        } => {
            let defaults = GradeQuery::default();
            let query = GradeQuery::new(
                from.unwrap_or(defaults.start_date),
                to.unwrap_or(defaults.end_date),
                by,
            );
            let session = if with_login {
                Some(login(&client).await?)
            } else {
                None
            };
            averages_command(&client, &query, session.as_ref(), output).await?;
        }
    }

    Ok(())
}

async fn login(client: &RegistroClient) -> Result<Session> {
    let credentials = Credentials::from_env().context("Failed to load credentials")?;
    info!("Loaded credentials for user: {}", credentials.username);

    client
        .login(&credentials.username, &credentials.password)
        .await
        .context("Login failed")
}

async fn averages_command(
    client: &RegistroClient,
    query: &GradeQuery,
    session: Option<&Session>,
    output: Option<PathBuf>,
) -> Result<()> {
    info!(
        "Date range: {} to {}, grouped by {}",
        query.start_date, query.end_date, query.filter_by
    );

    let aggregates = match client.calculate_average_grade(query, session).await {
        Ok(aggregates) => aggregates,
        Err(e) => {
            error!("Fetch failed: {}", e);
            return Err(e.into());
        }
    };

    let json = serde_json::to_string_pretty(&aggregates)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(count = aggregates.len(), path = %path.display(), "Averages saved");
        }
        None => println!("{}", json),
    }

    Ok(())
}
