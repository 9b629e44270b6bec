use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use registro::{FilterBy, GradeQuery, RegistroClient, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod chart;
mod html;
mod pdf;
mod report;
mod server;

#[derive(Parser, Debug)]
#[command(name = "pagella")]
#[command(about = "Average-grade reports from the school grading backend")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Run one report and save it as PDF (no server)
    Export {
        /// Start date (YYYY-MM-DD). Default: 2020-12-12
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Default: 2025-12-12
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Grouping: students, teachers, groups, years, subjects
        #[arg(long, short, default_value = "teachers")]
        by: FilterBy,

        /// Where to write the PDF
        #[arg(short, long, default_value = pdf::REPORT_FILENAME)]
        output: PathBuf,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("tower_http=warn".parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let settings = Settings::from_env().context("Failed to load settings")?;
    let client = RegistroClient::new(&settings).context("Failed to build HTTP client")?;

    match args.command {
        None => {
            server::serve(8080, Arc::new(server::AppState::new(client))).await?;
        }
        Some(Commands::Serve { port }) => {
            server::serve(port, Arc::new(server::AppState::new(client))).await?;
        }
        Some(Commands::Export {
            from,
            to,
            by,
            output,
        }) => {
            let defaults = GradeQuery::default();
            let query = GradeQuery::new(
                from.unwrap_or(defaults.start_date),
                to.unwrap_or(defaults.end_date),
                by,
            );
            export_command(&client, &query, &output).await?;
        }
    }

    Ok(())
}

async fn export_command(client: &RegistroClient, query: &GradeQuery, output: &Path) -> Result<()> {
    info!(
        start = %query.start_date,
        end = %query.end_date,
        filter_by = %query.filter_by,
        "Requesting report"
    );

    let aggregates = client
        .calculate_average_grade(query, None)
        .await
        .context("Unable to fetch average grades")?;

    if aggregates.is_empty() {
        warn!("No results to export");
        return Ok(());
    }

    for line in report::listing(&aggregates) {
        info!("{}", line);
    }

    let bytes = match pdf::render_report(&aggregates) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Error generating PDF");
            return Err(e.into());
        }
    };

    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(path = %output.display(), bytes = bytes.len(), "PDF saved");

    Ok(())
}
