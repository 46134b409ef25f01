use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use lr_report_tools::commands;
use lr_report_tools::commands::report::ReportOptions;
use lr_report_tools::config::ApiOptions;
use lr_report_tools::export::ExportFormat;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lr-report")]
#[command(about = "Customer security report generation from SIEM APIs", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List customer entities
    Entities {
        #[command(flatten)]
        api: ApiOptions,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Generate report tables and manifests per entity
    Report {
        #[command(flatten)]
        api: ApiOptions,

        #[command(flatten)]
        options: ReportOptions,
    },

    /// Print an exported CSV table
    Show {
        /// CSV file written by `report` or `entities`
        path: PathBuf,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).context("Invalid log filter")?,
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;

    debug!("Logging subsystem enabled");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Entities {
            api,
            output,
            format,
        } => commands::entities::run(&api, output.as_deref(), format).await,
        Commands::Report { api, options } => commands::report::run(&api, &options).await,
        Commands::Show { path } => commands::show::run(&path),
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "lr-report", &mut std::io::stdout());
            Ok(())
        }
    }
}
