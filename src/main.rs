use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use menu_intake::config::{GraphConfig, IntakeConfig};
use menu_intake::document::TemplateValidator;
use menu_intake::intake::{ChangeNotification, GraphMessageStore, MessageStore, NotificationProcessor};
use menu_intake::redline;

#[derive(Parser)]
#[command(name = "menu-intake", version, about = "Menu document intake, validation and redlining")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a DOCX file against the official template.
    Validate {
        file: PathBuf,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the project details and menu content of a DOCX file as JSON.
    Details { file: PathBuf },
    /// Render [DELETE]/[ADD] tagged text into a redlined DOCX.
    Redline {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Produce redline markup from an original and a corrected text.
    Diff {
        original: PathBuf,
        corrected: PathBuf,
        /// Write a rendered DOCX instead of printing the markup.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a change-notification payload through the intake pipeline.
    Process { payload: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _log_guard = init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate { file, json } => validate(&file, json).await,
        Command::Details { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let details = TemplateValidator::default()
                .extract_details(&bytes)
                .with_context(|| format!("extracting {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Redline { input, output } => {
            let markup = read_text(&input).await?;
            write_docx(&output, &markup).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Diff {
            original,
            corrected,
            output,
        } => {
            let markup = redline::diff_to_markup(
                &read_text(&original).await?,
                &read_text(&corrected).await?,
            );
            match output {
                Some(path) => write_docx(&path, &markup).await?,
                None => println!("{markup}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Process { payload } => process(&payload).await,
    }
}

/// Console logging, plus a daily rolling file under `LOG_DIR` when set.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    match std::env::var("LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "menu-intake.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(_) => {
            registry.init();
            None
        }
    }
}

async fn validate(file: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let result = TemplateValidator::default().validate(&bytes);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_valid() {
        println!("{}: valid", file.display());
    } else {
        println!("{}: {} problem(s)", file.display(), result.errors().len());
        for error in result.errors() {
            println!("  - {error}");
        }
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn process(payload: &Path) -> anyhow::Result<ExitCode> {
    let intake = IntakeConfig::from_env().context("intake configuration")?;
    let graph = GraphConfig::from_env().context("Graph configuration")?;

    let raw = read_text(payload).await?;
    let notification = ChangeNotification::from_json(&raw)?;

    let store: Arc<dyn MessageStore> = Arc::new(GraphMessageStore::new(graph)?);
    let processor = NotificationProcessor::from_config(store, &intake)
        .await
        .with_context(|| format!("preparing staging at {}", intake.staging_dir.display()))?;

    let report = processor.process(&notification).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

async fn write_docx(path: &Path, markup: &str) -> anyhow::Result<()> {
    let bytes = redline::render(markup)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote redlined document");
    Ok(())
}
