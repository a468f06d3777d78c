//! CLI binary for edgequake-studyplan.
//!
//! `serve` runs the HTTP service; `plan` runs the pipeline once on a local
//! file or URL and prints the study plan as JSON. Both map their flags onto
//! the same `PlannerConfig`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_studyplan::{server, PlannerConfig, StudyPlanner};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on the default address
  studyplan serve

  # Upload a paper to a running service
  curl -F file=@attention.pdf http://127.0.0.1:3000/api/process-paper

  # One-shot plan for a local file, printed to stdout
  studyplan plan attention.pdf

  # From a URL, written to a file
  studyplan plan https://arxiv.org/pdf/1706.03762 -o plan.json

  # Use a specific provider and model
  studyplan --provider openai --model gpt-4.1 plan notes.txt

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (preferred when set)
  OPENAI_API_KEY          OpenAI API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium for PDF text extraction
  RUST_LOG                Log filter, e.g. "edgequake_studyplan=debug,tower_http=info"
"#;

/// Generate structured study plans from academic papers using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "studyplan",
    version,
    about = "Generate structured study plans from academic papers using LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    planner: PlannerArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "STUDYPLAN_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "STUDYPLAN_ADDR", default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Plan a single local file or HTTP/HTTPS URL and print the JSON.
    Plan {
        /// Local PDF/TXT path or HTTP/HTTPS URL.
        input: String,

        /// Write JSON to this file instead of stdout.
        #[arg(short, long, env = "STUDYPLAN_OUTPUT")]
        output: Option<PathBuf>,

        /// HTTP download timeout in seconds.
        #[arg(long, env = "STUDYPLAN_DOWNLOAD_TIMEOUT", default_value_t = 120)]
        download_timeout: u64,
    },
}

#[derive(Args, Debug)]
struct PlannerArgs {
    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, global = true, env = "STUDYPLAN_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, global = true, env = "STUDYPLAN_MODEL")]
    model: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "STUDYPLAN_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, global = true, env = "STUDYPLAN_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Generation call timeout in seconds.
    #[arg(long, global = true, env = "STUDYPLAN_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Upload size ceiling in MiB.
    #[arg(long, global = true, env = "STUDYPLAN_MAX_FILE_SIZE_MB", default_value_t = 10)]
    max_file_size_mb: u64,

    /// Characters of paper text sent to the model.
    #[arg(long, global = true, env = "STUDYPLAN_MAX_CHARS", default_value_t = 8000)]
    max_chars: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.planner)?;
    let planner = Arc::new(
        StudyPlanner::from_config(config).context("Failed to initialise LLM provider")?,
    );

    match cli.command {
        Command::Serve { addr } => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Listening on http://{}", addr);
            info!("Upload endpoint: POST http://{}/api/process-paper", addr);
            server::serve(listener, server::router(planner))
                .await
                .context("Server error")?;
        }
        Command::Plan {
            input,
            output,
            download_timeout,
        } => {
            let plan = planner
                .plan_input(&input, download_timeout)
                .await
                .context("Study plan generation failed")?;
            let json = serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?;

            if let Some(path) = output {
                tokio::fs::write(&path, format!("{json}\n"))
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "✔ {} sections → {}",
                    plan.sections.len(),
                    path.display()
                );
            } else {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{json}").context("Failed to write to stdout")?;
            }
        }
    }

    Ok(())
}

/// Map CLI args to `PlannerConfig`.
fn build_config(args: &PlannerArgs) -> Result<PlannerConfig> {
    let mut builder = PlannerConfig::builder()
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .generation_timeout_secs(args.timeout)
        .max_file_size(args.max_file_size_mb.saturating_mul(1024 * 1024))
        .max_content_chars(args.max_chars);

    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }

    builder.build().context("Invalid configuration")
}
