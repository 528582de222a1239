//! Interactive stock keywording CLI.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use stock_keyworder::{
    list_candidates, prompt_multi, prompt_single, run_batch, BatchOptions, ExifToolWriter,
    GeminiCaptioner, KeyworderConfig, ResponseMode,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Caption the newest stock files with Gemini and tag them with exiftool.
#[derive(Parser, Debug)]
#[command(name = "keyworder")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the stock files
    #[arg(short, long, env = "KEYWORDER_STOCK_DIR")]
    dir: Option<PathBuf>,

    /// File extension to offer
    #[arg(short, long, default_value = "eps")]
    ext: String,

    /// How many of the newest files to offer
    #[arg(short, long, default_value_t = 5)]
    limit: usize,

    /// Pick a single file instead of several
    #[arg(long)]
    single: bool,

    /// Answer style requested from the model (text or json)
    #[arg(short, long, default_value_t = ResponseMode::Json)]
    mode: ResponseMode,

    /// Print captions without writing metadata
    #[arg(long)]
    no_write: bool,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "stock_keyworder=debug,keyworder=debug"
    } else {
        "stock_keyworder=info,keyworder=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before tracing so RUST_LOG from the file applies.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.verbose);

    match dotenv {
        Ok(path) => tracing::debug!(".env read from {}", path.display()),
        Err(e) => tracing::debug!("no .env loaded: {}", e),
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("[ERROR] {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    // The credential is checked only once there is something to caption,
    // so a first run still creates the stock directory.
    let loaded = KeyworderConfig::from_env();

    let stock_dir = args
        .dir
        .clone()
        .unwrap_or_else(|| match &loaded {
            Ok(config) => config.stock_dir.clone(),
            Err(_) => KeyworderConfig::default().stock_dir,
        });

    let candidates = match list_candidates(&stock_dir, &args.ext, args.limit) {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("[ERROR] {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let selected = if args.single {
        prompt_single(&candidates, stdin.lock(), stdout.lock())?
            .into_iter()
            .collect::<Vec<_>>()
    } else {
        prompt_multi(&candidates, stdin.lock(), stdout.lock())?
    };

    if selected.is_empty() {
        tracing::error!("[ERROR] no file selected");
        return Ok(ExitCode::FAILURE);
    }

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("[ERROR] {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    config = config
        .stock_dir(stock_dir)
        .extension(args.ext)
        .limit(args.limit)
        .mode(args.mode);
    if let Some(model) = args.model {
        config = config.model(model);
    }

    tracing::info!(
        files = selected.len(),
        model = %config.model,
        mode = %config.mode,
        "starting captioning"
    );

    let writer = ExifToolWriter::new(&config.exiftool);
    let captioner = GeminiCaptioner::new(config)?;
    let options = BatchOptions::default().write_metadata(!args.no_write);

    let report = run_batch(&captioner, &writer, &selected, &options).await;
    println!(
        "Processed {} file(s): {} succeeded, {} failed",
        report.total(),
        report.succeeded,
        report.failed
    );

    Ok(ExitCode::SUCCESS)
}
