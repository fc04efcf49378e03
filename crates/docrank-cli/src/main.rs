use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use docrank_core::config_file;
use docrank_core::{Config, EmbedderKind, ProgressEvent, Query};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Persona-driven document analysis - Rank and summarize the sections that matter for a task
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank and summarize the documents listed in a query file
    Analyze {
        /// Folder with the documents and the query file
        #[arg(long)]
        input_dir: PathBuf,

        /// Where to write results.json
        #[arg(long)]
        output_dir: PathBuf,

        /// Query file name, resolved against the input folder
        #[arg(long, default_value = "query.json")]
        query_file: PathBuf,

        /// Number of sections to keep
        #[arg(long)]
        top_k: Option<usize>,

        /// Sentences per summary
        #[arg(long)]
        num_sentences: Option<usize>,

        /// Embedding backend: "hashing" or "http"
        #[arg(long)]
        embedder: Option<String>,

        /// Base URL of an OpenAI-compatible embeddings API
        #[arg(long)]
        embed_url: Option<String>,

        /// Embedding model name sent to the API
        #[arg(long)]
        embed_model: Option<String>,

        /// Embedding vector size (hashing size, or requested from the http API)
        #[arg(long)]
        dimensions: Option<usize>,

        /// Skip documents that cannot be read instead of aborting
        #[arg(long)]
        skip_unreadable: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Dry run: list the sections assembled from one file without ranking
    Sections {
        /// Path to the PDF, .txt, or .md file
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

/// Overrides taken from the command line; `None` leaves lower layers in place.
#[derive(Debug, Default)]
struct CliOverrides {
    top_k: Option<usize>,
    num_sentences: Option<usize>,
    embedder: Option<String>,
    embed_url: Option<String>,
    embed_model: Option<String>,
    dimensions: Option<usize>,
    skip_unreadable: bool,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze {
            input_dir,
            output_dir,
            query_file,
            top_k,
            num_sentences,
            embedder,
            embed_url,
            embed_model,
            dimensions,
            skip_unreadable,
            no_color,
            no_progress,
        } => {
            let overrides = CliOverrides {
                top_k,
                num_sentences,
                embedder,
                embed_url,
                embed_model,
                dimensions,
                skip_unreadable,
            };
            analyze(
                &input_dir,
                &output_dir,
                &query_file,
                overrides,
                no_color,
                no_progress,
            )
        }
        Command::Sections {
            file_path,
            no_color,
        } => dry_run_sections(&file_path, no_color),
    }
}

/// Resolve configuration: CLI flags > env vars > config file > defaults
fn resolve_config(overrides: CliOverrides) -> anyhow::Result<Config> {
    let mut builder = config_file::load_config().to_builder()?;

    if let Ok(url) = std::env::var("DOCRANK_EMBED_URL") {
        builder = builder.embed_url(url);
    }
    if let Ok(model) = std::env::var("DOCRANK_EMBED_MODEL") {
        builder = builder.embed_model(model);
    }
    if let Ok(key) = std::env::var("DOCRANK_EMBED_API_KEY") {
        builder = builder.embed_api_key(key);
    }

    if let Some(k) = overrides.top_k {
        builder = builder.top_k(k);
    }
    if let Some(n) = overrides.num_sentences {
        builder = builder.num_sentences(n);
    }
    if let Some(ref kind) = overrides.embedder {
        builder = builder.embedder(kind.parse::<EmbedderKind>()?);
    }
    if let Some(url) = overrides.embed_url {
        builder = builder.embed_url(url);
    }
    if let Some(model) = overrides.embed_model {
        builder = builder.embed_model(model);
    }
    if let Some(n) = overrides.dimensions {
        builder = builder.dimensions(n);
    }
    if overrides.skip_unreadable {
        builder = builder.skip_unreadable(true);
    }

    Ok(builder.build()?)
}

fn analyze(
    input_dir: &Path,
    output_dir: &Path,
    query_file: &Path,
    overrides: CliOverrides,
    no_color: bool,
    no_progress: bool,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let start = Instant::now();
    let color = ColorMode(!no_color);
    let mut writer = std::io::stdout();

    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    // Fatal configuration problems surface before any document is opened.
    let config = resolve_config(overrides)?;
    let query = Query::from_path(&input_dir.join(query_file))?;
    let embedder = config.embedding.build_embedder()?;
    tracing::info!(embedder = embedder.name(), top_k = config.top_k, "configuration resolved");

    output::print_run_header(&mut writer, &query, color)?;

    let bar = if no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message("Extracting sections...");
        bar
    };
    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} {msg} [{bar:40.green/dim}] {pos}/{len}",
    )?
    .progress_chars("=> ");

    let progress = |event: ProgressEvent| match event {
        ProgressEvent::Ranking { sections } => {
            bar.set_message(format!("Ranking {} sections...", sections));
        }
        ProgressEvent::Ranked { selected, .. } => {
            bar.set_style(bar_style.clone());
            bar.set_length(selected as u64);
            bar.set_position(0);
        }
        ProgressEvent::Summarizing { document, page, .. } => {
            bar.set_message(format!("Summarizing {} p.{}", document, page));
        }
        ProgressEvent::Summarized { .. } => bar.inc(1),
    };

    let result = docrank_ingest::process_query(
        input_dir,
        &query,
        embedder.as_ref(),
        &config,
        chrono::Utc::now(),
        progress,
    );
    bar.finish_and_clear();
    let (report, collection) = result?;

    output::print_skipped(&mut writer, &collection.skipped, color)?;
    output::print_report(&mut writer, &report, color)?;

    let out_path = output_dir.join("results.json");
    report.write_to(&out_path)?;
    output::print_summary(
        &mut writer,
        &out_path,
        collection.sections.len(),
        start.elapsed(),
        color,
    )?;
    writer.flush()?;

    Ok(())
}

fn dry_run_sections(file_path: &Path, no_color: bool) -> anyhow::Result<()> {
    let mut writer = std::io::stdout();

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());

    let config = config_file::load_config().to_builder()?.build()?;
    let sections = docrank_ingest::load_document(file_path, &file_name, &config)?;
    output::print_sections(&mut writer, &file_name, &sections, ColorMode(!no_color))?;

    Ok(())
}
