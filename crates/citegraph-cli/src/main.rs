use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use citegraph_core::oracle::openai::DEFAULT_MODEL;
use citegraph_core::{Crawler, HttpFetcher, OpenAiOracle, ProcessOutcome, SkipReason, arxiv, config_file};
use citegraph_pdf_mupdf::MupdfExtractor;

mod output;

use output::ColorMode;

/// Citegraph - Crawl a paper's citation graph from an arXiv PDF URL
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download a seed paper, then discover and fetch the papers it cites
    Crawl {
        /// arXiv PDF URL of the seed paper (e.g. https://arxiv.org/pdf/2106.14835)
        pdf_url: String,

        /// OpenAI API key (falls back to OPENAI_API_KEY, then the config file)
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Completion model for the resolution oracle
        #[arg(long)]
        model: Option<String>,

        /// Directory for extracted images and the session document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Expand references inside the seed call instead of a separate
        /// breadth pass
        #[arg(long)]
        deep: bool,

        /// Only process the seed paper; skip reference expansion
        #[arg(long, conflicts_with = "deep")]
        seed_only: bool,

        /// Print the full extracted text of every paper
        #[arg(long)]
        print_text: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Crawl {
            pdf_url,
            api_key,
            model,
            output,
            deep,
            seed_only,
            print_text,
            no_color,
        } => {
            crawl(
                pdf_url, api_key, model, output, deep, seed_only, print_text, no_color,
            )
            .await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn crawl(
    pdf_url: String,
    api_key: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
    deep: bool,
    seed_only: bool,
    print_text: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    let config = config_file::load_config();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let api_key = api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .or_else(|| config.oracle.as_ref().and_then(|o| o.api_key.clone()));
    let Some(api_key) = api_key else {
        anyhow::bail!(
            "No OpenAI API key. Pass --api-key, set OPENAI_API_KEY, or add it to the config file."
        );
    };
    let model = model
        .or_else(|| std::env::var("OPENAI_MODEL").ok())
        .or_else(|| config.oracle.as_ref().and_then(|o| o.model.clone()))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let oracle_timeout_secs: u64 = config
        .oracle
        .as_ref()
        .and_then(|o| o.timeout_secs)
        .unwrap_or(60);
    let output_root = output
        .or_else(|| std::env::var("CITEGRAPH_STORAGE").ok().map(PathBuf::from))
        .or_else(|| {
            config
                .storage
                .as_ref()
                .and_then(|s| s.root.clone())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("papers"));

    let color = ColorMode(!no_color);
    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    // Validate the seed URL, correcting a missing .pdf extension first.
    let seed_url = if arxiv::is_pdf_url(&pdf_url) {
        pdf_url
    } else {
        let corrected = arxiv::ensure_pdf_suffix(&pdf_url);
        if !arxiv::is_pdf_url(&corrected) {
            anyhow::bail!("Not a valid arXiv PDF URL: {pdf_url}");
        }
        writeln!(writer, "URL corrected to include .pdf extension: {corrected}")?;
        corrected
    };

    std::fs::create_dir_all(&output_root)?;

    let fetcher = Arc::new(HttpFetcher::new()?);
    let extractor = Arc::new(MupdfExtractor::new(&output_root));
    let oracle = Arc::new(OpenAiOracle::with_model(
        api_key,
        model,
        Duration::from_secs(oracle_timeout_secs),
    )?);
    let mut crawler = Crawler::new(fetcher, extractor, oracle);

    writeln!(writer, "Processing seed paper {seed_url}...")?;
    let outcome = if deep {
        crawler.process_paper(&seed_url, true).await
    } else {
        crawler.process_initial_paper(&seed_url).await
    };

    match outcome {
        ProcessOutcome::Processed { .. } => {}
        ProcessOutcome::Skipped(SkipReason::InvalidUrl) => {
            anyhow::bail!("Not a valid arXiv PDF URL: {seed_url}");
        }
        ProcessOutcome::Skipped(SkipReason::FetchFailed) => {
            anyhow::bail!("Failed to download the seed paper from {seed_url}");
        }
        ProcessOutcome::Skipped(SkipReason::ExtractionFailed) => {
            anyhow::bail!("Failed to extract text from the seed paper");
        }
        ProcessOutcome::Skipped(SkipReason::Duplicate) => {
            // Unreachable on a fresh crawler; nothing sensible to do.
            anyhow::bail!("Seed paper was already processed");
        }
    }

    if !seed_only && !deep {
        writeln!(writer, "\nProcessing references...")?;
        crawler.process_references().await;
        writeln!(writer, "References processing completed.")?;
    }

    for node in crawler.nodes() {
        output::print_paper(&mut writer, node, print_text, color)?;
    }
    output::print_summary(&mut writer, &crawler, color)?;

    // One JSON document per crawl session, written once at session end.
    let session_path = output_root.join("session.json");
    let document = serde_json::to_string_pretty(&crawler.state().session_document())?;
    std::fs::write(&session_path, document)?;
    writeln!(writer, "Session data saved to {}", session_path.display())?;

    Ok(())
}
