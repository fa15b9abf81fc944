use anyhow::Result;
use clap::Parser;
use kartei::example::{generate_example, ExampleOutcome};
use kartei::generate::BackendConfig;
use kartei::ingest::read_deck;
use kartei::store::Store;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Debug)]
enum Backend {
    Openai,
    Gemini,
}

/// Converts a Pauker .pau.gz flashcard file into a SQLite database and
/// optionally generates a bilingual practice dialogue from its vocabulary.
#[derive(Parser)]
struct Cli {
    /// Input Pauker .pau.gz file
    #[arg(short, long)]
    input: PathBuf,
    /// Output SQLite database filename
    #[arg(short, long, default_value = "pauker_cards.sqlite")]
    output: PathBuf,
    /// Generate an example dialogue from cards outside the excluded batch
    #[arg(long)]
    example: bool,
    /// Generative backend for the example dialogue
    #[arg(long, value_enum, default_value_t = Backend::Openai)]
    backend: Backend,
    /// Batch whose cards are excluded from sampling
    #[arg(long, default_value_t = 1)]
    exclude_batch: i64,
    /// Directory for rendered HTML documents
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Cli::parse();

    let cards = read_deck(&args.input)?;
    let mut store = Store::open(&args.output)?;
    let count = store.replace_cards(&cards)?;
    info!("Imported {} cards into {:?}", count, args.output);

    if args.example {
        let backend = match args.backend {
            Backend::Openai => BackendConfig::openai(),
            Backend::Gemini => BackendConfig::gemini(),
        };
        match generate_example(&store, args.exclude_batch, backend, &args.out_dir)? {
            ExampleOutcome::Generated { id, document } => {
                info!("Example {} rendered to {:?}", id, document);
            }
            ExampleOutcome::Skipped => {}
        }
    }
    Ok(())
}
