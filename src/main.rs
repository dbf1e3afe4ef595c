use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use molhilite::config::EngineConfig;
use molhilite::document::TableDocument;
use molhilite::highlight::DefaultEngine;
use molhilite::source::FsSource;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Highlight structures of a chemical table document and print them as JSON",
    long_about = None
)]
struct Cli {
    /// Table document (JSON)
    #[arg(value_name = "TABLE_FILE")]
    table_file: Utf8PathBuf,

    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<Utf8PathBuf>,

    /// Only print structures of this row id
    #[arg(long)]
    row: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut source = FsSource;
    let config = match &cli.config {
        Some(path) => EngineConfig::load(&mut source, path)?,
        None => EngineConfig::default(),
    };
    let doc = TableDocument::load(&mut source, &cli.table_file)?;

    let mut engine = DefaultEngine::with_config(config);
    doc.apply(&mut engine)
        .with_context(|| format!("Failed to set up highlighting for {}", cli.table_file))?;
    let mut colored = doc.colorize_all(&engine)?;
    if let Some(id) = cli.row {
        colored.retain(|c| c.row == id);
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&colored)?
    } else {
        serde_json::to_string(&colored)?
    };
    println!("{}", json);
    Ok(())
}
