/*
 * Converts token-per-line tagger output back into BC2GM gold mention lines,
 * written to stdout. The predictions are aligned on the sentence file, so a
 * shuffled prediction order is accepted as long as the texts match.
*/
use anyhow::{Context, Result};
use bc2gm::{load_sentences, predictions_to_mentions, write_mentions, ConvertConfig};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Convert token-per-line predictions to BC2GM mention lines")]
struct Args {
    /// Prediction file, first field the token and last field its tag;
    /// `-` reads from stdin
    predictions: PathBuf,
    /// Sentence file the predictions were produced from
    textfile: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let gold = load_sentences(&args.textfile)
        .with_context(|| format!("failed to load sentences from {}", args.textfile.display()))?;
    let config = ConvertConfig::default();
    let mentions = if args.predictions.as_os_str() == "-" {
        predictions_to_mentions(&gold, io::stdin().lock(), &config)
    } else {
        let file = File::open(&args.predictions).with_context(|| {
            format!("failed to open predictions {}", args.predictions.display())
        })?;
        predictions_to_mentions(&gold, BufReader::new(file), &config)
    }
    .context("failed to convert predictions")?;
    write_mentions(&mentions, io::stdout().lock()).context("failed to write mentions")?;
    Ok(())
}
