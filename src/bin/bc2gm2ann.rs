/*
 * Converts a BC2GM corpus (sentence text file plus gold mention file) into a
 * directory of standoff `.txt`/`.ann` file pairs, one pair per sentence.
*/
use anyhow::{bail, Context, Result};
use bc2gm::{load_corpus, write_standoff_dir};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Convert BC2GM gold data to standoff format")]
struct Args {
    /// Sentence file, one `SENTID TEXT` line per sentence
    textfile: PathBuf,
    /// Gold mention file, one `SENTID|START END|TEXT` line per mention
    annfile: PathBuf,
    /// Existing directory receiving the `.txt`/`.ann` pairs
    outdir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    if !args.outdir.is_dir() {
        bail!("output directory {} does not exist", args.outdir.display());
    }
    let corpus = load_corpus(&args.textfile, &args.annfile)
        .with_context(|| format!("failed to load corpus from {}", args.textfile.display()))?;
    write_standoff_dir(&corpus, &args.outdir)
        .with_context(|| format!("failed to write standoff files to {}", args.outdir.display()))?;
    Ok(())
}
