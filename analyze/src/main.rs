use anyhow::{Context, Result};
use clap::Parser;
use omics::*;
use serde::Deserialize;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uniprot::Index;

/// Input and output tables are tab separated
const DELIMITER: u8 = b'\t';

/// Link bulk RNA-seq abundances with SILAC protein abundances
#[derive(Parser, Debug)]
#[command(name = "analyze", version)]
struct Args {
    /// Pipeline configuration (TOML)
    config: PathBuf,

    /// Take a random subsample of the RNA table (development runs)
    #[arg(short, long)]
    sample: Option<usize>,

    /// Seed for --sample, for reproducible subsamples
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct Inputs {
    rna: PathBuf,
    protein: PathBuf,
    /// accession,UniProt ID,gene name dump
    xref: PathBuf,
}

#[derive(Deserialize, Debug)]
struct Outputs {
    rna: PathBuf,
    protein: PathBuf,
    combined: PathBuf,
    /// Accessions and IDs that could not be linked, and why
    unresolved: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
struct Config {
    input: Inputs,
    output: Outputs,
    #[serde(flatten)]
    domain: DomainConfig,
}

fn load_config(args: &Args) -> Result<Config> {
    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read {}", args.config.display()))?;
    let mut config: Config = toml::from_str(&text)
        .with_context(|| format!("failed to parse {}", args.config.display()))?;

    if args.sample.is_some() {
        config.domain.rna.sample = args.sample;
    }
    if args.seed.is_some() {
        config.domain.rna.seed = args.seed;
    }
    Ok(config)
}

/// Read and clean one measurement table
fn prepare<P: AsRef<Path>>(path: P, cfg: &TableConfig) -> Result<CleanedTable> {
    let raw = Table::load(path.as_ref(), DELIMITER)
        .with_context(|| format!("failed to load {}", path.as_ref().display()))?;
    clean(raw, cfg).with_context(|| format!("failed to clean {}", path.as_ref().display()))
}

fn save<P: AsRef<Path>>(table: Table, path: P) -> Result<()> {
    table
        .save(path.as_ref(), DELIMITER)
        .with_context(|| format!("failed to write {}", path.as_ref().display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let domain = &config.domain;

    let rna = prepare(&config.input.rna, &domain.rna)?;
    let (rna, _) = domain.search.filter().apply(rna)?;
    let protein = prepare(&config.input.protein, &domain.protein)?;

    let index = Index::load(&config.input.xref, domain.link.duplicate_policy())
        .with_context(|| format!("failed to load {}", config.input.xref.display()))?;

    let combined = link(&rna, &protein, &index, &domain.link)?;

    save(rna.to_table()?, &config.output.rna)?;
    save(protein.to_table()?, &config.output.protein)?;
    save(combined.to_table(&domain.link)?, &config.output.combined)?;

    if let Some(path) = &config.output.unresolved {
        let f = fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        combined.report.write(BufWriter::new(f))?;
        info!("wrote unresolved identifiers to {}", path.display());
    }

    info!(
        "{} RNA rows, {} protein rows, {} combined records",
        rna.len(),
        protein.len(),
        combined.len()
    );
    Ok(())
}
