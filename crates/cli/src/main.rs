use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use offgc_store::ResourceIndex;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "k8s-offline-gc",
    version,
    about = "Print delete directives for objects whose only owner is missing from the given snapshots",
    after_help = "Example:\n  kubectl get secrets -o json >/tmp/secrets.json\n  kubectl get jobs -o json >/tmp/jobs.json\n  k8s-offline-gc /tmp/{secrets,jobs}.json | xargs -0 -I% sh -c 'kubectl %'"
)]
struct Cli {
    /// List snapshots (`kubectl get <kind> -o json`), ingested in order
    files: Vec<PathBuf>,
}

fn init_tracing() {
    let env = std::env::var("OFFGC_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // stdout carries the directive stream
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        warn!("no snapshot files given; nothing to scan");
    }
    let mut index = ResourceIndex::new();
    for path in files {
        // IngestError already names the file
        index.ingest_file(path).context("ingesting snapshot")?;
    }
    info!(files = files.len(), resources = index.len(), "index filled");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for d in offgc_orphans::directives(&index) {
        d.write_to(&mut out).context("writing directive to stdout")?;
    }
    out.flush().context("flushing stdout")?;
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(&cli.files) {
        eprintln!("k8s-offline-gc: {:#}", e);
        std::process::exit(1);
    }
}
