use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use transport_catalogue::{persistence, prelude::*};

#[derive(Parser)]
#[command(name = "transport-catalogue")]
#[command(about = "Builds a bus network once and answers queries from the saved snapshot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the network and routing table, then save the snapshot
    #[command(alias = "make_base")]
    MakeBase {
        /// Request document, stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Load the snapshot and answer the stat requests
    #[command(alias = "process_requests")]
    ProcessRequests {
        /// Request document, stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Indent the JSON answers
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::MakeBase { input } => make_base(input),
        Commands::ProcessRequests { input, pretty } => process_requests(input, pretty),
    };
    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn read_document(input: Option<PathBuf>) -> Result<Document> {
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin().lock())),
    };
    Document::from_reader(reader).context("Failed to read the request document")
}

fn make_base(input: Option<PathBuf>) -> Result<()> {
    let document = read_document(input)?;
    let path = document.serialization_settings()?.file.clone();
    let routing_settings = document.routing_settings()?;

    info!("Building network...");
    let now = Instant::now();
    let repository = document.build_repository()?;
    let router = TransportRouter::new(&repository, routing_settings)?;
    info!(
        "Building network took {:?} ({} stops, {} buses, {} edges)",
        now.elapsed(),
        repository.stops().len(),
        repository.buses().len(),
        router.routing_graph().graph.edge_count()
    );

    let snapshot = Snapshot {
        repository,
        render_settings: document.render_settings.unwrap_or_default(),
        routing_settings,
        router,
    };
    persistence::save(&path, &snapshot)
        .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    info!("Saved snapshot to {}", path.display());
    Ok(())
}

fn process_requests(input: Option<PathBuf>, pretty: bool) -> Result<()> {
    let document = read_document(input)?;
    let path = &document.serialization_settings()?.file;

    info!("Loading snapshot...");
    let now = Instant::now();
    let snapshot = persistence::load(path)
        .with_context(|| format!("Failed to load snapshot from {}", path.display()))?;
    info!("Loading snapshot took {:?}", now.elapsed());

    let handler = RequestHandler::new(&snapshot.repository, &snapshot.router);
    let responses = handler.handle_all(&document.stat_requests);

    let mut out = BufWriter::new(io::stdout().lock());
    if pretty {
        serde_json::to_writer_pretty(&mut out, &responses)?;
    } else {
        serde_json::to_writer(&mut out, &responses)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_spellings() {
        for name in ["make-base", "make_base"] {
            let cli = Cli::try_parse_from(["transport-catalogue", name]).unwrap();
            assert!(matches!(cli.command, Commands::MakeBase { input: None }));
        }
        for name in ["process-requests", "process_requests"] {
            let cli = Cli::try_parse_from(["transport-catalogue", name, "--pretty"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::ProcessRequests {
                    input: None,
                    pretty: true
                }
            ));
        }
        assert!(Cli::try_parse_from(["transport-catalogue", "make"]).is_err());
    }
}
