//! JSON Reference CLI
//!
//! Command-line interface for resolving `$ref` cross-references in JSON documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use json_ref_resolver::{load_document, parse_uri, resolve_uri, ResolveError, Resolver};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "json-ref")]
#[command(about = "Resolve $ref cross-references in JSON documents")]
#[command(version)]
struct Cli {
    /// Log registration and substitution steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace every $ref in a document with the node it points to
    Resolve {
        /// Document to resolve
        document: PathBuf,

        /// Register another document: FILE (uses its $id) or FILE=URI
        #[arg(long = "with", value_name = "FILE[=URI]")]
        documents: Vec<String>,

        /// Base URI of the document (default: its $id)
        #[arg(long)]
        uri: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the node a URI points to within the registered documents
    Get {
        /// URI with optional fragment, e.g. http://example.com/a.json#/definitions/b
        uri: String,

        /// Register a document: FILE (uses its $id) or FILE=URI
        #[arg(long = "with", value_name = "FILE[=URI]", required = true)]
        documents: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Resolve a URI against an optional base and print its normalized form
    Normalize {
        /// URI reference to normalize
        uri: String,

        /// Base URI for relative references
        #[arg(long)]
        base: Option<String>,

        /// Print the components of the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Resolve {
            document,
            documents,
            uri,
            output,
            pretty,
        } => run_resolve(&document, &documents, uri.as_deref(), output, pretty),

        Commands::Get {
            uri,
            documents,
            pretty,
        } => run_get(&uri, &documents, pretty),

        Commands::Normalize { uri, base, json } => run_normalize(&uri, base.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_resolve(
    document_path: &Path,
    documents: &[String],
    uri: Option<&str>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let resolver = build_resolver(documents)?;
    let document = load_document(document_path).map_err(report)?;

    let resolved = resolver.resolve(&document, uri).map_err(report)?;
    write_json(&resolved, pretty, output.as_deref())
}

fn run_get(uri: &str, documents: &[String], pretty: bool) -> Result<(), u8> {
    let resolver = build_resolver(documents)?;
    let found = resolver.get(uri, None).map_err(report)?;
    write_json(found, pretty, None)
}

fn run_normalize(uri: &str, base: Option<&str>, json: bool) -> Result<(), u8> {
    let normalized = resolve_uri(uri, base).map_err(report)?;

    if json {
        let parts = parse_uri(&normalized).map_err(report)?;
        let rendered = serde_json::to_string(&parts).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        println!("{}", normalized);
    }
    Ok(())
}

/// Register every `FILE` or `FILE=URI` argument on a fresh resolver.
fn build_resolver(documents: &[String]) -> Result<Resolver, u8> {
    let mut resolver = Resolver::new();
    for entry in documents {
        let (path, uri) = match entry.split_once('=') {
            Some((path, uri)) => (path, Some(uri)),
            None => (entry.as_str(), None),
        };
        tracing::debug!(path, uri = ?uri, "loading document");

        let document = load_document(Path::new(path)).map_err(report)?;
        resolver.add(&document, uri).map_err(|e| {
            eprintln!("Error registering {}: {}", path, e);
            e.exit_code() as u8
        })?;
    }
    Ok(resolver)
}

fn write_json<T: Serialize>(value: &T, pretty: bool, output: Option<&Path>) -> Result<(), u8> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn report(error: ResolveError) -> u8 {
    eprintln!("Error: {}", error);
    error.exit_code() as u8
}
