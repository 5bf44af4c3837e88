//! episteme CLI: import knowledge-base dumps and browse the resulting graph.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::Result;

use episteme::config::{GraphConfig, ImportConfig};
use episteme::graph::{Graph, NodeValue};
use episteme::import::{self, ImportStats};

const DEFAULT_DATABASE: &str = "knowledge.redb";

#[derive(Parser)]
#[command(
    name = "episteme",
    version,
    about = "Persistent knowledge graph with YAGO and Wikidata importers"
)]
struct Cli {
    /// TOML file with import settings. Flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import YAGO-style tab-separated facts.
    ImportFacts {
        /// Path to the TSV file.
        source: PathBuf,

        /// Database file to write into.
        #[arg(default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        /// Stop after this many facts.
        #[arg(long)]
        limit: Option<usize>,

        /// Confidence stored with every fact.
        #[arg(long)]
        confidence: Option<f64>,
    },

    /// Import a Wikidata JSON dump (one entity per line).
    ImportEntities {
        /// Path to the dump.
        source: PathBuf,

        /// Database file to write into.
        #[arg(default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        /// Language of imported labels, descriptions and aliases.
        #[arg(long)]
        language: Option<String>,
    },

    /// List distinct subjects.
    Subjects {
        /// Database file to read.
        #[arg(default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        /// Print at most this many subjects.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Find subjects by case-insensitive regex, anchored at the start.
    Search {
        /// Regular expression, e.g. "red.*apple".
        pattern: String,

        /// Database file to read.
        #[arg(default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },

    /// Show everything known about one subject.
    Show {
        /// Subject identifier.
        subject: String,

        /// Database file to read.
        #[arg(default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ImportConfig::load(path)?,
        None => ImportConfig::default(),
    };

    match cli.command {
        Commands::ImportFacts {
            source,
            database,
            limit,
            confidence,
        } => {
            if limit.is_some() {
                config.row_limit = limit;
            }
            if let Some(confidence) = confidence {
                config.default_confidence = confidence;
            }
            let graph = open(&database)?;
            let stats = import::import_facts_file(&source, graph.store(), &config)?;
            report(&source, &database, &stats);
        }

        Commands::ImportEntities {
            source,
            database,
            language,
        } => {
            if let Some(language) = language {
                config.language = language;
            }
            let graph = open(&database)?;
            let stats = import::import_entities_file(&source, graph.store(), &config)?;
            report(&source, &database, &stats);
        }

        Commands::Subjects { database, limit } => {
            let graph = open(&database)?;
            for node in graph.subjects().take(limit.unwrap_or(usize::MAX)) {
                println!("{}", node?);
            }
        }

        Commands::Search { pattern, database } => {
            let graph = open(&database)?;
            let matches = graph.search_subjects_list(&pattern)?;
            if matches.is_empty() {
                println!("No subjects match \"{pattern}\".");
            } else {
                println!("Subjects matching \"{pattern}\" ({}):", matches.len());
                for subject in &matches {
                    println!("  {subject}");
                }
            }
        }

        Commands::Show { subject, database } => {
            let graph = open(&database)?;
            let node = graph.node(&subject)?;
            if !node.is_known()? {
                println!("{node} is not known.");
                return Ok(());
            }

            let info = node.info()?;
            println!("{node}:");
            for (predicate, values) in &info {
                let rendered: Vec<String> = values.iter().map(render).collect();
                println!("  {predicate}: {}", rendered.join(", "));
            }

            let referenced_by = node.referenced_by_list()?;
            if !referenced_by.is_empty() {
                println!("\nReferenced by:");
                for (source, predicate) in &referenced_by {
                    println!("  {source} {predicate}");
                }
            }
        }
    }

    Ok(())
}

fn open(database: &Path) -> Result<Graph> {
    Ok(Graph::open(&GraphConfig::new(database))?)
}

fn render(value: &NodeValue<'_>) -> String {
    match value {
        NodeValue::Literal(text) => format!("\"{text}\""),
        NodeValue::Node(node) => format!("<{node}>"),
    }
}

fn report(source: &Path, database: &Path, stats: &ImportStats) {
    println!(
        "Imported {} triples from {} records of {} into {}",
        stats.triples,
        stats.records,
        source.display(),
        database.display()
    );
    if stats.skipped > 0 {
        println!("Skipped {} of {} lines.", stats.skipped, stats.lines);
    }
}
