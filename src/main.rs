//! # docdex CLI
//!
//! The `docdex` binary indexes PDF documents into a per-page sentence index
//! and answers keyword queries against it, alongside a small problem/solution
//! knowledge base.
//!
//! ## Usage
//!
//! ```bash
//! docdex --config ./config/docdex.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docdex add <file.pdf>` | Index a PDF and copy it into the library |
//! | `docdex search <keyword>...` | Search the index and the knowledge base |
//! | `docdex remove <title>` | Drop a title from the index and delete its file |
//! | `docdex titles` | List indexed titles |
//! | `docdex toc <title>` | Print a document's chapter-level table of contents |
//! | `docdex knowledge add` | Append a problem/solution entry |
//!
//! ## Examples
//!
//! ```bash
//! # Index a manual
//! docdex add ./manuals/pump-3000.pdf
//!
//! # Multi-keyword search, restricted to one title
//! docdex search impeller seal --title pump-3000.pdf
//!
//! # Record a field fix
//! docdex knowledge add --name "J. Ortiz" \
//!     --problem "Pump rattles at high RPM" \
//!     --solution "Re-torque the mounting bolts" \
//!     --chapter "4 Maintenance" --page 37
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docdex::config;
use docdex::extract::PdfDocument;
use docdex::ingest;
use docdex::knowledge::{KnowledgeBase, KnowledgeEntry};
use docdex::progress::ProgressMode;
use docdex::search;
use docdex::store::IndexStore;
use docdex::toc;

/// docdex — a per-page sentence index and keyword search engine for PDF
/// manuals.
#[derive(Parser)]
#[command(
    name = "docdex",
    about = "A per-page sentence index and keyword search engine for PDF manuals",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/docdex.toml")]
    config: PathBuf,

    /// Progress reporting on stderr: `off`, `human`, or `json`. Defaults to
    /// `human` when stderr is a terminal.
    #[arg(long, global = true)]
    progress: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Index a PDF document.
    ///
    /// Copies the file into the library directory, builds the per-page
    /// sentence index across a worker pool, and merges it into the store.
    /// A document whose sanitized filename is already indexed is rejected
    /// before any extraction work starts.
    Add {
        /// Path to the PDF file.
        file: PathBuf,
    },

    /// Search the index and the knowledge base.
    ///
    /// Each keyword is matched case-insensitively against every indexed
    /// sentence and both knowledge-base text fields; matched spans are
    /// wrapped in `<em>…</em>` with their original casing.
    Search {
        /// Keywords to match.
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Restrict document matches to a single title.
        #[arg(long)]
        title: Option<String>,
    },

    /// Remove a document from the index and delete its library copy.
    Remove {
        /// Indexed title (the sanitized filename, including `.pdf`).
        title: String,
    },

    /// List indexed titles.
    Titles,

    /// Print a document's chapter-level table of contents.
    Toc {
        /// Indexed title to resolve and inspect.
        title: String,
    },

    /// Manage the knowledge base.
    Knowledge {
        #[command(subcommand)]
        action: KnowledgeAction,
    },
}

/// Knowledge-base subcommands.
#[derive(Subcommand)]
enum KnowledgeAction {
    /// Append a problem/solution entry.
    Add {
        /// Author of the entry.
        #[arg(long)]
        name: String,
        /// Problem description.
        #[arg(long)]
        problem: String,
        /// Solution text.
        #[arg(long)]
        solution: String,
        /// Chapter the problem relates to.
        #[arg(long)]
        chapter: String,
        /// Page within that chapter.
        #[arg(long)]
        page: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let mode = match cli.progress.as_deref() {
        None => ProgressMode::default_for_tty(),
        Some("off") => ProgressMode::Off,
        Some("human") => ProgressMode::Human,
        Some("json") => ProgressMode::Json,
        Some(other) => anyhow::bail!("Unknown progress mode: {}. Use off, human, or json.", other),
    };

    match cli.command {
        Commands::Add { file } => {
            let observer = mode.observer();
            let outcome = ingest::add_document(&cfg, &file, observer.as_ref()).await?;
            println!("indexed {}", outcome.title);
            println!("  pages: {}", outcome.pages);
            println!("  sentences: {}", outcome.sentences);
            if !outcome.failures.is_empty() {
                println!("  failed pages:");
                for failure in &outcome.failures {
                    println!("    page {}: {}", failure.page_number, failure.reason);
                }
            }
        }
        Commands::Search { keywords, title } => {
            let store = IndexStore::open(&cfg.storage.index_path);
            let kb = KnowledgeBase::open(&cfg.storage.knowledge_path);
            let outcome = search::search(&store, &kb, &keywords, title.as_deref())?;

            for m in &outcome.document_matches {
                println!("{} p.{}  [{}]", m.title, m.page_number, m.keyword);
                println!("    {}", m.sentence);
            }
            for m in &outcome.knowledge_matches {
                println!("{} ({})  [{}]", m.name, m.field, m.keyword);
                println!("    {}", m.highlighted);
                println!("    chapter: {}, p.{}", m.chapter, m.chapter_page);
            }
            println!(
                "{} results in {:.3}s",
                outcome.total(),
                outcome.elapsed.as_secs_f64()
            );
        }
        Commands::Remove { title } => {
            let outcome = ingest::remove_document(&cfg, &title)?;
            println!("removed {}", outcome.title);
            if outcome.remaining.is_empty() {
                println!("  index is now empty");
            } else {
                println!("  remaining titles: {}", outcome.remaining.join(", "));
            }
        }
        Commands::Titles => {
            let store = IndexStore::open(&cfg.storage.index_path);
            let titles = store.titles()?;
            if titles.is_empty() {
                println!("No documents indexed.");
            }
            for title in titles {
                println!("{}", title);
            }
        }
        Commands::Toc { title } => {
            let path = ingest::resolve_title(&cfg.storage.library_dir, &title)?;
            let doc = PdfDocument::open(&path)?;
            let entries = toc::extract_toc(&doc)?;
            if entries.is_empty() {
                println!("No chapter entries found.");
            }
            for entry in &entries {
                let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
                println!("{}{}  (p.{})", indent, entry.title, entry.page);
            }
        }
        Commands::Knowledge { action } => match action {
            KnowledgeAction::Add {
                name,
                problem,
                solution,
                chapter,
                page,
            } => {
                let kb = KnowledgeBase::open(&cfg.storage.knowledge_path);
                kb.append(KnowledgeEntry {
                    name,
                    problem_description: problem,
                    solution,
                    chapter,
                    chapter_page: page,
                })?;
                println!("ok");
            }
        },
    }

    Ok(())
}
