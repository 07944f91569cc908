//! CLI argument parsing
//!
//! ```text
//! omni-memory [--dir <path>] [--db <path|:memory:>] [--log-json] [command]
//!
//! COMMANDS:
//!   serve     JSON-RPC tool server on stdio (default)
//!   add       Store a memory
//!   get       Show one memory
//!   update    Change fields of a memory
//!   delete    Remove a memory
//!   list      List memories, newest first
//!   search    Full-text search
//!   stats     Totals by area and project
//!   paths     Print the resolved storage locations
//! ```

use clap::{Args as ClapArgs, Parser, Subcommand};
use omni_memory_store::Area;

/// Parsed CLI arguments
#[derive(Debug, Parser)]
#[command(name = "omni-memory", version, about = "Local memory store for AI agents")]
pub struct Args {
    /// Storage directory (overrides OMNI_MEMORY_DIR)
    #[arg(long, global = true)]
    pub dir: Option<String>,

    /// Storage file, or :memory: (overrides OMNI_MEMORY_DB)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// Command to run; `serve` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Serve tools over stdio
    Serve,

    /// Store a memory
    Add {
        content: String,
        #[arg(long)]
        area: Option<Area>,
        #[arg(long)]
        project: Option<String>,
        /// Repeat for several tags
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Show one memory
    Get { id: String },

    /// Change fields of a memory
    Update {
        id: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        area: Option<Area>,
        #[arg(long, conflicts_with = "clear_project")]
        project: Option<String>,
        /// Remove the project
        #[arg(long)]
        clear_project: bool,
        /// Replaces all tags; repeat for several
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long)]
        clear_tags: bool,
    },

    /// Remove a memory
    Delete { id: String },

    /// List memories, newest first
    List {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=100))]
        limit: Option<u64>,
    },

    /// Full-text search
    Search {
        query: String,
        #[command(flatten)]
        scope: Scope,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=50))]
        limit: Option<u64>,
        /// Pass the query to FTS5 unmodified
        #[arg(long)]
        advanced: bool,
    },

    /// Totals by area and project
    Stats,

    /// Print the resolved storage locations
    Paths,
}

/// Area / project filters shared by list and search
#[derive(Debug, Clone, Default, PartialEq, ClapArgs)]
pub struct Scope {
    #[arg(long)]
    pub area: Option<Area>,
    #[arg(long)]
    pub project: Option<String>,
}
