//! One-shot command dispatch
//!
//! Each command builds the same typed request the tool server would
//! deserialize and runs it through the same handler, so output is identical
//! to what a client sees in a `tools/call` result.

use omni_memory_store::{MemoryDb, StoragePaths};

use crate::cli::{Command, Scope};
use crate::tools::{
    self, add::AddRequest, get::IdRequest, list::ListRequest, search::SearchArgs,
    update::UpdateRequest, ToolResponse,
};

/// Run a store command and return the rendered response
///
/// `Serve` and `Paths` do not touch the store through tools and are
/// handled by the caller; passing them here reports an error response.
pub fn run_command(db: &MemoryDb, command: Command) -> ToolResponse {
    match command {
        Command::Add {
            content,
            area,
            project,
            tags,
        } => tools::add::handle(
            db,
            AddRequest {
                content,
                area,
                project,
                tags: if tags.is_empty() { None } else { Some(tags) },
            },
        ),
        Command::Get { id } => tools::get::handle(db, IdRequest { id }),
        Command::Update {
            id,
            content,
            area,
            project,
            clear_project,
            tags,
            clear_tags,
        } => tools::update::handle(
            db,
            UpdateRequest {
                id,
                content,
                area,
                project: if clear_project {
                    Some(None)
                } else {
                    project.map(Some)
                },
                tags: if clear_tags {
                    Some(Vec::new())
                } else if tags.is_empty() {
                    None
                } else {
                    Some(tags)
                },
            },
        ),
        Command::Delete { id } => tools::delete::handle(db, IdRequest { id }),
        Command::List { scope, tag, limit } => {
            let Scope { area, project } = scope;
            tools::list::handle(
                db,
                ListRequest {
                    area,
                    project,
                    tag,
                    limit: limit.map(|n| n as usize),
                },
            )
        }
        Command::Search {
            query,
            scope,
            limit,
            advanced,
        } => {
            let Scope { area, project } = scope;
            tools::search::handle(
                db,
                SearchArgs {
                    query,
                    area,
                    project,
                    limit: limit.map(|n| n as usize),
                    enable_advanced_syntax: advanced,
                },
            )
        }
        Command::Stats => tools::stats::handle(db),
        Command::Serve | Command::Paths => {
            ToolResponse::error("serve and paths are not store commands")
        }
    }
}

/// Text printed by `paths`
pub fn render_paths(paths: &StoragePaths) -> String {
    format!(
        "Data directory: {}\nDatabase: {}",
        paths.data_dir.display(),
        paths.db
    )
}
