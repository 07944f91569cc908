//! Omni Memory: local memory store for AI agents
//!
//! Default mode serves the memory tools as JSON-RPC over stdio. One-shot
//! subcommands run a single tool and print its text.

use clap::Parser;

use omni_memory::cli::{self, Args, EXIT_STORE_ERROR};

fn main() {
    let args = Args::parse();

    let exit_code = match cli::run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_STORE_ERROR
        }
    };
    std::process::exit(exit_code);
}
