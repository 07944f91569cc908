//! Omni Memory: tool layer over the memory store
//!
//! This library wires `omni-memory-store` to agent clients: typed tool
//! requests and rendering, a JSON-RPC stdio server and a CLI.

pub mod cli;
pub mod logging;
pub mod server;
pub mod tools;

pub use server::MemoryServer;
pub use tools::{call_tool, memory_tools, ToolError, ToolMetadata, ToolResponse};
