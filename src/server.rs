//! Line-delimited JSON-RPC 2.0 tool server over stdio
//!
//! One request per line on the reader, one response per line on the writer.
//! Requests without an `id` are notifications and get no response. Logging
//! never touches the writer.

use anyhow::{Context, Result};
use omni_memory_store::MemoryDb;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

use crate::tools::{self, ToolError};

pub const SERVER_NAME: &str = "omni-memory";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Tool server owning the store handle for its lifetime
pub struct MemoryServer {
    db: MemoryDb,
}

impl MemoryServer {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }

    /// Serve until the reader reaches EOF, then close the store
    pub fn run<R: BufRead, W: Write>(self, mut reader: R, mut writer: W) -> Result<()> {
        info!(location = %self.db.location(), "Serving on stdio");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .context("Failed to read request line")?;
            if read == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line),
                Err(e) => {
                    warn!(error = %e, "Request line is not valid UTF-8");
                    Some(error_response(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {e}"),
                    ))
                }
            };
            if let Some(response) = response {
                serde_json::to_writer(&mut writer, &response)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }

        info!("Input closed, shutting down");
        self.db.close()?;
        Ok(())
    }

    /// Handle one input line; `None` for blank lines and notifications
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable request");
                return Some(error_response(Value::Null, PARSE_ERROR, format!("Parse error: {e}")));
            }
        };

        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                ))
            }
        };

        let id = match request.id {
            Some(id) if !id.is_null() => id,
            _ => {
                debug!(method = %request.method, "Notification ignored");
                return None;
            }
        };

        let params = request.params.unwrap_or(Value::Null);
        Some(match self.dispatch(&request.method, params) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => error_response(id, code, message),
        })
    }

    fn dispatch(&self, method: &str, params: Value) -> std::result::Result<Value, (i64, String)> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "ping" => Ok(json!({})),
            "tools/list" => {
                let tools: Vec<Value> = tools::memory_tools()
                    .iter()
                    .map(|t| t.to_listing())
                    .collect();
                Ok(json!({ "tools": tools }))
            }
            "tools/call" => {
                let call: CallParams = serde_json::from_value(params)
                    .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {e}")))?;
                tools::call_tool(&self.db, &call.name, call.arguments)
                    .map(|response| response.to_call_result())
                    .map_err(|e: ToolError| (INVALID_PARAMS, e.to_string()))
            }
            other => Err((METHOD_NOT_FOUND, format!("Unknown method: {other}"))),
        }
    }
}

fn error_response(id: Value, code: i64, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}
