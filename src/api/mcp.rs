//! MCP JSON-RPC transport over HTTP / MCP JSON-RPC 传输层
//!
//! Implements the subset of the Model Context Protocol the rules tools
//! need: initialize, ping, tools/list, tools/call. Protocol failures use
//! JSON-RPC error codes; tool failures come back as tool results with
//! isError=true so clients can show them to the model.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::tools;
use crate::state::AppState;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
struct FileArgs {
    file: String,
}

#[derive(Debug, Deserialize)]
struct ContextArgs {
    languages: Vec<String>,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LearningPathArgs {
    languages: Vec<String>,
    #[serde(default)]
    phase: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct ListArgs {
    #[serde(default)]
    category: Option<String>,
}

/// POST /mcp - 处理一条 MCP 消息
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Value>,
) -> impl IntoResponse {
    match handle_message(&state, message).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        // Notifications get no reply body / 通知无响应体
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Dispatch one JSON-RPC message; None for notifications / 分发一条 JSON-RPC 消息
pub async fn handle_message(state: &AppState, message: Value) -> Option<Value> {
    let id = message.get("id").cloned().unwrap_or(Value::Null);
    let method = message
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = message.get("params").cloned().unwrap_or(Value::Null);

    if method.is_empty() {
        return Some(error_response(id, INVALID_REQUEST, "missing method"));
    }

    // Requests without an id are notifications / 无 id 即为通知
    if id.is_null() {
        if method == "notifications/initialized" {
            tracing::debug!("MCP client initialized");
        }
        return None;
    }

    let reply = match method.as_str() {
        "initialize" => success_response(id, initialize_result()),
        "ping" => success_response(id, json!({})),
        "tools/list" => success_response(id, json!({ "tools": tool_catalogue() })),
        "tools/call" => call_tool(state, id, params).await,
        _ => error_response(
            id,
            METHOD_NOT_FOUND,
            &format!("method not found: {}", method),
        ),
    };
    Some(reply)
}

enum ToolDispatchError {
    UnknownTool(String),
    BadArguments(serde_json::Error),
    Failed(anyhow::Error),
}

/// Handle tools/call / 处理工具调用
async fn call_tool(state: &AppState, id: Value, params: Value) -> Value {
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(call) => call,
        Err(e) => return error_response(id, INVALID_PARAMS, &format!("invalid params: {}", e)),
    };

    match dispatch_tool(state, &call.name, call.arguments).await {
        Ok(text) => success_response(id, tool_result(&text, false)),
        Err(ToolDispatchError::UnknownTool(name)) => {
            error_response(id, INVALID_PARAMS, &format!("unknown tool: {}", name))
        }
        Err(ToolDispatchError::BadArguments(e)) => {
            error_response(id, INVALID_PARAMS, &format!("invalid arguments: {}", e))
        }
        // Tool-level failures are results, not protocol errors / 工具级失败作为结果返回
        Err(ToolDispatchError::Failed(e)) => {
            success_response(id, tool_result(&format!("{:#}", e), true))
        }
    }
}

/// Route a tool call to its implementation / 将工具调用路由到实现
async fn dispatch_tool(
    state: &AppState,
    name: &str,
    args: Value,
) -> Result<String, ToolDispatchError> {
    use ToolDispatchError::*;

    // Absent arguments arrive as null; treat them as an empty object / 缺省参数按空对象处理
    let args = if args.is_null() { json!({}) } else { args };

    let text = match name {
        "help" => tools::help(state).await.map_err(Failed)?,
        "search_rules" => {
            let a: SearchArgs = serde_json::from_value(args).map_err(BadArguments)?;
            let limit = usize::try_from(a.limit).unwrap_or(0);
            tools::search_rules(state, &a.query, a.category.as_deref(), limit)
                .await
                .map_err(Failed)?
        }
        "get_rule" => {
            let a: FileArgs = serde_json::from_value(args).map_err(BadArguments)?;
            tools::get_rule(state, &a.file).await.map_err(Failed)?
        }
        "get_context" => {
            let a: ContextArgs = serde_json::from_value(args).map_err(BadArguments)?;
            tools::get_context(state, &a.languages, &a.topics)
                .await
                .map_err(Failed)?
        }
        "get_learning_path" => {
            let a: LearningPathArgs = serde_json::from_value(args).map_err(BadArguments)?;
            // Negative phases collapse to 0 and fail range validation / 负数阶段归零后走范围校验
            let phase = a.phase.map(|p| usize::try_from(p).unwrap_or(0));
            tools::get_learning_path(state, &a.languages, phase)
                .await
                .map_err(Failed)?
        }
        "get_related" => {
            let a: FileArgs = serde_json::from_value(args).map_err(BadArguments)?;
            tools::get_related(state, &a.file).await.map_err(Failed)?
        }
        "list_rules" => {
            let a: ListArgs = serde_json::from_value(args).map_err(BadArguments)?;
            tools::list_rules(state, a.category.as_deref())
                .await
                .map_err(Failed)?
        }
        other => return Err(UnknownTool(other.to_string())),
    };
    Ok(text)
}

fn tool_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

fn success_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": "rules", "version": env!("CARGO_PKG_VERSION") },
        "instructions": "AI coding rules lookup — Python, JS, CSS, C++, Rust, Kotlin standards. Call help() to get started.",
    })
}

/// Tool catalogue advertised by tools/list / tools/list 公布的工具目录
fn tool_catalogue() -> Vec<Value> {
    let category_hint = "Filter by category (python, js, css, cpp, rust, kotlin, global, \
                         project-files, automation, devops, ipc, platform-ux)";
    vec![
        json!({
            "name": "help",
            "description": "Get started with the Rules MCP server. Shows available tools, categories, and quick start examples.",
            "inputSchema": { "type": "object", "properties": {} },
        }),
        json!({
            "name": "search_rules",
            "description": "Search rules by keyword. Matches tags, concepts, keywords, title.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search terms (e.g. \"ownership threading types\")" },
                    "category": { "type": "string", "description": category_hint },
                    "limit": { "type": "integer", "description": "Max results (default 10)" },
                },
                "required": ["query"],
            },
        }),
        json!({
            "name": "get_rule",
            "description": "Get full markdown content of a specific rule file.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "file": { "type": "string", "description": "Path relative to repo root (e.g. \"python/types.md\")" },
                },
                "required": ["file"],
            },
        }),
        json!({
            "name": "get_context",
            "description": "Get combined rules context for given languages and topics.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "languages": { "type": "array", "items": { "type": "string" }, "description": "Language categories (e.g. [\"python\", \"js\"])" },
                    "topics": { "type": "array", "items": { "type": "string" }, "description": "Optional concept filter (e.g. [\"types\", \"testing\"])" },
                },
                "required": ["languages"],
            },
        }),
        json!({
            "name": "get_learning_path",
            "description": "Get rules in implementation order — foundational first, dependent later. Phase 1 = read first, phase 2 = read next, etc.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "languages": { "type": "array", "items": { "type": "string" }, "description": "Language categories (e.g. [\"python\", \"js\"])" },
                    "phase": { "type": "integer", "description": "Optional 1-based phase number. Omit for full path overview." },
                },
                "required": ["languages"],
            },
        }),
        json!({
            "name": "get_related",
            "description": "Get related rules by following graph edges from a specific rule file. Shows requires, required_by, feeds, fed_by, and related edges.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "file": { "type": "string", "description": "Path relative to repo root (e.g. \"python/types.md\")" },
                },
                "required": ["file"],
            },
        }),
        json!({
            "name": "list_rules",
            "description": "List available rule files, optionally filtered by category.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "category": { "type": "string", "description": category_hint },
                },
            },
        }),
    ]
}
