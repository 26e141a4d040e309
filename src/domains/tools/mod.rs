//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are named, schema-validated operations invoked by editor plugins.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `schema.rs` - Typed argument records and the shared output shapes
//! - `handlers.rs` - Handler trait and the shared result builder
//! - `registry.rs` - Central tool registry (built once, read-only)
//! - `dispatch.rs` - Validation, invocation, and response normalization
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with a params record implementing
//!    `ToolArguments`, an `execute()` function, and a `spec()` constructor
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::builtin`

pub mod definitions;
mod dispatch;
mod error;
mod handlers;
mod registry;
pub mod schema;

pub use dispatch::Dispatcher;
pub use error::ToolError;
pub use handlers::{
    DeterministicHandler, MAX_DETAIL_LINES, ToolHandler, build_result, build_result_at,
    dry_run_status,
};
pub use registry::{ToolRegistry, ToolSpec};
pub use schema::{AuditResult, CallStatus, OutboundCallResult, ValidationError};
