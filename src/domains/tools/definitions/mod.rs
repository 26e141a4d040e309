//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod assets;
pub mod scene;
pub mod xai;

pub use assets::{
    BulkEditParams, BulkEditTool, GenerateVariantsParams, GenerateVariantsTool,
    NormalizeDpsParams, NormalizeDpsTool,
};
pub use scene::{PrefabAuditParams, PrefabAuditTool, SceneRefactorParams, SceneRefactorTool};
pub use xai::{XaiCallParams, XaiCallTool};
