//! Scene and prefab tools.

pub mod prefab_audit;
pub mod refactor;

pub use prefab_audit::{PrefabAuditParams, PrefabAuditTool};
pub use refactor::{SceneRefactorParams, SceneRefactorTool};
