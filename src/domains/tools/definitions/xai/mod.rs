//! xAI API tools.

pub mod call;

pub use call::{XaiCallParams, XaiCallTool};
