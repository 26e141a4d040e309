//! Asset editing tools.

pub mod bulk_edit;
pub mod normalize_dps;
pub mod variants;

pub use bulk_edit::{BulkEditParams, BulkEditTool};
pub use normalize_dps::{NormalizeDpsParams, NormalizeDpsTool};
pub use variants::{GenerateVariantsParams, GenerateVariantsTool};
