pub mod filter;
pub mod plan;

pub use filter::FilterGraph;
pub use plan::{keep_segments, plan_deletions, DeletePlan, DeletionBuffers};
