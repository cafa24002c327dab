pub mod agents;
pub mod cache;
pub mod classify;
pub mod dedup;
pub mod pipeline;
pub mod routing;
pub mod scoring;
pub mod state;
pub mod streaming;
pub mod vcs;

pub use pipeline::{Pipeline, PipelineSettings};
pub use state::{ChangeType, ReviewInput, ReviewState, ReviewSummary, Verdict};
pub use streaming::ReviewEvent;
