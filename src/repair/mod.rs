pub mod orchestrator;
pub mod prompt;
pub mod rewriter;

pub use orchestrator::{RepairOrchestrator, RepairOutcome, RepairReport};
pub use rewriter::{CommandRewriter, RewriteError, Rewriter};
