//! Pipeline module — the linear state machine and its orchestrator.
//!
//! * [`PipelineState`] — named phases of a run, logged at each transition.
//! * [`Assistant`] — owns the STT, reply-generation and speech interfaces.
//! * [`run_assistant`] — executes the whole five-stage flow once.
//! * [`RunOutcome`] / [`PipelineError`] — how a run ends.

pub mod runner;
pub mod state;

pub use runner::{run_assistant, Assistant, PipelineError, RunOutcome};
pub use state::PipelineState;
