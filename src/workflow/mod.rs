pub mod cancellation_guard;
pub mod state;
pub mod submission_ctx;
pub mod submission_processor;

pub use cancellation_guard::CancellationGuard;
pub use state::{ProcessorPhase, ProcessorState};
pub use submission_ctx::SubmissionCtx;
pub use submission_processor::{session_user_agent, Collaborators, SubmissionProcessor};
