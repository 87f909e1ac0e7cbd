pub mod loaders;
pub mod payload;
pub mod report;
pub mod session;

pub use loaders::{load_all_snapshots, load_snapshot_from_toml};
pub use payload::SubmissionPayload;
pub use report::CompletionReport;
pub use session::{SessionResultSnapshot, SessionStatus};
