pub mod enrollment_store;
pub mod headless_session;
pub mod report_writer;
pub mod response_interpreter;
pub mod session_callback;

pub use enrollment_store::{EnrollmentIdentifierStore, InMemoryEnrollmentStore};
pub use headless_session::HeadlessSession;
pub use report_writer::ReportWriter;
pub use response_interpreter::{interpret, Decision};
pub use session_callback::{CompletionSink, SessionCallback};
