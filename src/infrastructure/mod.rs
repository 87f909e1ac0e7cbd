pub mod event_queue;
pub mod http_transport;
pub mod transport;

pub use event_queue::{event_channel, AttemptId, EventReceiver, EventSender, ProcessorEvent};
pub use http_transport::ReqwestTransport;
pub use transport::{ProgressReporter, SubmissionRequest, Transport, TransportHandle, TransportReactions};
