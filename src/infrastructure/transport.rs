//! 传输抽象 - 基础设施层
//!
//! 只描述"发出一个请求，拿到响应或错误"，不关心提交流程。

use super::event_queue::{AttemptId, EventSender, ProcessorEvent};

/// 一个待发送的 POST 请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl SubmissionRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// 一个在途请求的句柄
///
/// `abort` 必须幂等：对已完成、已出错或已中止的句柄调用都是安全的。
pub trait TransportHandle: Send {
    fn abort(&mut self);
}

/// 传输实现
///
/// 每次调用 `send` 都返回一个新的句柄，句柄不会被复用。
pub trait Transport: Send + Sync {
    fn send(&self, request: SubmissionRequest, reactions: TransportReactions) -> Box<dyn TransportHandle>;
}

/// 上传进度上报器
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    attempt: AttemptId,
    events: EventSender,
}

impl ProgressReporter {
    /// 上报已发送字节数，`total` 为 0 时不上报
    pub fn report(&self, loaded: u64, total: u64) {
        if total == 0 {
            return;
        }
        let fraction = (loaded as f64 / total as f64).clamp(0.0, 1.0);
        self.events.post(ProcessorEvent::UploadProgress {
            attempt: self.attempt,
            fraction,
        });
    }
}

/// 一次发送注册的三种回调：进度、完成、错误
///
/// 完成和错误都会消耗 `self`，因此一个句柄只能产生一个终止事件。
#[derive(Debug)]
pub struct TransportReactions {
    attempt: AttemptId,
    events: EventSender,
}

impl TransportReactions {
    pub fn new(attempt: AttemptId, events: EventSender) -> Self {
        Self { attempt, events }
    }

    pub fn progress_reporter(&self) -> ProgressReporter {
        ProgressReporter {
            attempt: self.attempt,
            events: self.events.clone(),
        }
    }

    pub fn complete(self, body: Vec<u8>, status: u16) {
        self.events.post(ProcessorEvent::UploadCompleted {
            attempt: self.attempt,
            body,
            status,
        });
    }

    pub fn fail(self, reason: impl Into<String>) {
        self.events.post(ProcessorEvent::UploadFailed {
            attempt: self.attempt,
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_queue::event_channel;

    #[test]
    fn test_progress_is_normalized_and_zero_total_is_skipped() {
        let (events, mut queue) = event_channel();
        let attempt = AttemptId::default().next();
        let reactions = TransportReactions::new(attempt, events);
        let reporter = reactions.progress_reporter();

        reporter.report(5, 0);
        reporter.report(5, 20);
        reporter.report(30, 20);
        reactions.complete(b"{}".to_vec(), 200);

        assert_eq!(
            queue.try_recv().unwrap(),
            ProcessorEvent::UploadProgress { attempt, fraction: 0.25 }
        );
        assert_eq!(
            queue.try_recv().unwrap(),
            ProcessorEvent::UploadProgress { attempt, fraction: 1.0 }
        );
        assert!(matches!(
            queue.try_recv().unwrap(),
            ProcessorEvent::UploadCompleted { status: 200, .. }
        ));
        assert!(queue.try_recv().is_err());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = SubmissionRequest {
            url: "http://localhost/enrollment-3d".to_string(),
            headers: vec![("X-Device-Key".to_string(), "dev".to_string())],
            body: Vec::new(),
        };
        assert_eq!(request.header("x-device-key"), Some("dev"));
        assert_eq!(request.header("x-user-agent"), None);
    }
}
