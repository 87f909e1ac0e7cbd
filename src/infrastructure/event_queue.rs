//! 事件队列 - 基础设施层
//!
//! 处理器的所有输入（上传进度、完成、错误、提示计时器、会话收尾）
//! 都作为离散事件投递到同一个队列，由唯一的驱动任务逐个处理。

use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

/// 一次提交尝试的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 投递给提交处理器的事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorEvent {
    /// 上传进度，`fraction` 在 [0, 1] 之间
    UploadProgress { attempt: AttemptId, fraction: f64 },
    /// 收到响应（任何 HTTP 状态码都算完成）
    UploadCompleted {
        attempt: AttemptId,
        body: Vec<u8>,
        status: u16,
    },
    /// 连接层面的失败
    UploadFailed { attempt: AttemptId, reason: String },
    /// 上传耗时提示计时器到期
    StallTimerFired { attempt: AttemptId },
    /// 会话方在收到继续/取消信号后已经完全结束
    SessionFullyDone { is_completely_done: bool },
}

/// 事件发送端，可以随意 clone
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ProcessorEvent>,
}

impl EventSender {
    /// 投递事件；处理器已经被丢弃时返回 false
    pub fn post(&self, event: ProcessorEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!("事件队列已关闭，丢弃事件: {:?}", event);
                false
            }
        }
    }
}

/// 事件接收端
pub type EventReceiver = mpsc::UnboundedReceiver<ProcessorEvent>;

/// 创建一条新的事件队列
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_ids_increase() {
        let first = AttemptId::default().next();
        assert_eq!(first, AttemptId(1));
        assert!(first.next() > first);
        assert_eq!(first.to_string(), "#1");
    }

    #[test]
    fn test_post_after_receiver_dropped_returns_false() {
        let (sender, receiver) = event_channel();
        drop(receiver);
        assert!(!sender.post(ProcessorEvent::SessionFullyDone {
            is_completely_done: false
        }));
    }
}
