use std::fmt;

use crate::infrastructure::{AttemptId, TransportHandle};

/// 处理器状态
///
/// 上传中和等待决定时持有唯一的在途请求句柄。
pub enum ProcessorState {
    Idle,
    Uploading {
        attempt: AttemptId,
        handle: Box<dyn TransportHandle>,
    },
    AwaitingDecision {
        attempt: AttemptId,
        handle: Box<dyn TransportHandle>,
    },
    Cancelling,
    Finalized,
}

/// 不带句柄的状态标签，用于查询和日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorPhase {
    Idle,
    Uploading,
    AwaitingDecision,
    Cancelling,
    Finalized,
}

impl ProcessorState {
    pub fn phase(&self) -> ProcessorPhase {
        match self {
            ProcessorState::Idle => ProcessorPhase::Idle,
            ProcessorState::Uploading { .. } => ProcessorPhase::Uploading,
            ProcessorState::AwaitingDecision { .. } => ProcessorPhase::AwaitingDecision,
            ProcessorState::Cancelling => ProcessorPhase::Cancelling,
            ProcessorState::Finalized => ProcessorPhase::Finalized,
        }
    }

    /// 是否正在上传指定的尝试
    pub fn is_uploading(&self, attempt: AttemptId) -> bool {
        matches!(self, ProcessorState::Uploading { attempt: current, .. } if *current == attempt)
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, ProcessorState::Finalized)
    }
}

impl fmt::Debug for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorState::Uploading { attempt, .. } | ProcessorState::AwaitingDecision { attempt, .. } => {
                write!(f, "{:?}({})", self.phase(), attempt)
            }
            _ => write!(f, "{:?}", self.phase()),
        }
    }
}
