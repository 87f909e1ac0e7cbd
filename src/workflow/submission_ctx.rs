//! 提交上下文
//!
//! 封装"我正在处理哪一个会话"这一信息

use std::fmt::Display;

/// 提交上下文
#[derive(Debug, Clone, Default)]
pub struct SubmissionCtx {
    /// 会话索引（仅用于日志显示）
    pub session_index: usize,

    /// 会话 ID
    pub session_id: String,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(session_index: usize, session_id: impl Into<String>) -> Self {
        Self {
            session_index,
            session_id: session_id.into(),
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.session_id.is_empty() {
            write!(f, "[会话 {}]", self.session_index)
        } else {
            write!(f, "[会话 {} ID#{}]", self.session_index, self.session_id)
        }
    }
}
