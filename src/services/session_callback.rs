//! 会话回调边界
//!
//! 提交处理器通过这些接口把结果送回扫描会话。所有方法都是"发出即忘"，
//! 处理器不关心返回值。

use crate::models::CompletionReport;

/// 扫描会话的回调接口
pub trait SessionCallback: Send + Sync {
    /// 取消会话
    fn cancel(&self);

    /// 把服务端返回的 scanResultBlob 交给会话，推进到下一步
    fn proceed_to_next_step(&self, scan_result_blob: &str);

    /// 上传进度，范围 [0, 1]
    fn upload_progress(&self, fraction: f64);

    /// 覆盖上传界面的提示文案
    fn upload_message_override(&self, message: &str);

    /// 覆盖成功页面的文案
    fn override_success_message(&self, _message: &str) {}
}

/// 最终结果的接收方，每个处理器实例只调用一次
pub trait CompletionSink: Send + Sync {
    fn on_complete(&self, report: &CompletionReport);
}
