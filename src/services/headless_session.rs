//! 无界面会话 - 业务能力层
//!
//! 在没有采集界面的环境里扮演扫描会话：把回调写进日志，
//! 在收到继续或取消信号后投递"会话已结束"事件。

use tracing::{debug, info, warn};

use crate::infrastructure::{EventSender, ProcessorEvent};
use crate::services::session_callback::SessionCallback;
use crate::utils::logging::truncate_text;

/// 无界面会话
///
/// 收到 scanResultBlob 即视为会话完整走完；取消则视为未完成。
pub struct HeadlessSession {
    label: String,
    events: EventSender,
    verbose_logging: bool,
}

impl HeadlessSession {
    pub fn new(label: impl Into<String>, events: EventSender, verbose_logging: bool) -> Self {
        Self {
            label: label.into(),
            events,
            verbose_logging,
        }
    }
}

impl SessionCallback for HeadlessSession {
    fn cancel(&self) {
        warn!("{} 会话已取消", self.label);
        self.events.post(ProcessorEvent::SessionFullyDone {
            is_completely_done: false,
        });
    }

    fn proceed_to_next_step(&self, scan_result_blob: &str) {
        info!(
            "{} ➡️ 继续下一步, scanResultBlob: {}",
            self.label,
            truncate_text(scan_result_blob, 32)
        );
        self.events.post(ProcessorEvent::SessionFullyDone {
            is_completely_done: true,
        });
    }

    fn upload_progress(&self, fraction: f64) {
        if self.verbose_logging {
            info!("{} 上传进度: {:.0}%", self.label, fraction * 100.0);
        } else {
            debug!("{} 上传进度: {:.0}%", self.label, fraction * 100.0);
        }
    }

    fn upload_message_override(&self, message: &str) {
        info!("{} 💬 {}", self.label, message);
    }

    fn override_success_message(&self, message: &str) {
        debug!("{} 成功页文案: {}", self.label, message.replace('\n', " / "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_channel;

    #[test]
    fn test_advance_and_cancel_post_session_done() {
        let (events, mut queue) = event_channel();
        let session = HeadlessSession::new("[会话 1]", events, false);

        session.upload_progress(0.5);
        session.proceed_to_next_step("T1");
        session.cancel();

        assert_eq!(
            queue.try_recv().unwrap(),
            ProcessorEvent::SessionFullyDone {
                is_completely_done: true
            }
        );
        assert_eq!(
            queue.try_recv().unwrap(),
            ProcessorEvent::SessionFullyDone {
                is_completely_done: false
            }
        );
        assert!(queue.try_recv().is_err());
    }
}
