//! 单个会话驱动器 - 编排层
//!
//! ## 职责
//!
//! 为一个会话创建事件队列和提交处理器，把队列里的事件逐个交给处理器，
//! 直到处理器产出完成报告。
//!
//! 处理器只在这一个任务里被访问，因此不需要任何锁。

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::infrastructure::{event_channel, EventReceiver, Transport};
use crate::models::{CompletionReport, SessionResultSnapshot};
use crate::services::{CompletionSink, EnrollmentIdentifierStore, HeadlessSession};
use crate::workflow::{Collaborators, SubmissionCtx, SubmissionProcessor};

/// 会话驱动器
///
/// 持有所有会话共享的传输和报告接收方，可以 clone 到并发任务里。
#[derive(Clone)]
pub struct SessionRunner {
    config: Config,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn CompletionSink>,
}

impl SessionRunner {
    pub fn new(config: Config, transport: Arc<dyn Transport>, sink: Arc<dyn CompletionSink>) -> Self {
        Self {
            config,
            transport,
            sink,
        }
    }

    /// 提交一个会话的扫描结果并等待收尾
    ///
    /// # 参数
    /// - `snapshot`: 会话快照
    /// - `enrollment`: 本会话使用的注册标识存储
    /// - `session_index`: 会话索引（用于日志）
    ///
    /// # 返回
    /// 处理器产出的完成报告；事件队列意外关闭时返回 None
    pub async fn run(
        &self,
        snapshot: SessionResultSnapshot,
        enrollment: Arc<dyn EnrollmentIdentifierStore>,
        session_index: usize,
    ) -> Option<CompletionReport> {
        let (events, mut queue) = event_channel();
        let ctx = SubmissionCtx::new(session_index, snapshot.session_id.clone());

        let session = Arc::new(HeadlessSession::new(
            ctx.to_string(),
            events.clone(),
            self.config.verbose_logging,
        ));

        let collaborators = Collaborators {
            transport: self.transport.clone(),
            enrollment,
            sink: self.sink.clone(),
        };
        let mut processor = SubmissionProcessor::new(&self.config, collaborators, events, ctx);

        processor.on_scan_produced(snapshot, session);
        drive(&mut processor, &mut queue).await;

        processor.completion_report().cloned()
    }
}

/// 事件循环：一次只处理一个事件，处理器结束后退出
async fn drive(processor: &mut SubmissionProcessor, queue: &mut EventReceiver) {
    while !processor.is_finalized() {
        match queue.recv().await {
            Some(event) => processor.handle_event(event),
            None => {
                warn!("事件队列已关闭，处理器未能结束 (状态 {:?})", processor.phase());
                return;
            }
        }
    }

    debug!("处理器已结束，事件循环退出");
}
