//! 扫描提交处理器 - 流程层
//!
//! 核心职责：把一次人脸扫描结果提交给验证服务，并保证整个过程只走到一次终态
//!
//! 流程顺序：
//! 1. 会话未完成 → 直接取消，不发请求
//! 2. 构建请求体 → 上传（进度 / 完成 / 错误）→ 启动耗时提示计时器
//! 3. 解释响应 → 继续下一步 或 取消
//! 4. 会话结束 → 产出唯一的完成报告
//!
//! 所有输入都以事件的形式由驱动方逐个送入 `handle_event`，
//! 处理器本身不加锁，也不会被并发重入。

use serde_json::Value as JsonValue;
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::SubmissionFailure;
use crate::infrastructure::{
    AttemptId, EventSender, ProcessorEvent, SubmissionRequest, Transport, TransportReactions,
};
use crate::models::{CompletionReport, SessionResultSnapshot, SubmissionPayload};
use crate::services::{
    interpret, CompletionSink, Decision, EnrollmentIdentifierStore, SessionCallback,
};
use crate::workflow::cancellation_guard::CancellationGuard;
use crate::workflow::state::{ProcessorPhase, ProcessorState};
use crate::workflow::submission_ctx::SubmissionCtx;

/// 处理器依赖的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub enrollment: Arc<dyn EnrollmentIdentifierStore>,
    pub sink: Arc<dyn CompletionSink>,
}

/// 生成每个会话独有的 User-Agent
pub fn session_user_agent(device_key: &str, session_id: &str) -> String {
    format!(
        "face-scan-submit/{}|{}|{}",
        env!("CARGO_PKG_VERSION"),
        device_key,
        session_id
    )
}

/// 扫描提交处理器
///
/// - 每个实例只处理一个会话，同一时刻最多一个在途请求
/// - 取消回调最多调用一次
/// - 完成报告只产出一次
pub struct SubmissionProcessor {
    ctx: SubmissionCtx,
    collaborators: Collaborators,
    events: EventSender,

    enrollment_url: String,
    device_key: String,
    stall_delay: Duration,
    stall_message: String,
    success_message: Option<String>,

    state: ProcessorState,
    attempt: AttemptId,
    callback: Option<Arc<dyn SessionCallback>>,
    snapshot: Option<SessionResultSnapshot>,
    guard: CancellationGuard,
    stall_timer: Option<JoinHandle<()>>,
    stall_warned: bool,

    continuation_data: Option<JsonValue>,
    transport_status: u16,
    cancel_reason: Option<String>,
    report: Option<CompletionReport>,
}

impl SubmissionProcessor {
    /// 创建新的提交处理器
    ///
    /// `events` 是驱动方事件队列的发送端，传输回调和计时器都通过它把事件送回来。
    pub fn new(config: &Config, collaborators: Collaborators, events: EventSender, ctx: SubmissionCtx) -> Self {
        Self {
            ctx,
            collaborators,
            events,
            enrollment_url: config.enrollment_url(),
            device_key: config.device_key_identifier.clone(),
            stall_delay: config.stall_warning_delay(),
            stall_message: config.stall_warning_message.clone(),
            success_message: config.success_message.clone(),
            state: ProcessorState::Idle,
            attempt: AttemptId::default(),
            callback: None,
            snapshot: None,
            guard: CancellationGuard::new(),
            stall_timer: None,
            stall_warned: false,
            continuation_data: None,
            transport_status: 0,
            cancel_reason: None,
            report: None,
        }
    }

    pub fn phase(&self) -> ProcessorPhase {
        self.state.phase()
    }

    pub fn is_finalized(&self) -> bool {
        self.state.is_finalized()
    }

    /// 当前尝试的编号
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// 已产出的完成报告
    pub fn completion_report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    /// 会话产生扫描结果
    ///
    /// 正常情况下每个实例只调用一次；重复调用会先中止旧的请求再重新开始。
    ///
    /// 耗时提示计时器运行在当前的 Tokio 运行时上；在运行时之外调用时
    /// 请求照常发出，只是不会有耗时提示。
    pub fn on_scan_produced(&mut self, snapshot: SessionResultSnapshot, callback: Arc<dyn SessionCallback>) {
        if self.state.is_finalized() {
            warn!("{} 处理器已结束，忽略新的扫描结果", self.ctx);
            return;
        }

        self.abort_outstanding();
        self.stop_stall_timer();
        self.attempt = self.attempt.next();
        self.stall_warned = false;
        self.continuation_data = None;
        self.ctx.session_id = snapshot.session_id.clone();
        self.callback = Some(callback);

        let status = snapshot.status;

        // 没有扫描结果（用户取消、超时等），不发请求
        if !status.is_completed_successfully() {
            info!("{} 会话未完成 ({})，不提交扫描结果", self.ctx, status);
            self.snapshot = Some(snapshot);
            self.state = ProcessorState::Cancelling;
            self.cancel_due_to_network_error(SubmissionFailure::SessionIncomplete {
                status: status.to_string(),
            });
            return;
        }

        let enrollment_id = self.collaborators.enrollment.current_identifier();
        let payload = SubmissionPayload::from_snapshot(&snapshot, enrollment_id);
        self.snapshot = Some(snapshot);

        let request = match self.build_request(&payload) {
            Ok(request) => request,
            Err(e) => {
                self.state = ProcessorState::Cancelling;
                self.cancel_due_to_network_error(SubmissionFailure::TransportFailure {
                    reason: format!("Failed to serialize request, cancelling. ({e})"),
                });
                return;
            }
        };

        info!(
            "{} 📤 正在上传扫描结果 (尝试 {}, {} 字节, 注册标识 {})...",
            self.ctx,
            self.attempt,
            request.body.len(),
            payload.external_database_ref_id()
        );

        let reactions = TransportReactions::new(self.attempt, self.events.clone());
        let handle = self.collaborators.transport.send(request, reactions);
        self.state = ProcessorState::Uploading {
            attempt: self.attempt,
            handle,
        };

        self.start_stall_timer();
    }

    /// 处理一个事件
    pub fn handle_event(&mut self, event: ProcessorEvent) {
        if self.state.is_finalized() {
            debug!("{} 处理器已结束，忽略事件: {:?}", self.ctx, event);
            return;
        }

        match event {
            ProcessorEvent::UploadProgress { attempt, fraction } => {
                self.on_upload_progress(attempt, fraction)
            }
            ProcessorEvent::UploadCompleted {
                attempt,
                body,
                status,
            } => self.on_upload_completed(attempt, &body, status),
            ProcessorEvent::UploadFailed { attempt, reason } => {
                self.on_upload_failed(attempt, reason)
            }
            ProcessorEvent::StallTimerFired { attempt } => self.on_stall_timer_fired(attempt),
            ProcessorEvent::SessionFullyDone { is_completely_done } => {
                self.on_session_fully_done(is_completely_done)
            }
        }
    }

    /// 会话在收到继续/取消信号后已经完全结束
    ///
    /// `is_completely_done` 是会话给出的最终完成标记，会写回保存的快照。
    /// 只会产出一次完成报告，之后的调用都是空操作。
    pub fn on_session_fully_done(&mut self, is_completely_done: bool) {
        if self.state.is_finalized() {
            debug!("{} 已产出完成报告，忽略重复的结束通知", self.ctx);
            return;
        }

        self.abort_outstanding();
        self.stop_stall_timer();

        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.is_completely_done = is_completely_done;
        }
        let success = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.is_completely_done);

        if success {
            info!("{} ✅ 活体验证通过，注册完成", self.ctx);
        } else {
            warn!("{} ⚠️ 注册未成功，清除注册标识", self.ctx);
            self.collaborators.enrollment.clear_current_identifier();
        }

        let report = CompletionReport {
            success,
            continuation_data: self.continuation_data.take(),
            transport_status: self.transport_status,
            session_id: self.snapshot.as_ref().map(|s| s.session_id.clone()),
            cancel_reason: self.cancel_reason.clone(),
        };

        self.collaborators.sink.on_complete(&report);
        self.report = Some(report);
        self.state = ProcessorState::Finalized;
    }

    /// 因失败取消会话，保证取消回调只调用一次
    ///
    /// 完成、传输错误等多个失败来源可能先后到达，第二次起只记录 debug 日志。
    pub fn cancel_due_to_network_error(&mut self, failure: SubmissionFailure) {
        let reason = failure.reason();

        if !self.guard.trigger() {
            debug!(
                "{} 会话已取消，忽略重复的失败 [{}]: {}",
                self.ctx,
                failure.category(),
                reason
            );
            return;
        }

        error!("{} ❌ [{}] {}", self.ctx, failure.category(), reason);
        self.cancel_reason = Some(reason);

        if let Some(callback) = &self.callback {
            callback.cancel();
        }
    }

    // ========== 事件处理 ==========

    fn on_upload_progress(&mut self, attempt: AttemptId, fraction: f64) {
        if !self.state.is_uploading(attempt) || !fraction.is_finite() {
            debug!("{} 忽略进度事件 (尝试 {})", self.ctx, attempt);
            return;
        }

        if let Some(callback) = &self.callback {
            callback.upload_progress(fraction.clamp(0.0, 1.0));
        }
    }

    fn on_upload_completed(&mut self, attempt: AttemptId, body: &[u8], status: u16) {
        let handle = match mem::replace(&mut self.state, ProcessorState::Idle) {
            ProcessorState::Uploading {
                attempt: current,
                handle,
            } if current == attempt => handle,
            other => {
                debug!("{} 忽略过期的完成事件 (尝试 {})", self.ctx, attempt);
                self.state = other;
                return;
            }
        };

        self.stop_stall_timer();
        self.transport_status = status;
        self.state = ProcessorState::AwaitingDecision { attempt, handle };

        info!("{} ✓ 上传完成 (HTTP {})", self.ctx, status);

        match interpret(body) {
            Decision::Advance {
                scan_result_blob,
                call_data,
            } => {
                info!("{} ✓ 服务端已处理扫描结果，继续下一步", self.ctx);
                if let Some(callback) = &self.callback {
                    if let Some(message) = &self.success_message {
                        callback.override_success_message(message);
                    }
                    callback.proceed_to_next_step(&scan_result_blob);
                }
                self.continuation_data = call_data;
            }
            decision => {
                self.state = ProcessorState::Cancelling;
                if let Some(failure) = decision.failure() {
                    self.cancel_due_to_network_error(failure);
                }
            }
        }
    }

    fn on_upload_failed(&mut self, attempt: AttemptId, reason: String) {
        if attempt != self.attempt {
            debug!("{} 忽略过期尝试 {} 的错误: {}", self.ctx, attempt, reason);
            return;
        }

        match self.state.phase() {
            ProcessorPhase::Uploading => {
                self.stop_stall_timer();
                self.state = ProcessorState::Cancelling;
            }
            ProcessorPhase::Cancelling => {}
            phase => {
                warn!(
                    "{} 状态 {:?} 下收到传输错误，忽略: {}",
                    self.ctx, phase, reason
                );
                return;
            }
        }

        self.cancel_due_to_network_error(SubmissionFailure::TransportFailure { reason });
    }

    fn on_stall_timer_fired(&mut self, attempt: AttemptId) {
        if self.stall_warned || !self.state.is_uploading(attempt) {
            debug!("{} 耗时提示计时器到期，但上传已结束", self.ctx);
            return;
        }

        self.stall_warned = true;
        warn!("{} ⏳ 上传耗时较长，提示用户", self.ctx);

        if let Some(callback) = &self.callback {
            callback.upload_message_override(&self.stall_message);
        }
    }

    // ========== 辅助方法 ==========

    fn build_request(&self, payload: &SubmissionPayload) -> serde_json::Result<SubmissionRequest> {
        let body = payload.to_json_bytes()?;

        Ok(SubmissionRequest {
            url: self.enrollment_url.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Device-Key".to_string(), self.device_key.clone()),
                (
                    "X-User-Agent".to_string(),
                    session_user_agent(&self.device_key, payload.session_id()),
                ),
            ],
            body,
        })
    }

    /// 中止在途请求（如果有），状态回到 Idle
    fn abort_outstanding(&mut self) {
        match mem::replace(&mut self.state, ProcessorState::Idle) {
            ProcessorState::Uploading { attempt, mut handle }
            | ProcessorState::AwaitingDecision { attempt, mut handle } => {
                debug!("{} 中止尝试 {} 的请求句柄", self.ctx, attempt);
                handle.abort();
            }
            other => self.state = other,
        }
    }

    fn start_stall_timer(&mut self) {
        self.stop_stall_timer();

        let Ok(runtime) = Handle::try_current() else {
            warn!("{} 当前不在 Tokio 运行时中，不启动耗时提示计时器", self.ctx);
            return;
        };

        let events = self.events.clone();
        let attempt = self.attempt;
        let delay = self.stall_delay;
        self.stall_timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            events.post(ProcessorEvent::StallTimerFired { attempt });
        }));
    }

    fn stop_stall_timer(&mut self) {
        if let Some(timer) = self.stall_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SubmissionProcessor {
    fn drop(&mut self) {
        self.stop_stall_timer();
        if !self.state.is_finalized() {
            self.abort_outstanding();
        }
    }
}
