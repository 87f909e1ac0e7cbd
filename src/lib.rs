//! # Face Scan Submit
//!
//! 把人脸扫描会话的结果提交给活体验证服务的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 事件队列和传输抽象，只暴露能力
//! - `ProcessorEvent` - 处理器的所有输入都是离散事件
//! - `ReqwestTransport` - 分块上传、上报进度、可中止
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `interpret` - 把响应体变成明确的决定
//! - `InMemoryEnrollmentStore` - 注册标识的生成与清除
//! - `ReportWriter` - 写完成报告的能力
//! - `HeadlessSession` - 无界面的会话边界
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整处理流程
//! - `SubmissionCtx` - 上下文封装（会话索引 + 会话 ID）
//! - `SubmissionProcessor` - 状态机（上传 → 解释 → 继续/取消 → 收尾）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量会话处理器，管理资源和并发
//! - `orchestrator/session_runner` - 单个会话的事件循环
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, SubmissionFailure};
pub use infrastructure::{ProcessorEvent, ReqwestTransport, Transport};
pub use models::{CompletionReport, SessionResultSnapshot, SessionStatus};
pub use orchestrator::{App, SessionRunner};
pub use services::{interpret, Decision};
pub use workflow::{SubmissionCtx, SubmissionProcessor};
