//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量会话处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载会话快照（Vec<LoadedSnapshot>）
//! - 控制并发数量（Semaphore）
//! - 持有共享的 HTTP 传输和报告写入器
//! - 输出全局统计信息
//!
//! ### `session_runner` - 单个会话驱动器
//! - 为会话创建事件队列
//! - 创建提交处理器并驱动它走到终态
//! - 返回完成报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<LoadedSnapshot>)
//!     ↓
//! session_runner (事件循环)
//!     ↓
//! workflow::SubmissionProcessor (处理单个会话)
//!     ↓
//! services (能力层：响应解释 / 注册标识 / 报告写入)
//!     ↓
//! infrastructure (基础设施：事件队列 / 传输)
//! ```

pub mod batch_processor;
pub mod session_runner;

// 重新导出主要类型
pub use batch_processor::App;
pub use session_runner::SessionRunner;
