use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络传输相关错误
    #[error("传输错误: {0}")]
    Transport(#[from] TransportError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 网络传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端初始化失败: {source}")]
    ClientBuildFailed {
        #[source]
        source: reqwest::Error,
    },
    /// 请求体序列化失败
    #[error("请求体序列化失败: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必填项为空
    #[error("配置项 {name} 不能为空")]
    MissingValue { name: String },
}

/// 一次提交失败的原因分类
///
/// 四类失败最终都走同一个"只取消一次"的路径，
/// 对会话回调来说没有区别，只在日志中区分。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionFailure {
    /// 会话在生成扫描结果前就结束了（用户取消、超时等）
    #[error("会话未完成: {status}")]
    SessionIncomplete { status: String },
    /// 连接层面的失败
    #[error("网络请求失败: {reason}")]
    TransportFailure { reason: String },
    /// 服务端明确拒绝
    #[error("服务端拒绝: {reason}")]
    ServerRejection { reason: String },
    /// 响应无法解析或缺少必要字段
    #[error("响应格式错误")]
    MalformedResponse,
}

/// 响应无法解析时交给日志和报告的原因文案
pub const MALFORMED_RESPONSE_REASON: &str =
    "Exception while handling API response, cancelling out.";

impl SubmissionFailure {
    /// 写入日志与完成报告的原因文本
    pub fn reason(&self) -> String {
        match self {
            SubmissionFailure::SessionIncomplete { status } => {
                format!("Session was not completed successfully ({status}), cancelling out.")
            }
            SubmissionFailure::TransportFailure { reason }
            | SubmissionFailure::ServerRejection { reason } => reason.clone(),
            SubmissionFailure::MalformedResponse => MALFORMED_RESPONSE_REASON.to_string(),
        }
    }

    /// 日志用的分类标签
    pub fn category(&self) -> &'static str {
        match self {
            SubmissionFailure::SessionIncomplete { .. } => "session_incomplete",
            SubmissionFailure::TransportFailure { .. } => "transport_failure",
            SubmissionFailure::ServerRejection { .. } => "server_rejection",
            SubmissionFailure::MalformedResponse => "malformed_response",
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Transport(TransportError::SerializeFailed { source: err })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(TransportError::ClientBuildFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建配置缺失错误
    pub fn missing_config(name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::MissingValue { name: name.into() })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
