use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 会话最终结果，每个处理器实例只产出一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub success: bool,
    /// 服务端返回的 callData，原样透传
    pub continuation_data: Option<JsonValue>,
    /// 最后一次响应的 HTTP 状态码，没有收到响应时为 0
    pub transport_status: u16,
    pub session_id: Option<String>,
    pub cancel_reason: Option<String>,
}
