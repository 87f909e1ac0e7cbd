//! 响应解释服务 - 业务能力层
//!
//! 只负责把验证服务返回的原始字节变成一个明确的决定，不关心流程

use serde_json::Value as JsonValue;

use crate::error::SubmissionFailure;

/// 服务端既没处理成功、也没给出错误信息时使用的原因
pub const UNEXPECTED_RESPONSE_REASON: &str = "Unexpected API response, cancelling out.";

/// 对一次响应的决定
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// 服务端已处理，会话继续；`scan_result_blob` 原样交给会话
    Advance {
        scan_result_blob: String,
        call_data: Option<JsonValue>,
    },
    /// 服务端拒绝
    Reject { reason: String },
    /// 响应无法解析或缺少必要字段
    Malformed,
}

impl Decision {
    /// 需要取消会话时对应的失败分类
    pub fn failure(&self) -> Option<SubmissionFailure> {
        match self {
            Decision::Advance { .. } => None,
            Decision::Reject { reason } => Some(SubmissionFailure::ServerRejection {
                reason: reason.clone(),
            }),
            Decision::Malformed => Some(SubmissionFailure::MalformedResponse),
        }
    }
}

/// 解释响应体
///
/// 对任何字节输入都不会 panic。只有无法解析的响应体，或者已处理却缺少
/// `scanResultBlob` 的响应才归为 `Malformed`；其余字段逐个读取，
/// 决定用不到的字段类型不对也不影响结果。
pub fn interpret(body: &[u8]) -> Decision {
    let Ok(JsonValue::Object(response)) = serde_json::from_slice::<JsonValue>(body) else {
        return Decision::Malformed;
    };

    let processed = response
        .get("processed")
        .or_else(|| response.get("wasProcessed"))
        .and_then(JsonValue::as_bool);
    let error = response.get("error").and_then(JsonValue::as_bool);

    match (processed, error) {
        (Some(true), Some(false)) => {
            match response.get("scanResultBlob").and_then(JsonValue::as_str) {
                Some(scan_result_blob) => Decision::Advance {
                    scan_result_blob: scan_result_blob.to_string(),
                    call_data: response.get("callData").filter(|v| !v.is_null()).cloned(),
                },
                None => Decision::Malformed,
            }
        }
        (_, Some(true)) => {
            let reason = response
                .get("errorMessage")
                .and_then(JsonValue::as_str)
                .unwrap_or(UNEXPECTED_RESPONSE_REASON);
            Decision::Reject {
                reason: reason.to_string(),
            }
        }
        _ => Decision::Reject {
            reason: UNEXPECTED_RESPONSE_REASON.to_string(),
        },
    }
}
