use serde::{Deserialize, Serialize};
use std::fmt;

/// 人脸扫描会话的结束状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// 用户完成了会话并生成了 3D FaceScan
    ///
    /// 注意：这并不代表注册成功，只代表有扫描结果可以提交
    SessionCompletedSuccessfully,
    /// 用户主动取消
    UserCancelled,
    /// 会话超时
    Timeout,
    /// 应用切到后台
    ContextSwitch,
    /// 没有摄像头权限
    CameraPermissionDenied,
    /// 设备不支持横屏
    LandscapeModeNotAllowed,
    /// 内部未知错误
    UnknownInternalError,
}

impl SessionStatus {
    pub fn is_completed_successfully(self) -> bool {
        self == SessionStatus::SessionCompletedSuccessfully
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::SessionCompletedSuccessfully => "session_completed_successfully",
            SessionStatus::UserCancelled => "user_cancelled",
            SessionStatus::Timeout => "timeout",
            SessionStatus::ContextSwitch => "context_switch",
            SessionStatus::CameraPermissionDenied => "camera_permission_denied",
            SessionStatus::LandscapeModeNotAllowed => "landscape_mode_not_allowed",
            SessionStatus::UnknownInternalError => "unknown_internal_error",
        };
        f.write_str(name)
    }
}

/// 一次人脸扫描会话的结果快照
///
/// 由提交处理器独占持有：扫描产生时写入一次，收尾时读取。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResultSnapshot {
    pub status: SessionStatus,
    pub session_id: String,
    /// 3D FaceScan（base64）
    #[serde(default)]
    pub face_scan: String,
    #[serde(default)]
    pub audit_trail: Vec<String>,
    #[serde(default)]
    pub low_quality_audit_trail: Vec<String>,
    /// 会话是否已经完整走完（由会话方在收尾时给出）
    #[serde(default)]
    pub is_completely_done: bool,
    /// 快照文件里指定的注册标识，没有时由标识存储生成
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_database_ref_id: Option<String>,
}

impl SessionResultSnapshot {
    /// 创建一个扫描成功的快照
    pub fn completed(session_id: impl Into<String>, face_scan: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::SessionCompletedSuccessfully,
            session_id: session_id.into(),
            face_scan: face_scan.into(),
            audit_trail: Vec::new(),
            low_quality_audit_trail: Vec::new(),
            is_completely_done: false,
            external_database_ref_id: None,
        }
    }

    /// 创建一个没有扫描结果的快照（取消、超时等）
    pub fn without_scan(session_id: impl Into<String>, status: SessionStatus) -> Self {
        Self {
            status,
            session_id: session_id.into(),
            face_scan: String::new(),
            audit_trail: Vec::new(),
            low_quality_audit_trail: Vec::new(),
            is_completely_done: false,
            external_database_ref_id: None,
        }
    }

    pub fn with_audit_trail(mut self, image: impl Into<String>, low_quality: impl Into<String>) -> Self {
        self.audit_trail.push(image.into());
        self.low_quality_audit_trail.push(low_quality.into());
        self
    }
}
