use serde::Serialize;

use super::session::SessionResultSnapshot;

/// 上传给验证服务的请求体
///
/// 每次提交只构建一次，构建后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    face_scan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_trail_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    low_quality_audit_trail_image: Option<String>,
    session_id: String,
    #[serde(rename = "externalDatabaseRefID")]
    external_database_ref_id: String,
}

impl SubmissionPayload {
    /// 从会话快照构建请求体
    ///
    /// 审计图片可以有零张或多张，只上传第一张高清和第一张低清图。
    pub fn from_snapshot(snapshot: &SessionResultSnapshot, external_database_ref_id: impl Into<String>) -> Self {
        Self {
            face_scan: snapshot.face_scan.clone(),
            audit_trail_image: snapshot.audit_trail.first().cloned(),
            low_quality_audit_trail_image: snapshot.low_quality_audit_trail.first().cloned(),
            session_id: snapshot.session_id.clone(),
            external_database_ref_id: external_database_ref_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn external_database_ref_id(&self) -> &str {
        &self.external_database_ref_id
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_uses_first_audit_images_and_wire_names() {
        let snapshot = SessionResultSnapshot::completed("sess-1", "scan-data")
            .with_audit_trail("audit-0", "low-0")
            .with_audit_trail("audit-1", "low-1");

        let payload = SubmissionPayload::from_snapshot(&snapshot, "enroll-42");
        let value: serde_json::Value =
            serde_json::from_slice(&payload.to_json_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "faceScan": "scan-data",
                "auditTrailImage": "audit-0",
                "lowQualityAuditTrailImage": "low-0",
                "sessionId": "sess-1",
                "externalDatabaseRefID": "enroll-42"
            })
        );
    }

    #[test]
    fn test_payload_without_audit_images_omits_fields() {
        let snapshot = SessionResultSnapshot::completed("sess-2", "scan");
        let payload = SubmissionPayload::from_snapshot(&snapshot, "id");
        let value = serde_json::to_value(&payload).unwrap();

        assert!(value.get("auditTrailImage").is_none());
        assert!(value.get("lowQualityAuditTrailImage").is_none());
    }
}
