//! 完成报告写入服务 - 业务能力层
//!
//! 只负责"把完成报告追加到文件"，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::models::CompletionReport;
use crate::services::session_callback::CompletionSink;

/// 完成报告写入服务
///
/// 每个报告写成一行 JSON，追加到文件末尾。
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用指定的文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    /// 写入一条完成报告
    pub fn write(&self, report: &CompletionReport) -> AppResult<()> {
        debug!(
            "写入完成报告: 会话 {:?} | 成功 {} | 状态码 {}",
            report.session_id, report.success, report.transport_status
        );

        let mut line = serde_json::to_string(report)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)
            .map_err(|e| AppError::file_write_failed(&self.report_file_path, e))?;

        file.write_all(line.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.report_file_path, e))?;

        Ok(())
    }
}

impl CompletionSink for ReportWriter {
    fn on_complete(&self, report: &CompletionReport) {
        if let Err(e) = self.write(report) {
            error!("完成报告写入失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reports_are_appended_as_json_lines() {
        let path = std::env::temp_dir().join(format!(
            "face_scan_submit_reports_{}.jsonl",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let writer = ReportWriter::with_path(path.to_string_lossy());

        let success = CompletionReport {
            success: true,
            continuation_data: Some(json!({"tid": 1})),
            transport_status: 200,
            session_id: Some("sess-1".to_string()),
            cancel_reason: None,
        };
        let failure = CompletionReport {
            success: false,
            continuation_data: None,
            transport_status: 0,
            session_id: None,
            cancel_reason: Some("bad scan".to_string()),
        };
        writer.on_complete(&success);
        writer.on_complete(&failure);

        let content = std::fs::read_to_string(&path).unwrap();
        let reports: Vec<CompletionReport> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(reports, vec![success, failure]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path_is_reported_as_write_failure() {
        let path = std::env::temp_dir()
            .join("face_scan_submit_missing_dir")
            .join("nested")
            .join("reports.jsonl");
        let writer = ReportWriter::with_path(path.to_string_lossy());

        let err = writer
            .write(&CompletionReport {
                success: false,
                continuation_data: None,
                transport_status: 0,
                session_id: None,
                cancel_reason: None,
            })
            .unwrap_err();

        assert!(matches!(err, AppError::File(_)));
        assert!(err.to_string().starts_with("文件错误: 写入文件失败"));
    }
}
