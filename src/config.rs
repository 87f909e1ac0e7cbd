use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的会话数量
    pub max_concurrent_sessions: usize,
    /// 待提交的会话快照（TOML）存放目录
    pub snapshot_folder: String,
    /// 完成报告输出文件（每行一个 JSON）
    pub report_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 验证服务配置 ---
    pub base_url: String,
    pub device_key_identifier: String,
    pub connect_timeout_secs: u64,
    pub upload_chunk_size: usize,
    // --- 用户提示配置 ---
    pub stall_warning_delay_ms: u64,
    pub stall_warning_message: String,
    /// 成功页面文案，为空时不覆盖
    pub success_message: Option<String>,
    // --- 注册标识 ---
    pub enrollment_id_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: 4,
            snapshot_folder: "captured_sessions".to_string(),
            report_file: "completion_reports.jsonl".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            base_url: "https://api.facetec.com/api/v3.1/biometrics".to_string(),
            device_key_identifier: String::new(),
            connect_timeout_secs: 10,
            upload_chunk_size: 16 * 1024,
            stall_warning_delay_ms: 6000,
            stall_warning_message: "Still Uploading...".to_string(),
            success_message: Some("Face Scanned\n3D Liveness Proven".to_string()),
            enrollment_id_prefix: "rust_sample_app_".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_sessions: std::env::var("MAX_CONCURRENT_SESSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_sessions),
            snapshot_folder: std::env::var("SNAPSHOT_FOLDER").unwrap_or(default.snapshot_folder),
            report_file: std::env::var("REPORT_FILE").unwrap_or(default.report_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            base_url: std::env::var("FACESCAN_BASE_URL").unwrap_or(default.base_url),
            device_key_identifier: std::env::var("FACESCAN_DEVICE_KEY").unwrap_or(default.device_key_identifier),
            connect_timeout_secs: std::env::var("CONNECT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.connect_timeout_secs),
            upload_chunk_size: std::env::var("UPLOAD_CHUNK_SIZE").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.upload_chunk_size),
            stall_warning_delay_ms: std::env::var("STALL_WARNING_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.stall_warning_delay_ms),
            stall_warning_message: std::env::var("STALL_WARNING_MESSAGE").unwrap_or(default.stall_warning_message),
            success_message: match std::env::var("SUCCESS_MESSAGE") {
                Ok(v) if v.is_empty() => None,
                Ok(v) => Some(v),
                Err(_) => default.success_message,
            },
            enrollment_id_prefix: std::env::var("ENROLLMENT_ID_PREFIX").unwrap_or(default.enrollment_id_prefix),
        }
    }

    /// 提交接口的完整地址
    pub fn enrollment_url(&self) -> String {
        format!("{}/enrollment-3d", self.base_url.trim_end_matches('/'))
    }

    pub fn stall_warning_delay(&self) -> Duration {
        Duration::from_millis(self.stall_warning_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_url_trims_trailing_slash() {
        let config = Config {
            base_url: "http://localhost:8080/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.enrollment_url(), "http://localhost:8080/enrollment-3d");
    }

    #[test]
    fn test_default_stall_delay_is_six_seconds() {
        assert_eq!(Config::default().stall_warning_delay(), Duration::from_secs(6));
    }
}
