//! 批量会话处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量会话的提交和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、校验配置、创建 HTTP 传输和报告写入器
//! 2. **批量加载**：扫描并加载所有待提交的会话快照
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有会话的注册结果

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::ReqwestTransport;
use crate::models::loaders::LoadedSnapshot;
use crate::orchestrator::session_runner::SessionRunner;
use crate::services::{InMemoryEnrollmentStore, ReportWriter};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_snapshots_loaded, log_startup,
    print_final_stats,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    runner: SessionRunner,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        if config.base_url.trim().is_empty() {
            return Err(AppError::missing_config("FACESCAN_BASE_URL").into());
        }
        if config.device_key_identifier.is_empty() {
            warn!("⚠️ 未设置 FACESCAN_DEVICE_KEY，请求将使用空的设备密钥");
        }

        log_startup(config.max_concurrent_sessions, &config.enrollment_url());

        let transport = Arc::new(ReqwestTransport::new(&config)?);
        let sink = Arc::new(ReportWriter::with_path(config.report_file.clone()));
        let runner = SessionRunner::new(config.clone(), transport, sink);

        Ok(Self { config, runner })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        info!("\n📁 正在扫描待提交的会话...");
        let all_sessions = crate::models::load_all_snapshots(&self.config.snapshot_folder).await?;

        if all_sessions.is_empty() {
            warn!("⚠️ 没有找到待提交的TOML文件，程序结束");
            return Ok(());
        }

        let batch_size = self.config.max_concurrent_sessions.max(1);
        log_snapshots_loaded(all_sessions.len(), batch_size);

        let stats = self.process_all_sessions(all_sessions, batch_size).await?;

        print_final_stats(stats.success, stats.failed, stats.total, &self.config.report_file);

        Ok(())
    }

    /// 分批处理所有会话
    async fn process_all_sessions(
        &self,
        all_sessions: Vec<LoadedSnapshot>,
        batch_size: usize,
    ) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = all_sessions.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in all_sessions.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_start + batch.len(), total);

            let batch_result = self.process_batch(batch, batch_start, semaphore.clone()).await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, batch_result.success, batch_result.success + batch_result.failed);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[LoadedSnapshot],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::new();

        for (idx, loaded) in batch.iter().enumerate() {
            let session_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let snapshot = loaded.snapshot.clone();
            let file_path = loaded.file_path.clone();
            let enrollment = Arc::new(match &snapshot.external_database_ref_id {
                Some(id) => InMemoryEnrollmentStore::with_identifier(&self.config.enrollment_id_prefix, id),
                None => InMemoryEnrollmentStore::new(&self.config.enrollment_id_prefix),
            });
            let runner = self.runner.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                runner.run(snapshot, enrollment, session_index).await
            });
            handles.push((session_index, file_path, handle));
        }

        let mut result = BatchResult::default();

        for (session_index, file_path, handle) in handles {
            match handle.await {
                Ok(Some(report)) if report.success => result.success += 1,
                Ok(Some(report)) => {
                    warn!(
                        "[会话 {}] 注册未成功 ({}): {}",
                        session_index,
                        file_path.display(),
                        report.cancel_reason.as_deref().unwrap_or("会话未完整结束")
                    );
                    result.failed += 1;
                }
                Ok(None) => {
                    error!("[会话 {}] ❌ 没有产出完成报告 ({})", session_index, file_path.display());
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[会话 {}] 任务执行失败 ({}): {}", session_index, file_path.display(), e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}
