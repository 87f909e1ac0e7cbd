use crate::models::session::SessionResultSnapshot;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从文件加载的会话快照
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub file_path: PathBuf,
    pub snapshot: SessionResultSnapshot,
}

/// 从 TOML 文件加载会话快照
pub async fn load_snapshot_from_toml(toml_file_path: &Path) -> Result<SessionResultSnapshot> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let snapshot: SessionResultSnapshot = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(snapshot)
}

/// 从文件夹中加载所有 TOML 快照，按文件名排序
///
/// 单个文件解析失败只记录警告，不影响其他文件。
pub async fn load_all_snapshots(folder_path: &str) -> Result<Vec<LoadedSnapshot>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut snapshots = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_snapshot_from_toml(&path).await {
            Ok(snapshot) => {
                tracing::info!("成功加载会话 {} (状态: {})", snapshot.session_id, snapshot.status);
                snapshots.push(LoadedSnapshot {
                    file_path: path,
                    snapshot,
                });
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::SessionStatus;

    fn temp_folder(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "face_scan_submit_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_all_snapshots_skips_broken_files() {
        let dir = temp_folder("loader");
        std::fs::write(
            dir.join("a.toml"),
            r#"
status = "session_completed_successfully"
session_id = "sess-a"
face_scan = "c2Nhbg=="
audit_trail = ["img"]
low_quality_audit_trail = ["low"]
"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("b.toml"),
            r#"
status = "user_cancelled"
session_id = "sess-b"
"#,
        )
        .unwrap();
        std::fs::write(dir.join("c.toml"), "status = 12").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let loaded = load_all_snapshots(dir.to_str().unwrap()).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].snapshot.session_id, "sess-a");
        assert_eq!(loaded[0].file_path, dir.join("a.toml"));
        assert_eq!(loaded[0].snapshot.audit_trail, vec!["img".to_string()]);
        assert_eq!(loaded[1].snapshot.status, SessionStatus::UserCancelled);
        assert!(loaded[1].snapshot.face_scan.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_folder_is_error() {
        let result = load_all_snapshots("/definitely/not/here").await;
        assert!(result.is_err());
    }
}
