//! 注册标识存储 - 业务能力层
//!
//! 保存"当前待注册"的外部数据库标识（externalDatabaseRefID）

use std::sync::RwLock;
use tracing::debug;

/// 注册标识的提供方
pub trait EnrollmentIdentifierStore: Send + Sync {
    /// 当前的注册标识
    fn current_identifier(&self) -> String;

    /// 清除当前的注册标识，重复调用没有副作用
    fn clear_current_identifier(&self);
}

/// 内存中的注册标识存储
///
/// 没有标识时按 `{prefix}{毫秒时间戳}` 生成一个新的。
pub struct InMemoryEnrollmentStore {
    prefix: String,
    current: RwLock<Option<String>>,
}

impl InMemoryEnrollmentStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            current: RwLock::new(None),
        }
    }

    /// 使用已知标识创建
    pub fn with_identifier(prefix: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            current: RwLock::new(Some(identifier.into())),
        }
    }

    /// 当前待注册的标识（不会生成新的）
    pub fn pending_identifier(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn generate(&self) -> String {
        format!("{}{}", self.prefix, chrono::Utc::now().timestamp_millis())
    }
}

impl EnrollmentIdentifierStore for InMemoryEnrollmentStore {
    fn current_identifier(&self) -> String {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        current.get_or_insert_with(|| self.generate()).clone()
    }

    fn clear_current_identifier(&self) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(identifier) = current.take() {
            debug!("已清除注册标识: {}", identifier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identifier_is_stable_until_cleared() {
        let store = InMemoryEnrollmentStore::new("rust_sample_app_");
        assert!(store.pending_identifier().is_none());

        let first = store.current_identifier();
        assert!(first.starts_with("rust_sample_app_"));
        assert_eq!(store.current_identifier(), first);

        store.clear_current_identifier();
        store.clear_current_identifier();
        assert!(store.pending_identifier().is_none());
    }

    #[test]
    fn test_known_identifier_is_used() {
        let store = InMemoryEnrollmentStore::with_identifier("p_", "user-7");
        assert_eq!(store.current_identifier(), "user-7");
    }
}
