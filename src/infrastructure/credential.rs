//! 凭证门禁 - 基础设施层
//!
//! 在任何远端调用序列之前确认已选定可用的 API Key；
//! 远端调用只通过 `CredentialSlot` 在调用时读取最新的凭证

use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, CredentialError};

/// 当前凭证（多个客户端共享）
#[derive(Debug, Clone, Default)]
pub struct CredentialSlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl CredentialSlot {
    pub fn new(initial: Option<String>) -> Self {
        let slot = Self::default();
        if let Some(key) = initial {
            slot.set(key);
        }
        slot
    }

    /// 读取当前凭证，空字符串视为未设置
    pub fn get(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone().filter(|k| !k.is_empty())
    }

    pub fn set(&self, key: impl Into<String>) {
        let key = key.into().trim().to_string();
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(key).filter(|k| !k.is_empty());
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

/// 凭证门禁
#[async_trait]
pub trait CredentialGate: Send + Sync {
    /// 是否已选定凭证
    async fn has_credential(&self) -> bool;

    /// 触发凭证选择流程
    async fn request_credential(&self) -> AppResult<()>;
}

/// 从 Key 文件或环境变量选取凭证
pub struct EnvCredentialGate {
    slot: CredentialSlot,
    key_file: Option<PathBuf>,
    env_var: String,
}

impl EnvCredentialGate {
    pub fn new(slot: CredentialSlot, key_file: Option<PathBuf>) -> Self {
        Self {
            slot,
            key_file,
            env_var: "LLM_API_KEY".to_string(),
        }
    }

    pub fn slot(&self) -> &CredentialSlot {
        &self.slot
    }
}

#[async_trait]
impl CredentialGate for EnvCredentialGate {
    async fn has_credential(&self) -> bool {
        self.slot.is_set()
    }

    async fn request_credential(&self) -> AppResult<()> {
        if let Some(path) = &self.key_file {
            let key = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            if !key.trim().is_empty() {
                self.slot.set(key);
                info!("🔑 已从 Key 文件选取凭证: {}", path.display());
                return Ok(());
            }
        }

        match std::env::var(&self.env_var) {
            Ok(key) if !key.trim().is_empty() => {
                self.slot.set(key);
                info!("🔑 已从环境变量 {} 选取凭证", self.env_var);
                Ok(())
            }
            _ => Err(AppError::Credential(CredentialError::SelectionFailed {
                source: format!("未找到可用的 API Key（{}）", self.env_var).into(),
            })),
        }
    }
}

/// 门禁包裹的操作结果
#[derive(Debug, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// 操作正常完成
    Done(T),
    /// 远端拒绝了凭证，已重新触发凭证选择
    CredentialReselected,
}

impl<T> GateOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            GateOutcome::Done(value) => Some(value),
            GateOutcome::CredentialReselected => None,
        }
    }
}

/// 先过凭证门禁再执行操作
///
/// - 没有凭证：触发选择流程，然后假定选择成功继续执行
/// - 远端拒绝凭证：重新触发一次选择流程，不向上抛出原始错误
/// - 其他错误原样返回
pub async fn with_credential<G, F, Fut, T>(gate: &G, op: F) -> AppResult<GateOutcome<T>>
where
    G: CredentialGate + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    if !gate.has_credential().await {
        info!("🔑 尚未选定 API Key，启动凭证选择流程");
        if let Err(e) = gate.request_credential().await {
            warn!("凭证选择流程未完成，继续尝试: {}", e);
        }
    }

    match op().await {
        Ok(value) => Ok(GateOutcome::Done(value)),
        Err(e) if e.is_credential_rejection() => {
            warn!("⚠️ 远端拒绝了当前凭证，重新选择 API Key");
            if let Err(e) = gate.request_credential().await {
                warn!("凭证重新选择失败: {}", e);
            }
            Ok(GateOutcome::CredentialReselected)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGate {
        has_key: bool,
        requests: AtomicUsize,
    }

    impl CountingGate {
        fn new(has_key: bool) -> Self {
            Self {
                has_key,
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CredentialGate for CountingGate {
        async fn has_credential(&self) -> bool {
            self.has_key
        }

        async fn request_credential(&self) -> AppResult<()> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_credential_requests_then_proceeds() {
        let gate = CountingGate::new(false);
        let outcome = with_credential(&gate, || async { Ok::<_, AppError>(7) })
            .await
            .unwrap();
        assert_eq!(outcome, GateOutcome::Done(7));
        assert_eq!(gate.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_present_credential_skips_selection() {
        let gate = CountingGate::new(true);
        with_credential(&gate, || async { Ok::<_, AppError>(()) })
            .await
            .unwrap();
        assert_eq!(gate.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejection_reprompts_once_without_error() {
        let gate = CountingGate::new(true);
        let outcome = with_credential(&gate, || async {
            Err::<(), _>(AppError::Credential(CredentialError::Rejected {
                message: "Requested entity was not found.".to_string(),
            }))
        })
        .await
        .unwrap();
        assert_eq!(outcome, GateOutcome::CredentialReselected);
        assert_eq!(gate.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_surface() {
        let gate = CountingGate::new(true);
        let result = with_credential(&gate, || async {
            Err::<(), _>(AppError::Other("网络错误".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(gate.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_env_gate_reads_key_file() {
        let path = std::env::temp_dir().join(format!("brand_board_key_{}", std::process::id()));
        tokio::fs::write(&path, "  secret-key \n").await.unwrap();

        let gate = EnvCredentialGate::new(CredentialSlot::default(), Some(path.clone()));
        assert!(!gate.has_credential().await);
        gate.request_credential().await.unwrap();
        assert_eq!(gate.slot().get().as_deref(), Some("secret-key"));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn test_empty_key_counts_as_unset() {
        let slot = CredentialSlot::new(Some("   ".to_string()));
        assert!(!slot.is_set());
    }

    #[test]
    fn test_gate_sees_key_set_through_cloned_slot() {
        let slot = CredentialSlot::default();
        let gate = EnvCredentialGate::new(slot.clone(), None);
        assert!(!tokio_test::block_on(gate.has_credential()));

        slot.set("another-key");
        assert!(tokio_test::block_on(gate.has_credential()));
    }
}
