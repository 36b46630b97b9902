// 派生记录数据访问 Repository

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::derivation::ValidatedDerivation;

/// 根账户 -> 派生记录列表
pub type DerivationStore = BTreeMap<String, Vec<ValidatedDerivation>>;

/// 根账户标识按 ASCII 小写归一
pub fn normalize_root(root: &str) -> String {
    root.trim().to_ascii_lowercase()
}

// ============ Repository Trait ============

#[async_trait]
pub trait DerivationRepository: Send + Sync {
    /// 查询根账户已知的派生记录（不存在时为空列表）
    async fn existing_derivations(&self, root: &str) -> Result<Vec<ValidatedDerivation>>;

    /// 覆盖保存根账户的派生记录
    async fn save_derivations(&self, root: &str, derivations: &[ValidatedDerivation])
        -> Result<()>;
}

// ============ 内存实现 ============

#[derive(Default)]
pub struct InMemoryDerivationRepository {
    store: RwLock<HashMap<String, Vec<ValidatedDerivation>>>,
}

impl InMemoryDerivationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定数据初始化
    pub fn with_derivations(root: &str, derivations: Vec<ValidatedDerivation>) -> Self {
        let mut store = HashMap::new();
        store.insert(normalize_root(root), derivations);
        Self {
            store: RwLock::new(store),
        }
    }
}

#[async_trait]
impl DerivationRepository for InMemoryDerivationRepository {
    async fn existing_derivations(&self, root: &str) -> Result<Vec<ValidatedDerivation>> {
        let store = self.store.read().await;
        Ok(store.get(&normalize_root(root)).cloned().unwrap_or_default())
    }

    async fn save_derivations(
        &self,
        root: &str,
        derivations: &[ValidatedDerivation],
    ) -> Result<()> {
        let mut store = self.store.write().await;
        store.insert(normalize_root(root), derivations.to_vec());
        Ok(())
    }
}

// ============ JSON 文件实现 ============

/// 以单个 JSON 文件保存全部根账户的派生记录
///
/// 写入先落到同目录的临时文件再重命名，避免中途失败留下半个文件。
pub struct JsonFileDerivationRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileDerivationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<DerivationStore> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DerivationStore::new())
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read derivation store {}", self.path.display())
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(DerivationStore::new());
        }

        serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse derivation store {}", self.path.display())
        })
    }

    async fn persist(&self, store: &DerivationStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(store).context("Failed to serialize derivation store")?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

#[async_trait]
impl DerivationRepository for JsonFileDerivationRepository {
    async fn existing_derivations(&self, root: &str) -> Result<Vec<ValidatedDerivation>> {
        let store = self.load().await?;
        Ok(store.get(&normalize_root(root)).cloned().unwrap_or_default())
    }

    async fn save_derivations(
        &self,
        root: &str,
        derivations: &[ValidatedDerivation],
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut store = self.load().await?;
        store.insert(normalize_root(root), derivations.to_vec());
        self.persist(&store).await?;

        tracing::info!(
            root = %root,
            derivations = derivations.len(),
            path = %self.path.display(),
            "Derivations saved"
        );
        Ok(())
    }
}
