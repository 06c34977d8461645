//! 品牌档案存储
//!
//! 会话内唯一的共享可变状态：当前品牌档案 + 已生成的区块结果。
//! 每次写入都整体替换快照（`watch` 通道），观察者拿到的快照总是一致的。

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::models::catalog::BRAND_DNA_ID;
use crate::models::{BrandProfile, SectionResult, SectionResultMap};

/// 看板快照（不可变）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub profile: Option<BrandProfile>,
    pub sections: SectionResultMap,
}

impl BoardSnapshot {
    /// 已生成的区块数量
    pub fn ready_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, id: &str) -> Option<&SectionResult> {
        self.sections.get(id)
    }
}

/// 品牌档案存储
///
/// 职责：
/// - 持有当前品牌档案和区块结果
/// - 提供 `set_profile` / `upsert_section` 两种写入
/// - 提供快照读取和订阅
#[derive(Debug, Clone)]
pub struct BrandProfileStore {
    tx: Arc<watch::Sender<Arc<BoardSnapshot>>>,
}

impl BrandProfileStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(BoardSnapshot::default()));
        Self { tx: Arc::new(tx) }
    }

    /// 整体替换品牌档案，已有的区块结果保持不变
    pub fn set_profile(&self, profile: BrandProfile) {
        debug!("更新品牌档案: {} / 原型 {}", profile.name, profile.prototype);
        self.tx.send_modify(|snapshot| {
            let next = Arc::make_mut(snapshot);
            next.profile = Some(profile);
        });
    }

    /// 插入或覆盖一个区块结果
    ///
    /// 整条记录替换；`brand-dna` 的正文改由当前档案格式化生成
    pub fn upsert_section(&self, id: &str, mut result: SectionResult) {
        self.tx.send_modify(|snapshot| {
            let next = Arc::make_mut(snapshot);
            if id == BRAND_DNA_ID {
                if let Some(profile) = next.profile.as_ref() {
                    result.content = profile.dna_summary();
                }
            }
            next.sections.insert(id.to_string(), result);
        });
        debug!("区块已写入: {}", id);
    }

    /// 当前快照
    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.tx.borrow().clone()
    }

    /// 订阅快照更新
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.tx.subscribe()
    }

    pub fn profile(&self) -> Option<BrandProfile> {
        self.tx.borrow().profile.clone()
    }

    pub fn section(&self, id: &str) -> Option<SectionResult> {
        self.tx.borrow().sections.get(id).cloned()
    }

    /// 会话重启：清空档案和全部区块
    pub fn reset(&self) {
        self.tx.send_replace(Arc::new(BoardSnapshot::default()));
    }
}

impl Default for BrandProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(prototype: &str) -> BrandProfile {
        BrandProfile {
            name: "沐阳".to_string(),
            industry: "茶饮行业".to_string(),
            prototype: prototype.to_string(),
            logo_reference: "https://picsum.photos/seed/沐阳/400/400".to_string(),
            colors: vec!["#2E5E4E".to_string()],
            keywords: vec!["温暖".to_string()],
            target_audience: "年轻白领".to_string(),
            core_values: "自然".to_string(),
        }
    }

    fn result(content: &str) -> SectionResult {
        SectionResult {
            title: "概念构思".to_string(),
            subtitle: "创意构思".to_string(),
            content: content.to_string(),
            image_reference: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = BrandProfileStore::new();
        store.upsert_section("concept", result("正文"));
        let once = store.snapshot();
        store.upsert_section("concept", result("正文"));
        let twice = store.snapshot();
        assert_eq!(*once, *twice);
        assert_eq!(twice.ready_count(), 1);
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let store = BrandProfileStore::new();
        store.upsert_section("concept", result("旧正文"));
        let mut newer = result("新正文");
        newer.image_reference.clear();
        store.upsert_section("concept", newer.clone());
        assert_eq!(store.section("concept"), Some(newer));
    }

    #[test]
    fn test_brand_dna_content_comes_from_profile() {
        let store = BrandProfileStore::new();
        store.set_profile(profile("柴犬"));
        store.upsert_section(BRAND_DNA_ID, result("远端生成的正文"));

        let dna = store.section(BRAND_DNA_ID).unwrap();
        assert!(dna.content.starts_with("形象原型: 柴犬"));
        assert_eq!(dna.image_reference, "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_set_profile_keeps_sections() {
        let store = BrandProfileStore::new();
        store.set_profile(profile("柴犬"));
        store.upsert_section("concept", result("正文"));
        store.set_profile(profile("熊猫"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.profile.as_ref().map(|p| p.prototype.as_str()), Some("熊猫"));
        assert!(snapshot.section("concept").is_some());
    }

    #[test]
    fn test_old_snapshot_is_unchanged_by_later_writes() {
        let store = BrandProfileStore::new();
        store.upsert_section("concept", result("正文"));
        let before = store.snapshot();
        store.upsert_section("form", result("正文"));
        assert_eq!(before.ready_count(), 1);
        assert_eq!(store.snapshot().ready_count(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = BrandProfileStore::new();
        store.set_profile(profile("柴犬"));
        store.upsert_section("concept", result("正文"));
        store.reset();
        assert_eq!(*store.snapshot(), BoardSnapshot::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let store = BrandProfileStore::new();
        let mut rx = store.subscribe();
        store.upsert_section("concept", result("正文"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().ready_count(), 1);
    }
}
