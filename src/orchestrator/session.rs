//! 品牌会话 - 编排层
//!
//! ## 职责
//!
//! 把凭证门禁、品牌 DNA 分析、批次调度和品牌档案存储串成两个用户操作：
//!
//! 1. **启动设计流程**：门禁 → 分析 → 全部区块分批生成
//! 2. **重新上传 Logo**：门禁 → 只重新分析，刷新档案和 `brand-dna` 区块
//!
//! 同一会话内同时只允许一个操作在进行：生成过程中重新分析或重置都会被拒绝，
//! 否则调度器稍后写出的 `brand-dna` 会覆盖新 Logo。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::GenerationClient;
use crate::error::{AppResult, BusinessError};
use crate::infrastructure::{with_credential, CredentialGate, GateOutcome};
use crate::models::{BrandInput, BrandProfile, SectionDescriptor, SECTION_CATALOG};
use crate::orchestrator::batch_scheduler::{BatchScheduler, RunReport, SchedulerState};
use crate::state::{BoardSnapshot, BrandProfileStore};
use crate::utils::image_encoding::is_data_uri;
use crate::workflow::{AnalysisRequest, BootstrapFlow};

/// 品牌会话
pub struct BrandSession {
    client: Arc<dyn GenerationClient>,
    gate: Arc<dyn CredentialGate>,
    store: BrandProfileStore,
    scheduler: BatchScheduler<dyn GenerationClient>,
    catalog: Vec<SectionDescriptor>,
    generating: AtomicBool,
}

impl BrandSession {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        gate: Arc<dyn CredentialGate>,
        batch_size: usize,
    ) -> Self {
        Self {
            scheduler: BatchScheduler::new(client.clone(), batch_size),
            client,
            gate,
            store: BrandProfileStore::new(),
            catalog: SECTION_CATALOG.to_vec(),
            generating: AtomicBool::new(false),
        }
    }

    /// 替换区块目录
    pub fn with_catalog(mut self, catalog: Vec<SectionDescriptor>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.scheduler = self.scheduler.with_verbose_logging(verbose);
        self
    }

    pub fn store(&self) -> &BrandProfileStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.store.snapshot()
    }

    pub fn catalog(&self) -> &[SectionDescriptor] {
        &self.catalog
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// 启动设计流程
    ///
    /// # 返回
    /// - `Done(report)`: 本轮区块生成统计
    /// - `CredentialReselected`: 远端拒绝凭证，已重新选择 Key，本轮提前结束
    pub async fn start(
        &self,
        input: &BrandInput,
        logo_encoding: Option<&str>,
    ) -> AppResult<GateOutcome<RunReport>> {
        with_credential(self.gate.as_ref(), || {
            self.analyze_and_generate(input, logo_encoding)
        })
        .await
    }

    /// 重新上传 Logo 后刷新品牌 DNA
    ///
    /// 没有传入新 Logo 时沿用上一次上传的 Logo（占位图地址不会回传给分析接口）。
    /// 区块生成进行中时返回 `GenerationInProgress`
    pub async fn reanalyze(
        &self,
        logo_encoding: Option<&str>,
    ) -> AppResult<GateOutcome<BrandProfile>> {
        let current = self.store.profile().ok_or(BusinessError::ProfileMissing)?;
        let _flight = FlightGuard::acquire(&self.generating)?;

        let logo = logo_encoding
            .map(str::to_string)
            .or_else(|| Some(current.logo_reference.clone()).filter(|l| is_data_uri(l)));

        with_credential(self.gate.as_ref(), || async {
            let flow = BootstrapFlow::new(self.client.as_ref(), &self.store);
            flow.analyze(AnalysisRequest {
                name: &current.name,
                industry: &current.industry,
                prototype: Some(current.prototype.as_str()),
                logo_encoding: logo.as_deref(),
            })
            .await
        })
        .await
    }

    /// 会话重启：清空档案和全部区块
    pub fn reset(&self) -> AppResult<()> {
        if self.generating.load(Ordering::SeqCst) {
            return Err(BusinessError::GenerationInProgress.into());
        }
        self.store.reset();
        Ok(())
    }

    async fn analyze_and_generate(
        &self,
        input: &BrandInput,
        logo_encoding: Option<&str>,
    ) -> AppResult<RunReport> {
        let _flight = FlightGuard::acquire(&self.generating)?;

        let flow = BootstrapFlow::new(self.client.as_ref(), &self.store);
        let profile = flow
            .analyze(AnalysisRequest {
                name: &input.name,
                industry: &input.industry,
                prototype: input.prototype(),
                logo_encoding,
            })
            .await?;

        info!(
            "🧩 开始生成 {} 个看板区块（每批 {} 个）",
            self.catalog.len(),
            self.scheduler.batch_size()
        );

        let store = &self.store;
        let report = self
            .scheduler
            .run(&self.catalog, &profile, |id, result| {
                store.upsert_section(id, result)
            })
            .await?;

        if !report.failed.is_empty() {
            warn!("⚠️ 以下区块本轮未生成: {}", report.failed.join(", "));
        }

        Ok(report)
    }
}

/// 会话级单飞标记
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> AppResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| BusinessError::GenerationInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
