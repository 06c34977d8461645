//! 品牌 DNA 分析流程 - 流程层
//!
//! 一次分析调用确定品牌档案，并写入合成的 `brand-dna` 区块。
//! 首次启动和重新上传 Logo 都走这里；它不会触发其他区块的生成。

use tracing::{error, info};

use crate::clients::GenerationClient;
use crate::error::AppResult;
use crate::models::{catalog, BrandProfile};
use crate::state::BrandProfileStore;

/// 分析请求
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub name: &'a str,
    pub industry: &'a str,
    pub prototype: Option<&'a str>,
    pub logo_encoding: Option<&'a str>,
}

/// 品牌 DNA 分析流程
pub struct BootstrapFlow<'a, C: GenerationClient + ?Sized> {
    client: &'a C,
    store: &'a BrandProfileStore,
}

impl<'a, C: GenerationClient + ?Sized> BootstrapFlow<'a, C> {
    pub fn new(client: &'a C, store: &'a BrandProfileStore) -> Self {
        Self { client, store }
    }

    /// 执行分析并写入存储
    ///
    /// 分析失败时不写入任何状态，错误原样返回
    pub async fn analyze(&self, request: AnalysisRequest<'_>) -> AppResult<BrandProfile> {
        info!(
            "🧬 品牌 DNA 分析: {} ({}){}",
            request.name,
            request.industry,
            if request.logo_encoding.is_some() { " + Logo" } else { "" }
        );

        let analysis = self
            .client
            .analyze_brand(
                request.name,
                request.industry,
                request.prototype,
                request.logo_encoding,
            )
            .await
            .map_err(|e| {
                error!("品牌 DNA 提取失败: {}", e);
                e
            })?;

        let profile = BrandProfile::from_analysis(
            request.name,
            request.industry,
            request.prototype,
            request.logo_encoding,
            analysis,
        );

        self.store.set_profile(profile.clone());

        let dna = catalog::brand_dna();
        self.store.upsert_section(
            dna.id,
            dna.to_result(profile.dna_summary(), profile.logo_reference.clone()),
        );

        info!(
            "✓ 品牌 DNA 已更新: 原型 {} | 主色调 {}",
            profile.prototype,
            profile.colors.join(", ")
        );

        Ok(profile)
    }
}
