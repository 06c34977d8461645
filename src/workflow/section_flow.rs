//! 区块生成流程 - 流程层
//!
//! 核心职责：定义"一个区块"的完整生成流程
//!
//! 流程：正文 + 插画 两个远端调用并发发出 → 都成功后构建区块结果

use tracing::{debug, info, warn};

use crate::clients::GenerationClient;
use crate::error::AppResult;
use crate::models::{BrandProfile, SectionResult};
use crate::utils::truncate_text;
use crate::workflow::section_ctx::SectionCtx;

/// 区块插画的主题提示词
pub fn image_subject(title: &str) -> String {
    format!("专业角色设计：{}", title)
}

/// 区块生成流程
///
/// - 只处理单个区块
/// - 不关心批次划分和写入状态
pub struct SectionFlow<'a, C: GenerationClient + ?Sized> {
    client: &'a C,
    verbose_logging: bool,
}

impl<'a, C: GenerationClient + ?Sized> SectionFlow<'a, C> {
    pub fn new(client: &'a C, verbose_logging: bool) -> Self {
        Self {
            client,
            verbose_logging,
        }
    }

    /// 生成单个区块
    ///
    /// 任一子调用失败则整个区块失败，不产生只有一半的结果
    pub async fn run(&self, ctx: &SectionCtx, profile: &BrandProfile) -> AppResult<SectionResult> {
        let title = ctx.descriptor.title;
        debug!("{} 开始生成", ctx);

        let subject = image_subject(title);
        let (content, image) = tokio::join!(
            self.client.generate_section_text(title, profile),
            self.client
                .generate_section_image(&subject, &profile.prototype, &profile.name),
        );

        let (content, image) = match (content, image) {
            (Ok(content), Ok(image)) => (content, image),
            (Err(e), image) => {
                warn!("{} ⚠️ 正文生成失败: {}", ctx, e);
                if matches!(&image, Ok(img) if !img.is_empty()) {
                    warn!("{} 插画已生成但正文缺失，本轮不写入该区块", ctx);
                }
                return Err(e);
            }
            (Ok(_), Err(e)) => {
                warn!("{} ⚠️ 插画生成失败，正文一并丢弃: {}", ctx, e);
                return Err(e);
            }
        };

        if self.verbose_logging {
            info!("{} 正文: {}", ctx, truncate_text(&content, 80));
        }
        if image.is_empty() {
            warn!("{} 插画为空，区块将以无图形式展示", ctx);
        }

        Ok(ctx.descriptor.to_result(content, image))
    }
}
