//! 远端生成客户端
//!
//! 把品牌分析、区块正文、区块插画三种远端调用收拢成一个接口，
//! 流程层和编排层只依赖这个 trait

use async_trait::async_trait;

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::CredentialSlot;
use crate::models::{BrandAnalysis, BrandProfile};
use crate::services::{ImageService, LlmService};

/// 远端生成能力
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// 品牌 DNA 分析（可附带上传 Logo 的 data URI）
    async fn analyze_brand(
        &self,
        name: &str,
        industry: &str,
        prototype: Option<&str>,
        logo_encoding: Option<&str>,
    ) -> AppResult<BrandAnalysis>;

    /// 区块技术说明
    async fn generate_section_text(
        &self,
        section_title: &str,
        profile: &BrandProfile,
    ) -> AppResult<String>;

    /// 区块插画；响应没有图片时返回空字符串
    async fn generate_section_image(
        &self,
        subject_prompt: &str,
        prototype: &str,
        brand_name: &str,
    ) -> AppResult<String>;
}

/// 生产环境实现：文本走 OpenAI 兼容端点，图片走 Gemini 原生端点
pub struct GeminiGenerationClient {
    llm_service: LlmService,
    image_service: ImageService,
}

impl GeminiGenerationClient {
    pub fn new(config: &Config, credential: CredentialSlot) -> Self {
        Self {
            llm_service: LlmService::new(config, credential.clone()),
            image_service: ImageService::new(config, credential),
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiGenerationClient {
    async fn analyze_brand(
        &self,
        name: &str,
        industry: &str,
        prototype: Option<&str>,
        logo_encoding: Option<&str>,
    ) -> AppResult<BrandAnalysis> {
        self.llm_service
            .analyze_brand(name, industry, prototype, logo_encoding)
            .await
    }

    async fn generate_section_text(
        &self,
        section_title: &str,
        profile: &BrandProfile,
    ) -> AppResult<String> {
        self.llm_service
            .generate_section_text(section_title, profile)
            .await
    }

    async fn generate_section_image(
        &self,
        subject_prompt: &str,
        prototype: &str,
        brand_name: &str,
    ) -> AppResult<String> {
        self.image_service
            .generate_image(subject_prompt, prototype, brand_name)
            .await
    }
}
