//! 图像生成服务 - 业务能力层
//!
//! 只负责"生成一张区块插画"能力，走 Gemini 原生 `generateContent` 接口

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, CredentialError};
use crate::infrastructure::CredentialSlot;
use crate::services::llm_service::ENTITY_NOT_FOUND;

/// 图像生成服务
pub struct ImageService {
    http_client: Client,
    credential: CredentialSlot,
    api_base_url: String,
    model_name: String,
}

impl ImageService {
    pub fn new(config: &Config, credential: CredentialSlot) -> Self {
        Self {
            http_client: Client::new(),
            credential,
            api_base_url: config.image_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.image_model_name.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model_name)
    }

    /// 生成区块插画
    ///
    /// # 返回
    /// 返回 `data:image/png;base64,...`；响应里没有图片时返回空字符串
    pub async fn generate_image(
        &self,
        subject_prompt: &str,
        prototype: &str,
        brand_name: &str,
    ) -> AppResult<String> {
        let endpoint = self.endpoint();
        let request = ImageRequest {
            contents: vec![ImageContent {
                parts: vec![TextPart {
                    text: build_image_prompt(subject_prompt, prototype, brand_name),
                }],
            }],
            generation_config: ImageGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                    image_size: "1K".to_string(),
                },
            },
        };

        debug!("调用图像生成 API，模型: {}", self.model_name);

        let response = self
            .http_client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.credential.get().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("图像生成 API 返回错误 ({}): {}", status, message);
            if message.contains(ENTITY_NOT_FOUND) {
                return Err(AppError::Credential(CredentialError::Rejected { message }));
            }
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint,
                status: status.as_u16(),
                message,
            }));
        }

        let body: ImageResponse = response.json().await.map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                source: Box::new(e),
            })
        })?;

        let image = extract_inline_image(&body);
        if image.is_empty() {
            warn!("图像生成响应中没有图片数据");
        }
        Ok(image)
    }
}

/// 图像提示词：区块主题 + 角色原型 + 品牌名 + 固定的画面质量描述
pub fn build_image_prompt(subject_prompt: &str, prototype: &str, brand_name: &str) -> String {
    format!(
        "{} Character is a {} for the brand {}. High-end professional commercial illustration, \
         professional studio lighting, 4K resolution quality, design studio aesthetic, \
         clear white background, technical annotations.",
        subject_prompt, prototype, brand_name
    )
}

/// 取第一个候选里的第一张内联图片
pub fn extract_inline_image(response: &ImageResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
        .map(|data| format!("data:image/png;base64,{}", data.data))
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<ImageContent>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ImageGenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
    #[serde(rename = "imageConfig")]
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
    #[serde(rename = "imageSize")]
    image_size: String,
}

/// `generateContent` 响应
#[derive(Debug, Default, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub candidates: Vec<ImageCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct ImageCandidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "inlineData")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
pub struct InlineData {
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
    pub data: String,
}
