//! LLM 服务 - 业务能力层
//!
//! 只负责"文本生成"能力：品牌 DNA 分析和区块技术说明
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Gemini 的 OpenAI 兼容端点等）
//! - 上传的 Logo 以 data URI 形式走 Vision 消息

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use regex::Regex;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, CredentialError, LlmError};
use crate::infrastructure::CredentialSlot;
use crate::models::{BrandAnalysis, BrandProfile};

/// 远端返回空正文时的占位文本
pub const PENDING_CONTENT: &str = "数据生成中...";

/// 远端拒绝凭证时的错误信息特征
pub const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 进行品牌分析
/// - 为单个区块生成技术说明
/// - 不关心批次和区块顺序
pub struct LlmService {
    credential: CredentialSlot,
    api_base_url: String,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config, credential: CredentialSlot) -> Self {
        Self {
            credential,
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 每次调用都按最新凭证构建客户端
    fn client(&self) -> Client<OpenAIConfig> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(self.credential.get().unwrap_or_default())
            .with_api_base(&self.api_base_url);
        Client::with_config(openai_config)
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `imgs`: 图片 URL / data URI 列表（可选），会追加到用户消息中
    /// - `response_format`: 声明的输出格式（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（可能为空字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
        max_tokens: u32,
        response_format: Option<ResponseFormat>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = match imgs.filter(|urls| !urls.is_empty()) {
            Some(img_urls) => {
                let mut content_parts: Vec<ChatCompletionRequestUserMessageContentPart> =
                    Vec::new();

                // 图片在前，文字在后
                for url in img_urls.iter() {
                    content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(ImageDetail::High),
                            },
                        },
                    ));
                }
                content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: user_message.to_string(),
                    },
                ));

                debug!("使用 Vision API，包含 {} 张图片", img_urls.len());

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(
                        content_parts,
                    ))
                    .build()
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build(),
        }
        .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = self.build_request(messages, max_tokens, response_format)?;

        let response = self.client().chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_remote_error(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .first()
            .ok_or_else(|| AppError::Llm(LlmError::EmptyResponse {
                model: self.model_name.clone(),
            }))?;

        Ok(choice
            .message
            .content
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// 组装请求体
    pub fn build_request(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        max_tokens: u32,
        response_format: Option<ResponseFormat>,
    ) -> AppResult<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(max_tokens);
        if let Some(format) = response_format {
            args.response_format(format);
        }
        args.build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))
    }

    /// 品牌 DNA 分析
    ///
    /// 返回内容必须能按 `BrandAnalysis` 结构解析，否则视为致命错误
    pub async fn analyze_brand(
        &self,
        name: &str,
        industry: &str,
        prototype: Option<&str>,
        logo_encoding: Option<&str>,
    ) -> AppResult<BrandAnalysis> {
        let user_message =
            build_analysis_prompt(name, industry, prototype, logo_encoding.is_some());
        let imgs: Option<Vec<String>> = logo_encoding.map(|logo| vec![logo.to_string()]);

        let response = self
            .send_to_llm(
                &user_message,
                Some(ANALYSIS_SYSTEM_MESSAGE),
                imgs.as_deref(),
                2048,
                Some(analysis_response_format()),
            )
            .await?;

        parse_analysis_response(&response)
    }

    /// 为一个看板区块生成技术说明
    ///
    /// 远端返回空正文时使用占位文本，不视为错误
    pub async fn generate_section_text(
        &self,
        section_title: &str,
        profile: &BrandProfile,
    ) -> AppResult<String> {
        let prompt = build_section_prompt(section_title, profile);
        let content = self.send_to_llm(&prompt, None, None, 4096, None).await?;

        if content.is_empty() {
            warn!("区块 {} 返回正文为空，使用占位文本", section_title);
            return Ok(PENDING_CONTENT.to_string());
        }
        Ok(content)
    }
}

const ANALYSIS_SYSTEM_MESSAGE: &str = "你是一名资深的品牌视觉分析师。\
    只返回一个 JSON 对象，字段为 colors（HEX 字符串数组）、keywords（字符串数组）、\
    targetAudience（字符串）、coreValues（字符串），以及可选的 suggestedPrototype（字符串）。\
    不要返回任何其他内容。";

/// 品牌分析的结构化输出声明，字段与 `BrandAnalysis` 一致
pub fn analysis_response_format() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("品牌 DNA 分析结果".to_string()),
            name: "brand_analysis".to_string(),
            schema: Some(json!({
                "type": "object",
                "properties": {
                    "colors": { "type": "array", "items": { "type": "string" } },
                    "keywords": { "type": "array", "items": { "type": "string" } },
                    "targetAudience": { "type": "string" },
                    "coreValues": { "type": "string" },
                    "suggestedPrototype": { "type": "string" }
                },
                "required": ["colors", "keywords", "targetAudience", "coreValues"]
            })),
            strict: None,
        },
    }
}

/// 构建品牌分析提示词
pub fn build_analysis_prompt(
    name: &str,
    industry: &str,
    prototype: Option<&str>,
    has_logo: bool,
) -> String {
    let prototype_instruction = match prototype.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => format!("核心形象原型已设定为：\"{}\"。", p),
        None => "核心形象原型未设定，请根据上传的 Logo 视觉风格、线条特征或品牌隐喻，\
                 建议一个最契合的形象原型（如某种动物、植物或几何角色）。"
            .to_string(),
    };

    if has_logo {
        format!(
            r#"请仔细分析上传的真实品牌 Logo 图片。品牌名称为"{name}"，行业为"{industry}"。
你的任务是基于这张现有的 Logo 图片提取其品牌基因，严禁提出任何重新设计或修改 Logo 的建议。
{prototype_instruction}
请严格基于图片的视觉事实进行提取：
1. 色彩系统：提取图片中实际使用的品牌主色及辅助色（需提供准确的 HEX 色值）；
2. 品牌性格：提取 5-6 个能准确描述该 Logo 视觉风格的性格关键词；
3. 受众画像：基于视觉语言描述该品牌的目标受众特征；
4. 核心价值：推导该视觉表现背后传递的核心价值理念；
5. 形象原型建议：如果输入原型为空，请返回建议的 "suggestedPrototype"。
请务必使用中文（简体）以 JSON 格式返回。"#
        )
    } else {
        format!(
            r#"为品牌 "{name}"（行业：{industry}）创建一个专业的品牌 DNA 分析。{prototype_instruction}
建议：
1. 3个核心 HEX 颜色值；
2. 5-6个品牌性格关键词；
3. 目标受众描述；
4. 核心价值描述；
5. 如果未设定原型，请返回建议的 "suggestedPrototype"。
请务必使用中文（简体）以 JSON 格式返回。"#
        )
    }
}

/// 构建区块技术说明提示词
pub fn build_section_prompt(section_title: &str, profile: &BrandProfile) -> String {
    format!(
        r#"为品牌IP角色开发看板的 "{}" 部分生成专业的技术设计注释和描述。
品牌：{}（{}）
角色形象原型：{}
品牌关键词：{}
风格：现代、商业设计文档、专业、精细。
请提供详细的、听起来很专业的技术说明、尺寸标注建议和设计理念。请务必使用中文（简体）以列表形式回答。"#,
        section_title,
        profile.name,
        profile.industry,
        profile.prototype,
        profile.keywords.join(", ")
    )
}

/// 解析品牌分析响应
///
/// 允许模型用 ```json 代码块包裹，或在 JSON 对象前后带说明文字
pub fn parse_analysis_response(response: &str) -> AppResult<BrandAnalysis> {
    let json_text = extract_json_block(response);
    serde_json::from_str::<BrandAnalysis>(json_text).map_err(|e| {
        warn!("品牌分析结果无法解析: {}", e);
        AppError::Llm(LlmError::SchemaViolation {
            response: crate::utils::logging::truncate_text(response, 200),
            source: Box::new(e),
        })
    })
}

fn extract_json_block(response: &str) -> &str {
    let trimmed = response.trim();
    let fenced = Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```")
        .ok()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    if let Some(block) = fenced {
        return block;
    }

    // 没有代码块时取最外层花括号
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// 远端错误分类：凭证被拒绝单独归类，便于门禁重新选择 Key
pub fn classify_remote_error(
    model: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> AppError {
    let message = err.to_string();
    if message.contains(ENTITY_NOT_FOUND) {
        AppError::Credential(CredentialError::Rejected { message })
    } else {
        AppError::llm_api_failed(model, err)
    }
}
