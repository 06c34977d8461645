use crate::error::{AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 每批并发生成的区块数量
    pub section_batch_size: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 看板导出目录
    pub output_dir: String,
    // --- 品牌输入 ---
    pub brand_name: String,
    pub brand_industry: String,
    pub brand_prototype: Option<String>,
    pub logo_path: Option<String>,
    /// TOML 格式的品牌简报（优先于上面的单项配置）
    pub brand_brief_file: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// API Key 文件（凭证选择流程从这里重新读取）
    pub credential_file: Option<String>,
    // --- 图像生成配置 ---
    pub image_api_base_url: String,
    pub image_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            section_batch_size: 3,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            output_dir: "output_board".to_string(),
            brand_name: "沐阳".to_string(),
            brand_industry: "茶饮行业".to_string(),
            brand_prototype: None,
            logo_path: None,
            brand_brief_file: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-3-pro-preview".to_string(),
            credential_file: None,
            image_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_model_name: "gemini-3-pro-image-preview".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            section_batch_size: std::env::var("SECTION_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0).unwrap_or(default.section_batch_size),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            brand_name: std::env::var("BRAND_NAME").unwrap_or(default.brand_name),
            brand_industry: std::env::var("BRAND_INDUSTRY").unwrap_or(default.brand_industry),
            brand_prototype: non_empty_var("BRAND_PROTOTYPE").or(default.brand_prototype),
            logo_path: non_empty_var("LOGO_PATH").or(default.logo_path),
            brand_brief_file: non_empty_var("BRAND_BRIEF_FILE").or(default.brand_brief_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            credential_file: non_empty_var("CREDENTIAL_FILE").or(default.credential_file),
            image_api_base_url: std::env::var("IMAGE_API_BASE_URL").unwrap_or(default.image_api_base_url),
            image_model_name: std::env::var("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
        }
    }

    /// 校验必填项
    ///
    /// 指定了简报文件时品牌名称和行业以简报为准，不在这里检查
    pub fn validate(&self) -> AppResult<()> {
        let mut required = vec![
            ("LLM_MODEL_NAME", &self.llm_model_name),
            ("IMAGE_MODEL_NAME", &self.image_model_name),
            ("OUTPUT_DIR", &self.output_dir),
        ];
        if self.brand_brief_file.is_none() {
            required.push(("BRAND_NAME", &self.brand_name));
            required.push(("BRAND_INDUSTRY", &self.brand_industry));
        }

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_size_is_three() {
        let config = Config::default();
        assert_eq!(config.section_batch_size, 3);
        assert_eq!(config.brand_name, "沐阳");
        assert_eq!(config.brand_industry, "茶饮行业");
        assert!(config.brand_prototype.is_none());
    }

    #[test]
    fn test_validate_requires_brand_without_brief() {
        let mut config = Config {
            brand_name: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        config.brand_brief_file = Some("briefs/muyang.toml".to_string());
        assert!(config.validate().is_ok());
    }
}
