//! 品牌数据模型
//!
//! 包含用户输入的品牌简报、品牌分析接口的返回结构，以及会话内唯一的品牌档案

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 未设定原型且远端也没有给出建议时使用的原型
pub const FALLBACK_PROTOTYPE: &str = "拟人化形象";

/// 用户提交的品牌简报
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandInput {
    /// 品牌名称
    pub name: String,
    /// 行业领域
    pub industry: String,
    /// 形象原型（选填）
    #[serde(default)]
    pub prototype: Option<String>,
    /// Logo 图片路径（选填）
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
}

impl BrandInput {
    pub fn new(name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            prototype: None,
            logo_path: None,
        }
    }

    pub fn with_prototype(mut self, prototype: impl Into<String>) -> Self {
        self.prototype = Some(prototype.into());
        self
    }

    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    /// 去掉空白后的原型，空字符串视为未设定
    pub fn prototype(&self) -> Option<&str> {
        self.prototype
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// 品牌分析接口声明的返回结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAnalysis {
    pub colors: Vec<String>,
    pub keywords: Vec<String>,
    pub target_audience: String,
    pub core_values: String,
    #[serde(default)]
    pub suggested_prototype: Option<String>,
}

/// 品牌档案
///
/// 一个会话只有一份生效的档案，重新分析时整体替换
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub name: String,
    pub industry: String,
    /// 形象原型，一旦确定在整个会话内保持不变
    pub prototype: String,
    /// 上传 Logo 的 data URI，或占位图地址
    pub logo_reference: String,
    /// HEX 色值，顺序决定各区块的强调色
    pub colors: Vec<String>,
    pub keywords: Vec<String>,
    pub target_audience: String,
    pub core_values: String,
}

impl BrandProfile {
    /// 由品牌分析结果构建档案
    ///
    /// 原型优先级：用户输入 → 远端建议 → `拟人化形象`；
    /// Logo 优先级：上传图片 → 以品牌名为种子的占位图
    pub fn from_analysis(
        name: &str,
        industry: &str,
        prototype: Option<&str>,
        logo_encoding: Option<&str>,
        analysis: BrandAnalysis,
    ) -> Self {
        let suggested = analysis
            .suggested_prototype
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let prototype = prototype
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or(suggested)
            .unwrap_or(FALLBACK_PROTOTYPE)
            .to_string();

        let logo_reference = match logo_encoding {
            Some(logo) if !logo.is_empty() => logo.to_string(),
            _ => placeholder_logo(name),
        };

        Self {
            name: name.to_string(),
            industry: industry.to_string(),
            prototype,
            logo_reference,
            colors: analysis.colors,
            keywords: analysis.keywords,
            target_audience: analysis.target_audience,
            core_values: analysis.core_values,
        }
    }

    /// 品牌 DNA 区块的正文
    pub fn dna_summary(&self) -> String {
        format!(
            "形象原型: {}\n主色调: {}\n核心关键词: {}\n受众定位: {}\n品牌使命: {}",
            self.prototype,
            self.colors.join(", "),
            self.keywords.join(", "),
            self.target_audience,
            self.core_values
        )
    }

    /// 按顺序取强调色，色板为空时返回默认蓝色
    pub fn accent_color(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            DEFAULT_ACCENT_COLOR
        } else {
            &self.colors[index % self.colors.len()]
        }
    }
}

/// 色板为空时的强调色
pub const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";

/// 没有上传 Logo 时的占位图
pub fn placeholder_logo(name: &str) -> String {
    format!("https://picsum.photos/seed/{}/400/400", name)
}
