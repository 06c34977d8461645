use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 看板区块描述（静态数据）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionDescriptor {
    /// 唯一标识
    pub id: &'static str,
    /// 显示标题
    pub title: &'static str,
    /// 显示副标题
    pub subtitle: &'static str,
}

impl SectionDescriptor {
    pub const fn new(id: &'static str, title: &'static str, subtitle: &'static str) -> Self {
        Self {
            id,
            title,
            subtitle,
        }
    }

    /// 用生成好的正文和图片构建区块结果
    pub fn to_result(&self, content: String, image_reference: String) -> SectionResult {
        SectionResult {
            title: self.title.to_string(),
            subtitle: self.subtitle.to_string(),
            content,
            image_reference,
        }
    }
}

/// 单个区块的生成结果
///
/// 正文和图片都拿到之后才会构建，不存在只有一半的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub title: String,
    pub subtitle: String,
    /// 生成的技术说明正文
    pub content: String,
    /// 图片 data URI 或 URL，可能为空
    pub image_reference: String,
}

/// 区块 ID → 区块结果；缺少某个 key 表示该区块尚未生成
pub type SectionResultMap = HashMap<String, SectionResult>;
