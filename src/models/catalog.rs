//! 看板区块目录
//!
//! 顺序同时决定生成批次的划分和看板的默认展示顺序

use crate::models::section::SectionDescriptor;

/// 品牌 DNA 区块的 ID，正文由品牌档案格式化而来
pub const BRAND_DNA_ID: &str = "brand-dna";

/// 全部 18 个看板区块
pub const SECTION_CATALOG: [SectionDescriptor; 18] = [
    SectionDescriptor::new(BRAND_DNA_ID, "品牌DNA分析", "品牌基础"),
    SectionDescriptor::new("concept", "概念构思", "创意构思"),
    SectionDescriptor::new("form", "形态研究", "形态研究"),
    SectionDescriptor::new("exploration", "概念探索", "草图开发"),
    SectionDescriptor::new("linework", "精细线稿", "精细线稿"),
    SectionDescriptor::new("refinement", "细节精修", "细节精修"),
    SectionDescriptor::new("expressions", "表情设定表", "表情设定"),
    SectionDescriptor::new("poses", "姿势库", "动作姿势"),
    SectionDescriptor::new("turnaround", "转身视图", "转身透视"),
    SectionDescriptor::new("color", "色彩开发", "色彩系统"),
    SectionDescriptor::new("material", "材质规格", "材质规格"),
    SectionDescriptor::new("app-color", "色彩应用", "应用演示"),
    SectionDescriptor::new("tech-guide", "构造指南", "技术规范"),
    SectionDescriptor::new("system-rules", "设计系统规则", "设计规则"),
    SectionDescriptor::new("variants", "资产变体", "资源变体"),
    SectionDescriptor::new("digital", "数字应用", "数字端应用"),
    SectionDescriptor::new("physical", "实物应用", "物料应用"),
    SectionDescriptor::new("final-render", "最终主视觉渲染", "最终渲染"),
];

/// 按 ID 查找区块描述
pub fn find(id: &str) -> Option<&'static SectionDescriptor> {
    SECTION_CATALOG.iter().find(|s| s.id == id)
}

/// 区块在目录中的位置
pub fn position(id: &str) -> Option<usize> {
    SECTION_CATALOG.iter().position(|s| s.id == id)
}

/// 品牌 DNA 区块描述
pub fn brand_dna() -> &'static SectionDescriptor {
    &SECTION_CATALOG[0]
}

/// 目录最后一个区块在看板上作为主视觉展示
pub fn is_hero(id: &str) -> bool {
    SECTION_CATALOG.last().map(|s| s.id == id).unwrap_or(false)
}
