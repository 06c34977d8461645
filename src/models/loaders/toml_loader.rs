use crate::models::brand::BrandInput;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载品牌简报
///
/// 简报中的相对 Logo 路径按简报所在目录解析
pub async fn load_brand_brief(toml_file_path: &Path) -> Result<BrandInput> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取品牌简报: {}", toml_file_path.display()))?;

    let mut input = parse_brand_brief(&content)
        .with_context(|| format!("无法解析品牌简报: {}", toml_file_path.display()))?;

    if let Some(logo) = input.logo_path.as_ref().filter(|p| p.is_relative()) {
        if let Some(dir) = toml_file_path.parent() {
            input.logo_path = Some(dir.join(logo));
        }
    }

    tracing::info!("✓ 已加载品牌简报: {} ({})", input.name, input.industry);

    Ok(input)
}

/// 解析品牌简报文本
pub fn parse_brand_brief(content: &str) -> Result<BrandInput> {
    let input: BrandInput = toml::from_str(content)?;
    if input.name.trim().is_empty() {
        anyhow::bail!("品牌名称不能为空");
    }
    Ok(input)
}
