//! 看板导出服务 - 业务能力层
//!
//! 只负责"把快照写到磁盘"：JSON 快照、Markdown 看板、解码后的图片

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{catalog, BrandProfile, SectionDescriptor, SectionResult};
use crate::state::BoardSnapshot;
use crate::utils::image_encoding::{decode_data_uri, extension_for_mime, is_data_uri};

/// 区块缺失时在看板上显示的占位
pub const PLACEHOLDER_IMAGE: &str = "等待资产生成...";
pub const PLACEHOLDER_CONTENT: &str = "正在同步核心数据...";

/// 导出后的区块（按目录顺序）
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportedBlock {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub accent_color: String,
    pub is_hero: bool,
    /// None 表示该区块尚未生成
    pub content: Option<String>,
    /// 图片文件相对路径，或原始 URL
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExportedBoard<'a> {
    generated_at: String,
    profile: Option<&'a BrandProfile>,
    blocks: &'a [ExportedBlock],
}

/// 看板导出服务
pub struct BoardExporter {
    output_dir: PathBuf,
}

impl BoardExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 导出快照
    ///
    /// # 返回
    /// 返回 Markdown 看板的路径
    pub async fn export(
        &self,
        snapshot: &BoardSnapshot,
        catalog: &[SectionDescriptor],
    ) -> AppResult<PathBuf> {
        let images_dir = self.output_dir.join("images");
        fs::create_dir_all(&images_dir)
            .await
            .map_err(|e| AppError::file_write_failed(images_dir.display().to_string(), e))?;

        let mut blocks = Vec::with_capacity(catalog.len());
        for (index, descriptor) in catalog.iter().enumerate() {
            let section = snapshot.section(descriptor.id);
            let image = match section {
                Some(s) => self.write_image(descriptor.id, &s.image_reference).await?,
                None => None,
            };
            blocks.push(build_block(descriptor, index, snapshot.profile.as_ref(), section, image));
        }

        let board = ExportedBoard {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            profile: snapshot.profile.as_ref(),
            blocks: &blocks,
        };
        let json_path = self.output_dir.join("board.json");
        let json = serde_json::to_string_pretty(&board)?;
        self.write_text(&json_path, &json).await?;

        let md_path = self.output_dir.join("board.md");
        self.write_text(&md_path, &render_markdown(snapshot.profile.as_ref(), &blocks))
            .await?;

        info!("✓ 看板已导出: {}", md_path.display());
        Ok(md_path)
    }

    /// data URI 解码落盘；URL 原样保留；空引用返回 None
    async fn write_image(&self, id: &str, reference: &str) -> AppResult<Option<String>> {
        if reference.is_empty() {
            return Ok(None);
        }
        if !is_data_uri(reference) {
            return Ok(Some(reference.to_string()));
        }

        match decode_data_uri(reference) {
            Ok((mime, bytes)) => {
                let file_name = format!("{}.{}", id, extension_for_mime(&mime));
                let path = self.output_dir.join("images").join(&file_name);
                fs::write(&path, bytes)
                    .await
                    .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
                debug!("图片已写入: {}", path.display());
                Ok(Some(format!("images/{}", file_name)))
            }
            Err(e) => {
                warn!("区块 {} 的图片无法解码，跳过: {}", id, e);
                Ok(None)
            }
        }
    }

    async fn write_text(&self, path: &Path, content: &str) -> AppResult<()> {
        fs::write(path, content)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
    }
}

fn build_block(
    descriptor: &SectionDescriptor,
    index: usize,
    profile: Option<&BrandProfile>,
    section: Option<&SectionResult>,
    image: Option<String>,
) -> ExportedBlock {
    ExportedBlock {
        id: descriptor.id.to_string(),
        title: descriptor.title.to_string(),
        subtitle: descriptor.subtitle.to_string(),
        accent_color: profile
            .map(|p| p.accent_color(index).to_string())
            .unwrap_or_else(|| crate::models::brand::DEFAULT_ACCENT_COLOR.to_string()),
        is_hero: catalog::is_hero(descriptor.id),
        content: section.map(|s| s.content.clone()),
        image,
    }
}

/// 渲染 Markdown 看板
pub fn render_markdown(profile: Option<&BrandProfile>, blocks: &[ExportedBlock]) -> String {
    let mut out = String::new();

    match profile {
        Some(p) => {
            out.push_str(&format!("# {} Pro 看板\n\n", p.name));
            out.push_str(&format!("- 行业: {}\n", p.industry));
            out.push_str(&format!("- 形象原型: {}\n", p.prototype));
            out.push_str(&format!("- 主色调: {}\n", p.colors.join(" / ")));
            out.push_str(&format!("- Logo: {}\n\n", logo_label(&p.logo_reference)));
        }
        None => out.push_str("# 加载中 Pro 看板\n\n"),
    }

    for block in blocks {
        let hero = if block.is_hero { " ★" } else { "" };
        out.push_str(&format!("## {}{}\n\n", block.title, hero));
        out.push_str(&format!("> {} · 强调色 `{}`\n\n", block.subtitle, block.accent_color));

        match &block.image {
            Some(image) => out.push_str(&format!("![{}]({})\n\n", block.title, image)),
            None => out.push_str(&format!("_{}_\n\n", PLACEHOLDER_IMAGE)),
        }

        let content = block.content.as_deref().filter(|c| !c.is_empty());
        out.push_str(content.unwrap_or(PLACEHOLDER_CONTENT));
        out.push_str("\n\n");
    }

    out
}

fn logo_label(reference: &str) -> &str {
    if is_data_uri(reference) {
        "已上传"
    } else {
        reference
    }
}
