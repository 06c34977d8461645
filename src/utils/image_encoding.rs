//! 图片与 data URI 互转
//!
//! 上传的 Logo 读成 `data:{mime};base64,...`，导出时再把生成的图片解码回文件

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

use crate::error::{AppError, AppResult, FileError};

/// 读取图片文件并编码为 data URI
pub async fn encode_image_file(path: &Path) -> AppResult<String> {
    if !path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    Ok(encode_data_uri(mime_for_path(path), &bytes))
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// 解码 data URI，返回 (mime, 原始字节)
pub fn decode_data_uri(uri: &str) -> AppResult<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| invalid("缺少 data: 前缀"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("缺少逗号分隔"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("只支持 base64 编码"))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&e.to_string()))?;

    Ok((mime.to_string(), bytes))
}

pub fn is_data_uri(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// 按扩展名推断 MIME，未知格式按 PNG 处理
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

/// MIME 对应的文件扩展名
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

fn invalid(reason: &str) -> AppError {
    AppError::File(FileError::InvalidImageEncoding {
        reason: reason.to_string(),
    })
}
