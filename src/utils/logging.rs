use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `brand_name`: 品牌名称
pub fn init_log_file(log_file_path: &str, brand_name: &str) -> Result<()> {
    let log_header = format!(
        "{}\nIP 形象看板生成日志 - {} - {}\n{}\n\n",
        "=".repeat(60),
        brand_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `batch_size`: 每批区块数
/// - `text_model`: 文本模型
/// - `image_model`: 图像模型
pub fn log_startup(batch_size: usize, text_model: &str, image_model: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - IP 形象高级开发系统");
    info!("📊 每批并发区块数: {}", batch_size);
    info!("🧠 推理引擎: {} / 🎨 图像引擎: {}", text_model, image_model);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `section_ids`: 本批区块
pub fn log_batch_start(batch_num: usize, total_batches: usize, section_ids: &[&str]) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始生成第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批区块: {}", section_ids.join(", "));
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `success`: 成功数量
/// - `total`: 批次区块数
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败的区块
/// - `total`: 总数
/// - `output_dir`: 看板导出目录
pub fn print_final_stats(success: usize, failed: &[String], total: usize, output_dir: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 看板生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed.len());
    if !failed.is_empty() {
        info!("   待补区块: {}", failed.join(", "));
    }
    info!("{}", "=".repeat(60));
    info!("\n看板已导出至: {}", output_dir);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
