/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// 日志写到 stderr，课本内容走 stdout，两者互不干扰。
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 日语电子课本启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 测验通过线: {}%", config.pass_threshold.percent());
    match &config.content_dir {
        Some(dir) => info!("📁 课程内容目录: {}", dir),
        None => info!("📁 使用内置课程内容"),
    }
    info!("🔊 语音程序: {}", config.speech_command);
    info!("{}", "=".repeat(60));
}

/// 记录内容加载信息
pub fn log_catalog_loaded(lessons: usize, questions: usize, characters: usize) {
    info!(
        "✓ 已加载 {} 节课、{} 道测验题、{} 个假名",
        lessons, questions, characters
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("こんにちは", 3), "こんに...");
        assert_eq!(truncate_text("hello", 10), "hello");
    }
}
