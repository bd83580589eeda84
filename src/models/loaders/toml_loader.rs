use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::models::alphabet::AlphabetSet;
use crate::models::catalog::Catalog;
use crate::models::lesson::Lesson;

/// 课程文件名
pub const LESSONS_FILE: &str = "lessons.toml";
/// 假名表文件名
pub const ALPHABET_FILE: &str = "alphabet.toml";

const EMBEDDED_LESSONS: &str = include_str!("../../../content/lessons.toml");
const EMBEDDED_ALPHABET: &str = include_str!("../../../content/alphabet.toml");

#[derive(Debug, Deserialize)]
struct LessonsFile {
    lessons: Vec<Lesson>,
}

#[derive(Debug, Deserialize)]
struct AlphabetFile {
    sets: Vec<AlphabetSet>,
}

/// 解析课程 TOML
pub fn parse_lessons(content: &str, origin: &str) -> Result<Vec<Lesson>> {
    let file: LessonsFile =
        toml::from_str(content).with_context(|| format!("无法解析课程文件: {}", origin))?;
    Ok(file.lessons)
}

/// 解析假名表 TOML（笔顺路径在这一步完成解析）
pub fn parse_alphabets(content: &str, origin: &str) -> Result<Vec<AlphabetSet>> {
    let file: AlphabetFile =
        toml::from_str(content).with_context(|| format!("无法解析假名文件: {}", origin))?;
    Ok(file.sets)
}

/// 加载内置课程内容
pub fn load_embedded_catalog() -> Result<Catalog> {
    let lessons = parse_lessons(EMBEDDED_LESSONS, "<embedded lessons>")?;
    let alphabets = parse_alphabets(EMBEDDED_ALPHABET, "<embedded alphabet>")?;
    Catalog::new(lessons, alphabets).context("内置课程内容校验失败")
}

/// 从目录加载 lessons.toml 与 alphabet.toml
pub async fn load_catalog_from_dir(folder_path: &str) -> Result<Catalog> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let lessons_path = folder.join(LESSONS_FILE);
    let alphabet_path = folder.join(ALPHABET_FILE);

    let lessons = parse_lessons(
        &read_file(&lessons_path).await?,
        &lessons_path.display().to_string(),
    )?;
    tracing::info!("正在加载: {} ({} 节课)", lessons_path.display(), lessons.len());

    let alphabets = parse_alphabets(
        &read_file(&alphabet_path).await?,
        &alphabet_path.display().to_string(),
    )?;
    tracing::info!(
        "正在加载: {} ({} 套假名表)",
        alphabet_path.display(),
        alphabets.len()
    );

    Catalog::new(lessons, alphabets)
        .with_context(|| format!("课程内容校验失败: {}", folder_path))
}

/// 按配置加载：指定目录则读目录，否则使用内置内容
pub async fn load_catalog(content_dir: Option<&str>) -> Result<Catalog> {
    match content_dir {
        Some(dir) => load_catalog_from_dir(dir).await,
        None => load_embedded_catalog(),
    }
}

async fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", path.display()))
}
