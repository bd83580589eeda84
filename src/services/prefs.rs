//! 偏好设置存储
//!
//! 字符串键值对，存成一个 JSON 文件。文件不存在视为空。

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, StorageError};

/// 悬浮测验入口是否被关闭，值为 "1"
pub const HIDE_FLOATING_QUIZ_CTA: &str = "hideFloatingQuizCTA";

#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PrefsStore {
    /// 读取偏好设置
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let shown = path.display().to_string();

        let values = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| {
                AppError::Storage(StorageError::Malformed {
                    path: shown.clone(),
                    source,
                })
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("偏好设置文件不存在，使用空设置: {}", shown);
                BTreeMap::new()
            }
            Err(e) => return Err(AppError::storage_read_failed(shown, e)),
        };

        Ok(Self { path, values })
    }

    /// 不落盘的空设置
    pub fn in_memory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_set(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// 写入一个键并立即保存
    pub async fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> AppResult<()> {
        let key = key.into();
        let value = value.into();
        info!("保存偏好设置: {} = {}", key, value);
        self.values.insert(key, value);
        self.save().await
    }

    async fn save(&self) -> AppResult<()> {
        let shown = self.path.display().to_string();
        let json = serde_json::to_string_pretty(&self.values).map_err(|source| {
            AppError::Storage(StorageError::Malformed {
                path: shown.clone(),
                source,
            })
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage_write_failed(shown.clone(), e))?;
        }

        fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::storage_write_failed(shown, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
