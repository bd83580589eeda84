use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;
use crate::services::scorer::PassThreshold;
use crate::services::speech::SpeechSettings;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 测验通过线（百分比）
    pub pass_threshold: PassThreshold,
    /// 课程内容目录，未设置时使用内置内容
    pub content_dir: Option<String>,
    /// 偏好设置文件
    pub prefs_file: String,
    /// 语音合成程序
    pub speech_command: String,
    /// 语音语言标签
    pub speech_language: String,
    /// 语速
    pub speech_rate: f32,
    /// 音调
    pub speech_pitch: f32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pass_threshold: PassThreshold::default(),
            content_dir: None,
            prefs_file: "prefs.json".to_string(),
            speech_command: "espeak-ng".to_string(),
            speech_language: "ja-JP".to_string(),
            speech_rate: 0.8,
            speech_pitch: 1.0,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let pass_threshold = env_or("PASS_THRESHOLD", default.pass_threshold.percent())
            .and_then(|value: u8| {
                PassThreshold::new(value).map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "PASS_THRESHOLD".to_string(),
                    value: value.to_string(),
                    expected_type: "percentage 0-100".to_string(),
                })
            })
            .unwrap_or_else(|e| {
                warn!("{}，使用默认值", e);
                default.pass_threshold
            });

        Self {
            pass_threshold,
            content_dir: std::env::var("CONTENT_DIR").ok().filter(|v| !v.trim().is_empty()),
            prefs_file: std::env::var("PREFS_FILE").unwrap_or(default.prefs_file),
            speech_command: std::env::var("SPEECH_COMMAND").unwrap_or(default.speech_command),
            speech_language: std::env::var("SPEECH_LANGUAGE").unwrap_or(default.speech_language),
            speech_rate: env_or_default("SPEECH_RATE", default.speech_rate),
            speech_pitch: env_or_default("SPEECH_PITCH", default.speech_pitch),
            verbose_logging: env_or_default("VERBOSE_LOGGING", default.verbose_logging),
        }
    }

    /// 朗读参数
    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            language: self.speech_language.clone(),
            rate: self.speech_rate,
            pitch: self.speech_pitch,
        }
    }
}

/// 读取并解析环境变量；未设置时返回默认值
fn env_or<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(default),
    }
}

fn env_or_default<T: FromStr + Clone>(var_name: &str, default: T) -> T {
    env_or(var_name, default.clone()).unwrap_or_else(|e| {
        warn!("{}，使用默认值", e);
        default
    })
}
