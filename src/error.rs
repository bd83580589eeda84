use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 课程内容错误
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    /// 测验操作错误
    #[error("quiz error: {0}")]
    Quiz(#[from] QuizError),
    /// 导航错误
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),
    /// 语音合成错误
    #[error("speech error: {0}")]
    Speech(#[from] SpeechError),
    /// 本地存储错误
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// 配置错误
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// 无法识别的命令
    #[error("unknown command: {command} (type help)")]
    UnknownCommand { command: String },
    /// 命令参数错误
    #[error("invalid argument {value:?}: expected {expected}")]
    InvalidArgument {
        value: String,
        expected: &'static str,
    },
}

/// 课程内容错误（加载与校验阶段）
#[derive(Debug, Error)]
pub enum ContentError {
    /// 课程 ID 重复
    #[error("duplicate lesson id {id}")]
    DuplicateLessonId { id: u32 },
    /// 题目选项不包含正确答案，或包含多次
    #[error("lesson {lesson_id} question {question_id}: correct answer {answer:?} appears {count} times among options")]
    InvalidOptions {
        lesson_id: u32,
        question_id: u32,
        answer: String,
        count: usize,
    },
    /// 笔顺路径无法解析
    #[error("invalid stroke path {path:?}: {reason}")]
    InvalidStrokePath { path: String, reason: String },
    /// 缺少假名表
    #[error("missing alphabet set: {kind}")]
    MissingAlphabet { kind: String },
}

/// 测验操作错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// 题号超出范围（下标从 0 开始，显示从 1 开始）
    #[error("question {} is out of range (quiz has {total} questions)", .index + 1)]
    QuestionOutOfRange { index: usize, total: usize },
    /// 尚未回答全部题目
    #[error("answer all questions ({answered}/{total})")]
    Incomplete { answered: usize, total: usize },
    /// 已显示结果，不能再修改答案
    #[error("results are already shown; retry to change answers")]
    ResultsShown,
    /// 通过线不在 0..=100 范围内
    #[error("pass threshold {value} is not a percentage")]
    InvalidThreshold { value: u32 },
}

/// 导航错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// 未知路由
    #[error("unknown route: {path}")]
    UnknownRoute { path: String },
    /// 不能跳到尚未到达的步骤
    #[error("step {} is locked (current step is {})", .requested + 1, .current + 1)]
    StepLocked { requested: usize, current: usize },
    /// 步骤编号不存在
    #[error("step {} does not exist (lesson has {total} steps)", .index + 1)]
    StepOutOfRange { index: usize, total: usize },
    /// 卡片编号不存在
    #[error("card {} does not exist (deck has {total} cards)", .index + 1)]
    CardOutOfRange { index: usize, total: usize },
}

/// 语音合成错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// 平台没有语音能力
    #[error("Text-to-speech is not supported on this system")]
    NotSupported,
    /// 同一条目正在播放
    #[error("{key} is already playing")]
    Busy { key: String },
    /// 播放失败
    #[error("playback failed: {0}")]
    PlaybackFailed(String),
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取失败
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("malformed preferences file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("environment variable {var_name} has invalid value {value:?} (expected {expected_type})")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建题号越界错误
    pub fn question_out_of_range(index: usize, total: usize) -> Self {
        AppError::Quiz(QuizError::QuestionOutOfRange { index, total })
    }

    /// 创建参数错误
    pub fn invalid_argument(value: impl Into<String>, expected: &'static str) -> Self {
        AppError::InvalidArgument {
            value: value.into(),
            expected,
        }
    }

    /// 创建存储读取错误
    pub fn storage_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Storage(StorageError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建存储写入错误
    pub fn storage_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
