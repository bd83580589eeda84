//! # Nihongo EBook
//!
//! 一本在终端里阅读的日语电子课本：分步课程、测验、假名卡片与笔顺
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 课程、测验题、假名与笔顺路径，加载后只读
//! - `Catalog` - 全部课程与两套假名表
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心页面
//! - `quiz_generator` - 从词汇、语法生成小测验
//! - `scorer` - 评分与通过线
//! - `speech` - 日语朗读
//! - `prefs` - 偏好设置存储
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 一个页面内部的状态变化
//! - `LessonStepper` / `LessonView` - 课程分步导航
//! - `QuizSession` - 作答、提交、重做
//! - `FlashcardDeck` - 假名卡片浏览
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 事件循环与命令分发
//! - `orchestrator/router` - 路由解析
//! - `orchestrator/screens` - 页面渲染
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{load_catalog, load_embedded_catalog, Catalog, Lesson};
pub use orchestrator::{App, Reply, Route};
pub use services::{PassThreshold, QuizScore};
pub use workflow::{FlashcardDeck, LessonStepper, LessonView, QuizSession};
