//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责页面调度和事件循环，是整个应用的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主循环
//! - 管理应用生命周期（初始化、运行、结束）
//! - 按路由创建和丢弃页面状态
//! - 把输入命令分发给当前页面
//! - 同时等待用户输入与朗读结束事件
//!
//! ### `router` - 路由解析
//! ### `screens` - 页面渲染（纯函数）
//! ### `quiz_cta` - 悬浮测验入口
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一行输入)
//!     ↓
//! workflow (LessonView / QuizSession / FlashcardDeck)
//!     ↓
//! services (能力层：generator / scorer / speech / prefs)
//!     ↓
//! models (Catalog：课程与假名表)
//! ```

pub mod app;
pub mod quiz_cta;
pub mod router;
pub mod screens;

// 重新导出主要类型
pub use app::{App, Reply};
pub use quiz_cta::{floating_quiz_prompt, QuizPrompt};
pub use router::{Route, Router};
