//! 悬浮测验入口

use crate::orchestrator::router::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPrompt {
    pub label: &'static str,
    pub target: Route,
}

/// 当前页面要显示的测验入口
///
/// 首页、测验页、"未找到"页不显示，用户关闭后也不再显示。
/// 课程页指向本课测验，其他页面指向测验列表。
pub fn floating_quiz_prompt(route: Route, found: bool, dismissed: bool) -> Option<QuizPrompt> {
    if dismissed || !found || route == Route::Home || route.is_quiz() {
        return None;
    }

    let prompt = match route {
        Route::Lesson(id) => QuizPrompt {
            label: "Take Quiz",
            target: Route::Quiz(id),
        },
        _ => QuizPrompt {
            label: "Practice Quiz",
            target: Route::Quizzes,
        },
    };
    Some(prompt)
}
