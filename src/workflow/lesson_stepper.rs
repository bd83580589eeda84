//! 课程分步导航
//!
//! 介绍 → 词汇 → 语法 → 会话 → [文化注释] → 总结
//!
//! 只能前进一步、后退一步，或跳回已经到过的步骤。

use std::fmt::Display;

use tracing::debug;

use crate::error::NavigationError;
use crate::models::Lesson;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonStep {
    Introduction,
    Vocabulary,
    Grammar,
    Conversations,
    CulturalNotes,
    Summary,
}

impl LessonStep {
    pub fn title(self) -> &'static str {
        match self {
            LessonStep::Introduction => "Introduction",
            LessonStep::Vocabulary => "Vocabulary",
            LessonStep::Grammar => "Grammar",
            LessonStep::Conversations => "Conversations",
            LessonStep::CulturalNotes => "Cultural Notes",
            LessonStep::Summary => "Summary",
        }
    }
}

impl Display for LessonStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// 一次步骤切换，界面据此回到顶部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepChange {
    pub from: LessonStep,
    pub to: LessonStep,
}

#[derive(Debug, Clone)]
pub struct LessonStepper {
    steps: Vec<LessonStep>,
    current: usize,
}

impl LessonStepper {
    /// 没有文化注释的课程不含该步骤
    pub fn new(has_cultural_notes: bool) -> Self {
        let mut steps = vec![
            LessonStep::Introduction,
            LessonStep::Vocabulary,
            LessonStep::Grammar,
            LessonStep::Conversations,
        ];
        if has_cultural_notes {
            steps.push(LessonStep::CulturalNotes);
        }
        steps.push(LessonStep::Summary);

        Self { steps, current: 0 }
    }

    pub fn for_lesson(lesson: &Lesson) -> Self {
        Self::new(lesson.has_cultural_notes())
    }

    pub fn steps(&self) -> &[LessonStep] {
        &self.steps
    }

    pub fn current(&self) -> LessonStep {
        self.steps[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// (第几步, 共几步)
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.steps.len())
    }

    /// 前进一步；已在总结页时不动
    pub fn next(&mut self) -> Option<StepChange> {
        if self.is_last() {
            return None;
        }
        Some(self.move_to(self.current + 1))
    }

    /// 后退一步；已在介绍页时不动
    pub fn previous(&mut self) -> Option<StepChange> {
        if self.is_first() {
            return None;
        }
        Some(self.move_to(self.current - 1))
    }

    /// 跳到指定步骤（从 0 开始），只能跳回当前或之前的步骤
    pub fn select(&mut self, index: usize) -> Result<Option<StepChange>, NavigationError> {
        if index >= self.steps.len() {
            return Err(NavigationError::StepOutOfRange {
                index,
                total: self.steps.len(),
            });
        }
        if index > self.current {
            return Err(NavigationError::StepLocked {
                requested: index,
                current: self.current,
            });
        }
        if index == self.current {
            return Ok(None);
        }
        Ok(Some(self.move_to(index)))
    }

    fn move_to(&mut self, index: usize) -> StepChange {
        let change = StepChange {
            from: self.current(),
            to: self.steps[index],
        };
        self.current = index;
        debug!("课程步骤: {} → {}", change.from, change.to);
        change
    }
}
