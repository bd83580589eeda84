//! 测验评分服务 - 业务能力层
//!
//! 只负责"对一套题打分"，不关心答题过程

use std::collections::BTreeMap;

use crate::error::QuizError;
use crate::models::lesson::QuizQuestion;

/// 测验通过线（百分比）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassThreshold(u8);

impl PassThreshold {
    pub const DEFAULT_PERCENT: u8 = 70;

    pub fn new(percent: u8) -> Result<Self, QuizError> {
        if percent > 100 {
            return Err(QuizError::InvalidThreshold {
                value: percent as u32,
            });
        }
        Ok(Self(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl Default for PassThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT_PERCENT)
    }
}

/// 评分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: u8,
}

impl QuizScore {
    pub fn new(correct: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (100.0 * correct as f64 / total as f64).round() as u8
        };
        Self {
            correct,
            total,
            percentage,
        }
    }

    pub fn passed(&self, threshold: PassThreshold) -> bool {
        self.total > 0 && self.percentage >= threshold.percent()
    }
}

/// 判断单题是否答对
///
/// 选择题、判断题逐字比较；填空题去掉首尾空白并忽略大小写后比较。
pub fn is_correct(question: &QuizQuestion, answer: &str) -> bool {
    if question.kind.is_free_text() {
        normalize_free_text(answer) == normalize_free_text(&question.correct_answer)
    } else {
        answer == question.correct_answer
    }
}

fn normalize_free_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 对一套题打分
///
/// `answers` 以题目下标（从 0 开始）为键；未作答的题目算错。
pub fn score(questions: &[QuizQuestion], answers: &BTreeMap<usize, String>) -> QuizScore {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(idx, question)| {
            answers
                .get(idx)
                .map(|answer| is_correct(question, answer))
                .unwrap_or(false)
        })
        .count();
    QuizScore::new(correct, questions.len())
}
