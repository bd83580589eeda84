//! 答题过程 - 流程层
//!
//! 核心职责：记录"一套题"的作答、提交、重做。
//! 课程测验和课内小测验共用这一流程，区别只在于提交前是否要求全部作答
//! （[`QuizSession::submit`] 与 [`QuizSession::reveal`]）。

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::QuizError;
use crate::models::QuizQuestion;
use crate::services::scorer::{self, PassThreshold, QuizScore};

/// 回顾时的一道题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    pub question: &'a QuizQuestion,
    pub answer: Option<&'a str>,
    pub correct: bool,
}

impl ReviewItem<'_> {
    pub fn correct_answer(&self) -> &str {
        &self.question.correct_answer
    }

    pub fn explanation(&self) -> Option<&str> {
        self.question.explanation.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    answers: BTreeMap<usize, String>,
    show_results: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            answers: BTreeMap::new(),
            show_results: false,
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// 作答（覆盖之前的答案）
    pub fn select(&mut self, index: usize, answer: impl Into<String>) -> Result<(), QuizError> {
        self.ensure_editable(index)?;
        let answer = answer.into();
        debug!("第 {} 题作答: {}", index + 1, answer);
        self.answers.insert(index, answer);
        Ok(())
    }

    /// 清除一题的答案
    pub fn clear(&mut self, index: usize) -> Result<(), QuizError> {
        self.ensure_editable(index)?;
        self.answers.remove(&index);
        Ok(())
    }

    fn ensure_editable(&self, index: usize) -> Result<(), QuizError> {
        if index >= self.questions.len() {
            return Err(QuizError::QuestionOutOfRange {
                index,
                total: self.questions.len(),
            });
        }
        if self.show_results {
            return Err(QuizError::ResultsShown);
        }
        Ok(())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn all_answered(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// 提交：必须全部作答，之后显示结果
    pub fn submit(&mut self) -> Result<QuizScore, QuizError> {
        if !self.all_answered() {
            return Err(QuizError::Incomplete {
                answered: self.answered_count(),
                total: self.questions.len(),
            });
        }
        self.show_results = true;
        let result = self.score();
        info!(
            "📝 测验提交: {}/{} ({}%)",
            result.correct, result.total, result.percentage
        );
        Ok(result)
    }

    /// 核对答案（课内小测验），不要求全部作答
    pub fn reveal(&mut self) -> QuizScore {
        self.show_results = true;
        self.score()
    }

    pub fn hide_results(&mut self) {
        self.show_results = false;
    }

    pub fn is_showing_results(&self) -> bool {
        self.show_results
    }

    pub fn score(&self) -> QuizScore {
        scorer::score(&self.questions, &self.answers)
    }

    /// 重做：清空答案与结果，题目和选项顺序不变
    pub fn retry(&mut self) {
        debug!("重做测验，清空 {} 个答案", self.answers.len());
        self.answers.clear();
        self.show_results = false;
    }

    pub fn review(&self) -> Vec<ReviewItem<'_>> {
        self.questions
            .iter()
            .enumerate()
            .map(|(idx, question)| {
                let answer = self.answer(idx);
                ReviewItem {
                    question,
                    answer,
                    correct: answer
                        .map(|a| scorer::is_correct(question, a))
                        .unwrap_or(false),
                }
            })
            .collect()
    }

    /// 通过测验后才能继续下一课
    ///
    /// `next_lesson` 是目录中紧随其后的课程；最后一课没有下一课。
    pub fn unlocked_next_lesson(
        &self,
        threshold: PassThreshold,
        next_lesson: Option<u32>,
    ) -> Option<u32> {
        if self.show_results && self.score().passed(threshold) {
            next_lesson
        } else {
            None
        }
    }
}
