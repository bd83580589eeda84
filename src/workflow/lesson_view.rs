//! 课程页 - 流程层
//!
//! 一次课程浏览的全部状态：分步导航加上词汇、语法两套小测验。
//! 离开课程页时整体丢弃。

use std::sync::Arc;

use crate::error::NavigationError;
use crate::models::Lesson;
use crate::services::MiniQuizzes;
use crate::workflow::lesson_stepper::{LessonStep, LessonStepper, StepChange};
use crate::workflow::quiz_session::QuizSession;

#[derive(Debug, Clone)]
pub struct LessonView {
    lesson: Arc<Lesson>,
    stepper: LessonStepper,
    vocabulary_quiz: QuizSession,
    grammar_quiz: QuizSession,
}

impl LessonView {
    pub fn new(lesson: Arc<Lesson>, quizzes: &MiniQuizzes) -> Self {
        Self {
            stepper: LessonStepper::for_lesson(&lesson),
            vocabulary_quiz: QuizSession::new(quizzes.vocabulary.clone()),
            grammar_quiz: QuizSession::new(quizzes.grammar.clone()),
            lesson,
        }
    }

    pub fn lesson(&self) -> &Arc<Lesson> {
        &self.lesson
    }

    pub fn stepper(&self) -> &LessonStepper {
        &self.stepper
    }

    pub fn step(&self) -> LessonStep {
        self.stepper.current()
    }

    pub fn next(&mut self) -> Option<StepChange> {
        let change = self.stepper.next();
        self.on_change(change)
    }

    pub fn previous(&mut self) -> Option<StepChange> {
        let change = self.stepper.previous();
        self.on_change(change)
    }

    pub fn select(&mut self, index: usize) -> Result<Option<StepChange>, NavigationError> {
        let change = self.stepper.select(index)?;
        Ok(self.on_change(change))
    }

    /// 进入步骤时收起该步骤小测验的结果，已选答案保留
    fn on_change(&mut self, change: Option<StepChange>) -> Option<StepChange> {
        if let Some(quiz) = change.and_then(|c| self.mini_quiz_mut(c.to)) {
            quiz.hide_results();
        }
        change
    }

    /// 步骤内嵌的小测验；题目不足时为空，不显示
    pub fn mini_quiz(&self, step: LessonStep) -> Option<&QuizSession> {
        match step {
            LessonStep::Vocabulary => Some(&self.vocabulary_quiz),
            LessonStep::Grammar => Some(&self.grammar_quiz),
            _ => None,
        }
        .filter(|quiz| !quiz.is_empty())
    }

    pub fn mini_quiz_mut(&mut self, step: LessonStep) -> Option<&mut QuizSession> {
        match step {
            LessonStep::Vocabulary => Some(&mut self.vocabulary_quiz),
            LessonStep::Grammar => Some(&mut self.grammar_quiz),
            _ => None,
        }
        .filter(|quiz| !quiz.is_empty())
    }

    /// 当前步骤的小测验
    pub fn current_quiz_mut(&mut self) -> Option<&mut QuizSession> {
        let step = self.step();
        self.mini_quiz_mut(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GrammarPoint, VocabItem};
    use crate::services::quiz_generator::QuizCache;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lesson() -> Arc<Lesson> {
        Arc::new(Lesson {
            id: 1,
            title: "Greetings".to_string(),
            description: String::new(),
            vocabulary: (0..5)
                .map(|i| VocabItem {
                    word: format!("w{}", i),
                    reading: None,
                    meaning: format!("m{}", i),
                })
                .collect(),
            grammar: vec![GrammarPoint {
                title: "only one".to_string(),
                explanation: "e".to_string(),
                examples: Vec::new(),
            }],
            conversations: Vec::new(),
            cultural_notes: vec!["Bowing".to_string()],
            quiz: Vec::new(),
        })
    }

    fn view() -> LessonView {
        let lesson = lesson();
        let mut rng = StdRng::seed_from_u64(5);
        let quizzes = QuizCache::new().get_or_generate(&lesson, &mut rng);
        LessonView::new(lesson, &quizzes)
    }

    #[test]
    fn test_small_grammar_quiz_is_hidden() {
        let view = view();
        assert!(view.mini_quiz(LessonStep::Vocabulary).is_some());
        assert!(view.mini_quiz(LessonStep::Grammar).is_none());
        assert_eq!(view.stepper().steps().len(), 6);
    }

    #[test]
    fn test_entering_step_hides_results_but_keeps_answers() {
        let mut view = view();
        view.next();
        assert_eq!(view.step(), LessonStep::Vocabulary);

        let quiz = view.current_quiz_mut().unwrap();
        let answer = quiz.questions()[0].correct_answer.clone();
        quiz.select(0, answer.clone()).unwrap();
        quiz.reveal();

        view.next();
        view.previous();
        let quiz = view.mini_quiz(LessonStep::Vocabulary).unwrap();
        assert!(!quiz.is_showing_results());
        assert_eq!(quiz.answer(0), Some(answer.as_str()));
    }
}
