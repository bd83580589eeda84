//! 课程目录
//!
//! 持有全部课程与假名表，只读。

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ContentError;
use crate::models::alphabet::{AlphabetKind, AlphabetSet};
use crate::models::lesson::Lesson;

#[derive(Debug, Clone)]
pub struct Catalog {
    lessons: Vec<Arc<Lesson>>,
    alphabets: Vec<AlphabetSet>,
}

impl Catalog {
    /// 创建目录并校验内容
    ///
    /// - 课程 ID 不能重复
    /// - 有选项的题目，正确答案必须在选项中恰好出现一次
    /// - 平假名、片假名都必须存在
    pub fn new(lessons: Vec<Lesson>, alphabets: Vec<AlphabetSet>) -> Result<Self, ContentError> {
        let mut seen = HashSet::new();
        for lesson in &lessons {
            if !seen.insert(lesson.id) {
                return Err(ContentError::DuplicateLessonId { id: lesson.id });
            }
            for question in &lesson.quiz {
                if question.options.is_empty() {
                    continue;
                }
                let count = question.correct_option_count();
                if count != 1 {
                    return Err(ContentError::InvalidOptions {
                        lesson_id: lesson.id,
                        question_id: question.id,
                        answer: question.correct_answer.clone(),
                        count,
                    });
                }
            }
        }

        for kind in AlphabetKind::ALL {
            if !alphabets.iter().any(|set| set.kind == kind) {
                return Err(ContentError::MissingAlphabet {
                    kind: kind.to_string(),
                });
            }
        }

        Ok(Self {
            lessons: lessons.into_iter().map(Arc::new).collect(),
            alphabets,
        })
    }

    pub fn lessons(&self) -> &[Arc<Lesson>] {
        &self.lessons
    }

    pub fn lesson(&self, id: u32) -> Option<Arc<Lesson>> {
        self.lessons.iter().find(|lesson| lesson.id == id).cloned()
    }

    /// 按目录顺序，紧跟在 `id` 之后的课程
    pub fn next_lesson_id(&self, id: u32) -> Option<u32> {
        let position = self.lessons.iter().position(|lesson| lesson.id == id)?;
        self.lessons.get(position + 1).map(|lesson| lesson.id)
    }

    pub fn alphabet(&self, kind: AlphabetKind) -> &AlphabetSet {
        // new() 已保证两种假名表都存在
        self.alphabets
            .iter()
            .find(|set| set.kind == kind)
            .unwrap_or(&self.alphabets[0])
    }

    /// 全部测验题数量
    pub fn question_count(&self) -> usize {
        self.lessons.iter().map(|lesson| lesson.quiz.len()).sum()
    }

    /// 全部假名数量
    pub fn character_count(&self) -> usize {
        self.alphabets.iter().map(|set| set.characters.len()).sum()
    }
}
