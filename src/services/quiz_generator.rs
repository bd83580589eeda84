//! 小测验生成服务 - 业务能力层
//!
//! 从一节课的词汇或语法点中随机抽题，并用同课的其他释义做干扰项。
//! 结果是随机的，所以同一次课程浏览只生成一次（见 [`QuizCache`]）。

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::lesson::{GrammarPoint, Lesson, QuestionKind, QuizQuestion, VocabItem};

/// 词汇小测验至少需要的词条数
pub const VOCAB_QUIZ_MIN_ENTRIES: usize = 4;
/// 词汇小测验题数
pub const VOCAB_QUIZ_QUESTIONS: usize = 3;
/// 语法小测验至少需要的语法点数
pub const GRAMMAR_QUIZ_MIN_ENTRIES: usize = 2;
/// 语法小测验题数
pub const GRAMMAR_QUIZ_QUESTIONS: usize = 2;
/// 每题干扰项数量
pub const DISTRACTOR_COUNT: usize = 3;

/// 一节课的两套小测验
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiniQuizzes {
    pub vocabulary: Vec<QuizQuestion>,
    pub grammar: Vec<QuizQuestion>,
}

impl MiniQuizzes {
    pub fn generate<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Self {
        Self {
            vocabulary: generate_vocabulary_quiz(&lesson.vocabulary, rng),
            grammar: generate_grammar_quiz(&lesson.grammar, rng),
        }
    }
}

/// 生成词汇小测验：给出单词，选出释义
///
/// 词条少于 4 个时返回空列表。
pub fn generate_vocabulary_quiz<R: Rng + ?Sized>(
    vocabulary: &[VocabItem],
    rng: &mut R,
) -> Vec<QuizQuestion> {
    if vocabulary.len() < VOCAB_QUIZ_MIN_ENTRIES {
        debug!("词汇只有 {} 个，跳过词汇小测验", vocabulary.len());
        return Vec::new();
    }

    build_questions(
        vocabulary,
        VOCAB_QUIZ_QUESTIONS,
        QuestionKind::MultipleChoice,
        |item| item.meaning.as_str(),
        |item| format!("What does \"{}\" mean?", item.word),
        rng,
    )
}

/// 生成语法小测验：给出语法点标题，选出（或输入）对应的说明
///
/// 语法点少于 2 个时返回空列表。
pub fn generate_grammar_quiz<R: Rng + ?Sized>(
    grammar: &[GrammarPoint],
    rng: &mut R,
) -> Vec<QuizQuestion> {
    if grammar.len() < GRAMMAR_QUIZ_MIN_ENTRIES {
        debug!("语法点只有 {} 个，跳过语法小测验", grammar.len());
        return Vec::new();
    }

    build_questions(
        grammar,
        GRAMMAR_QUIZ_QUESTIONS,
        QuestionKind::FillBlank,
        |point| point.explanation.as_str(),
        |point| format!("Which explanation matches \"{}\"?", point.title),
        rng,
    )
}

fn build_questions<T, R, A, P>(
    entries: &[T],
    question_count: usize,
    kind: QuestionKind,
    answer_of: A,
    prompt_of: P,
    rng: &mut R,
) -> Vec<QuizQuestion>
where
    R: Rng + ?Sized,
    A: Fn(&T) -> &str,
    P: Fn(&T) -> String,
{
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.shuffle(rng);

    order
        .iter()
        .take(question_count)
        .enumerate()
        .map(|(position, &subject_idx)| {
            let subject = &entries[subject_idx];
            let correct = answer_of(subject);

            // 其余词条打乱后取释义不同的前三个，重复的释义只取一次
            let mut others: Vec<&T> = entries
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != subject_idx)
                .map(|(_, entry)| entry)
                .collect();
            others.shuffle(rng);

            let mut options: Vec<String> = vec![correct.to_string()];
            for other in others {
                if options.len() > DISTRACTOR_COUNT {
                    break;
                }
                let text = answer_of(other);
                if !options.iter().any(|existing| existing == text) {
                    options.push(text.to_string());
                }
            }
            options.shuffle(rng);

            QuizQuestion {
                id: position as u32,
                kind,
                question: prompt_of(subject),
                options,
                correct_answer: correct.to_string(),
                explanation: None,
            }
        })
        .collect()
}

/// 小测验缓存
///
/// 以课程 ID 为键，一次课程浏览只生成一次；离开课程页时调用 [`QuizCache::evict`]。
#[derive(Debug, Default)]
pub struct QuizCache {
    entries: HashMap<u32, Arc<MiniQuizzes>>,
}

impl QuizCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取缓存；没有则生成并缓存
    pub fn get_or_generate<R: Rng + ?Sized>(
        &mut self,
        lesson: &Lesson,
        rng: &mut R,
    ) -> Arc<MiniQuizzes> {
        self.entries
            .entry(lesson.id)
            .or_insert_with(|| {
                debug!("为第 {} 课生成小测验", lesson.id);
                Arc::new(MiniQuizzes::generate(lesson, rng))
            })
            .clone()
    }

    pub fn evict(&mut self, lesson_id: u32) {
        self.entries.remove(&lesson_id);
    }

    pub fn contains(&self, lesson_id: u32) -> bool {
        self.entries.contains_key(&lesson_id)
    }
}
