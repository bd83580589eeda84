use serde::{Deserialize, Serialize};

/// 一节课
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabItem>,
    #[serde(default)]
    pub grammar: Vec<GrammarPoint>,
    #[serde(default)]
    pub conversations: Vec<Dialogue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cultural_notes: Vec<String>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
}

impl Lesson {
    pub fn has_cultural_notes(&self) -> bool {
        !self.cultural_notes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabItem {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarPoint {
    pub title: String,
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<GrammarExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarExample {
    pub japanese: String,
    pub romaji: String,
    pub english: String,
}

/// 一段会话（按顺序排列的台词）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub lines: Vec<ConversationLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLine {
    pub speaker: String,
    pub text: String,
    pub romaji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl ConversationLine {
    /// 头像上显示的首字母
    pub fn initial(&self) -> char {
        self.speaker.chars().next().unwrap_or('?')
    }
}

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl QuestionKind {
    /// 填空题按去空白、忽略大小写比较答案
    pub fn is_free_text(self) -> bool {
        matches!(self, QuestionKind::FillBlank)
    }

    pub fn name(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple-choice",
            QuestionKind::TrueFalse => "true-false",
            QuestionKind::FillBlank => "fill-blank",
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    /// 正确答案在选项中出现的次数
    pub fn correct_option_count(&self) -> usize {
        self.options
            .iter()
            .filter(|option| **option == self.correct_answer)
            .count()
    }

    /// 按 1 开始的编号取选项
    pub fn option_by_number(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }
}
