use serde::{Deserialize, Serialize};

use crate::models::stroke_path::StrokePath;

/// 假名表种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetKind {
    Hiragana,
    Katakana,
}

impl AlphabetKind {
    pub const ALL: [AlphabetKind; 2] = [AlphabetKind::Hiragana, AlphabetKind::Katakana];

    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            AlphabetKind::Hiragana => "Hiragana",
            AlphabetKind::Katakana => "Katakana",
        }
    }

    /// 日文写法
    pub fn native_name(self) -> &'static str {
        match self {
            AlphabetKind::Hiragana => "ひらがな",
            AlphabetKind::Katakana => "カタカナ",
        }
    }

    /// 从字符串解析（忽略大小写，支持简写）
    pub fn find(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hiragana" | "h" | "ひらがな" => Some(AlphabetKind::Hiragana),
            "katakana" | "k" | "カタカナ" => Some(AlphabetKind::Katakana),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlphabetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub order: u32,
    pub path: StrokePath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphabetCharacter {
    pub character: String,
    pub romaji: String,
    pub strokes: Vec<Stroke>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl AlphabetCharacter {
    /// 按书写顺序排列的笔画
    pub fn ordered_strokes(&self) -> Vec<&Stroke> {
        let mut strokes: Vec<&Stroke> = self.strokes.iter().collect();
        strokes.sort_by_key(|s| s.order);
        strokes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphabetSet {
    pub kind: AlphabetKind,
    pub name: String,
    pub description: String,
    pub characters: Vec<AlphabetCharacter>,
}
