//! 假名卡片浏览
//!
//! 只保存"当前是哪套假名、第几张、是否翻面"，卡片内容从 [`Catalog`](crate::models::Catalog) 读取。

use tracing::debug;

use crate::error::NavigationError;
use crate::models::AlphabetKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDeck {
    kind: AlphabetKind,
    len: usize,
    index: usize,
    flipped: bool,
}

impl FlashcardDeck {
    pub fn new(kind: AlphabetKind, len: usize) -> Self {
        Self {
            kind,
            len,
            index: 0,
            flipped: false,
        }
    }

    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 当前卡片下标；空卡组没有当前卡片
    pub fn index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.index)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// "第 n 张，共 m 张"
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.index().map(|index| (index + 1, self.len))
    }

    pub fn next(&mut self) {
        if self.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.len;
        self.flipped = false;
    }

    pub fn previous(&mut self) {
        if self.is_empty() {
            return;
        }
        self.index = (self.index + self.len - 1) % self.len;
        self.flipped = false;
    }

    pub fn flip(&mut self) {
        if self.is_empty() {
            return;
        }
        self.flipped = !self.flipped;
    }

    /// 快速跳转到指定卡片（从 0 开始）
    pub fn jump(&mut self, index: usize) -> Result<(), NavigationError> {
        if index >= self.len {
            return Err(NavigationError::CardOutOfRange {
                index,
                total: self.len,
            });
        }
        self.index = index;
        self.flipped = false;
        Ok(())
    }

    /// 切换假名表，回到第一张
    pub fn switch_set(&mut self, kind: AlphabetKind, len: usize) {
        debug!("切换假名表: {} → {}", self.kind, kind);
        *self = Self::new(kind, len);
    }
}
