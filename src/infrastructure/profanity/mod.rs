//! ワードリストによる ProfanityFilter 実装
//!
//! チャット本文を英字の連続（単語）単位で走査し、リストに一致した単語を
//! 同じ長さの `*` に置き換えます。照合は大文字小文字を区別しません。
//! フィルタは常に成功します（fail-open）。リストにない語はそのまま残る
//! だけで、リレー自体が止まることはありません。

use crate::domain::ProfanityFilter;

/// 組み込みのマスク対象ワード（小文字で保持）
const DEFAULT_WORD_LIST: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "dick", "cunt", "slut", "whore", "nigger",
    "faggot",
];

/// ワードリストによる ProfanityFilter 実装
pub struct WordListProfanityFilter {
    words: Vec<String>,
}

impl WordListProfanityFilter {
    /// 組み込みワードリストでフィルタを作成
    pub fn new() -> Self {
        Self {
            words: DEFAULT_WORD_LIST.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// 任意のワードリストでフィルタを作成
    pub fn with_words(words: Vec<String>) -> Self {
        Self {
            words: words.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn is_masked_word(&self, word: &str) -> bool {
        let lowered = word.to_lowercase();
        self.words.iter().any(|w| *w == lowered)
    }
}

impl Default for WordListProfanityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfanityFilter for WordListProfanityFilter {
    fn clean(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut word = String::new();

        for ch in text.chars() {
            if ch.is_alphabetic() {
                word.push(ch);
                continue;
            }
            if !word.is_empty() {
                if self.is_masked_word(&word) {
                    result.push_str(&"*".repeat(word.chars().count()));
                } else {
                    result.push_str(&word);
                }
                word.clear();
            }
            result.push(ch);
        }
        if !word.is_empty() {
            if self.is_masked_word(&word) {
                result.push_str(&"*".repeat(word.chars().count()));
            } else {
                result.push_str(&word);
            }
        }

        result
    }
}
