//! 値オブジェクト定義
//!
//! 境界（DTO 変換時）でバリデーションを行い、ドメイン内では常に正しい値
//! だけが流れるようにします。Preferences は検索リクエストごとに丸ごと
//! 置き換えられ、部分的に変更されることはありません。

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use super::error::ValidationError;

/// 興味タグの最大数
pub const MAX_INTEREST_TAGS: usize = 5;
/// 興味タグ1件の最大長
pub const MAX_INTEREST_TAG_LENGTH: usize = 32;
/// 言語タグの最大長
pub const MAX_LANGUAGE_LENGTH: usize = 16;
/// チャットメッセージの最大長（文字数）
pub const MAX_MESSAGE_LENGTH: usize = 2000;
/// 添付ファイル名の最大長
pub const MAX_FILE_NAME_LENGTH: usize = 128;
/// 添付ファイルデータ（エンコード済み文字列）の最大バイト数
pub const MAX_FILE_BLOB_BYTES: usize = 1_048_576;

/// 接続 ID（ライブなソケット1本ごとに一意な揮発性 ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい ConnectionId を作成（空文字列は拒否）
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "connection_id",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ConnectionId のファクトリ
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// UUID v4 で一意な ConnectionId を生成
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

/// 安定識別子（再接続をまたいで持続する識別子、例: ネットワークアドレス）
///
/// 揮発性の ConnectionId とは別物で、BAN 判定のキーに使われます。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StableId(String);

impl StableId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: "stable_id" });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// チャット種別（待機プールのパーティションキー）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatType {
    Video,
    Text,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Video => "video",
            ChatType::Text => "text",
        }
    }
}

impl std::str::FromStr for ChatType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "video" => Ok(ChatType::Video),
            "text" => Ok(ChatType::Text),
            other => Err(ValidationError::Unsupported {
                field: "chat type",
                value: other.to_string(),
            }),
        }
    }
}

/// Unix タイムスタンプ（ミリ秒、UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 言語タグ（例: "en", "ja"）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language(String);

impl Language {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "language" });
        }
        if trimmed.chars().count() > MAX_LANGUAGE_LENGTH {
            return Err(ValidationError::TooLong {
                field: "language",
                max: MAX_LANGUAGE_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 興味タグの集合（上限付き、重複は除去）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestTags(BTreeSet<String>);

impl InterestTags {
    /// タグのリストから作成
    ///
    /// 空白のみのタグは空エラー、上限超過はエラー。重複は集合化で消えます。
    pub fn new(tags: Vec<String>) -> Result<Self, ValidationError> {
        if tags.len() > MAX_INTEREST_TAGS {
            return Err(ValidationError::TooManyInterestTags {
                max: MAX_INTEREST_TAGS,
            });
        }
        let mut set = BTreeSet::new();
        for tag in tags {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::Empty {
                    field: "interest tag",
                });
            }
            if trimmed.chars().count() > MAX_INTEREST_TAG_LENGTH {
                return Err(ValidationError::TooLong {
                    field: "interest tag",
                    max: MAX_INTEREST_TAG_LENGTH,
                });
            }
            set.insert(trimmed.to_string());
        }
        Ok(Self(set))
    }

    /// 空集合を作成
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 共通タグが1つでもあるか
    pub fn intersects(&self, other: &InterestTags) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

/// クライアントが検索時に提示する希望条件
///
/// 検索リクエストごとに丸ごと置き換えられます（部分更新なし）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    chat_type: ChatType,
    language: Option<Language>,
    interests: InterestTags,
}

impl Preferences {
    pub fn new(chat_type: ChatType, language: Option<Language>, interests: InterestTags) -> Self {
        Self {
            chat_type,
            language,
            interests,
        }
    }

    pub fn chat_type(&self) -> ChatType {
        self.chat_type
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn interests(&self) -> &InterestTags {
        &self.interests
    }

    /// 互換性判定（対称）
    ///
    /// 1. 双方が言語を指定している場合は一致が必要（未指定はワイルドカード）
    /// 2. 双方が空でない興味タグを持つ場合は積集合が非空であること
    ///    （どちらかが空なら常に成立）
    pub fn is_compatible_with(&self, other: &Preferences) -> bool {
        if self.chat_type != other.chat_type {
            return false;
        }
        if let (Some(a), Some(b)) = (&self.language, &other.language) {
            if a != b {
                return false;
            }
        }
        if !self.interests.is_empty()
            && !other.interests.is_empty()
            && !self.interests.intersects(&other.interests)
        {
            return false;
        }
        true
    }
}

/// チャットメッセージの本文（長さ上限付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty { field: "message" });
        }
        if value.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ValidationError::TooLong {
                field: "message",
                max: MAX_MESSAGE_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// 添付ファイル（中身は不透明なエンコード済み文字列として転送）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    name: String,
    data: String,
}

impl FileBlob {
    pub fn new(name: String, data: String) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "file name" });
        }
        if name.chars().count() > MAX_FILE_NAME_LENGTH {
            return Err(ValidationError::TooLong {
                field: "file name",
                max: MAX_FILE_NAME_LENGTH,
            });
        }
        if data.is_empty() {
            return Err(ValidationError::Empty { field: "file data" });
        }
        if data.len() > MAX_FILE_BLOB_BYTES {
            return Err(ValidationError::FileTooLarge {
                max: MAX_FILE_BLOB_BYTES,
            });
        }
        Ok(Self { name, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}
