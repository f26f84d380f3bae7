//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの境界バリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("too many interest tags (max {max})")]
    TooManyInterestTags { max: usize },

    #[error("file blob exceeds {max} bytes")]
    FileTooLarge { max: usize },

    #[error("{field} has an unsupported value: '{value}'")]
    Unsupported { field: &'static str, value: String },
}

/// ブローカー状態機械のエラー
///
/// クライアントは {未検索, 検索中, マッチ済み} のいずれか1つの状態のみを
/// 取り得ます。状態遷移に反する操作はこのエラーで拒否されます。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),

    #[error("connection '{0}' is not registered")]
    NotRegistered(String),

    #[error("connection '{0}' is already searching")]
    AlreadySearching(String),

    #[error("connection '{0}' already has an active session")]
    AlreadyMatched(String),
}

/// Repository（永続化コラボレーター）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
