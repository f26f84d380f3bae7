//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{BrokerError, MessagePushError, RepositoryError, ValidationError};

/// 接続受付のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// BAN 済みクライアントの接続試行（理由を通知して切断する）
    #[error("client is banned: {reason}")]
    Banned { reason: String },

    /// 接続レジストリへの登録失敗
    #[error("connection rejected: {0}")]
    Rejected(#[from] BrokerError),

    /// BAN レコードの読み取り失敗
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// マッチング検索のエラー
///
/// 状態遷移違反（検索中・マッチ済みの再検索）は接続を生かしたまま拒否します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindMatchError {
    #[error(transparent)]
    State(#[from] BrokerError),
}

/// リレー（シグナリング・画面共有・チャット）のエラー
///
/// 認可は fail-closed: パートナー以外へは決して配送しません。
/// ペイロードは破棄され、送信元の接続は維持されます。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("sender has no active session")]
    NoPartner,

    #[error("addressee is not the sender's partner")]
    NotPartner,

    #[error("invalid payload: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

/// 通報処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("reporter connection is unknown")]
    UnknownReporter,

    #[error("reported target connection is unknown")]
    UnknownTarget,

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}
