//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::broker::{DisconnectCleanup, MatchOutcome};
use super::entity::{BanRecord, Connection, Report};
use super::error::{BrokerError, RepositoryError};
use super::value_object::{ChatType, ConnectionId, Preferences, StableId, Timestamp};

/// Broker Repository trait
///
/// インメモリ状態（接続レジストリ・待機プール・セッションテーブル）への
/// 唯一の入り口。すべてのメソッドは実装側で単一の直列化ポイントを通り、
/// `start_search` のエンキュー・マッチ・確定は1回のアトミックなステップ
/// として実行されます（2つの走査が同じ待機エントリを取り合えない）。
#[async_trait]
pub trait BrokerRepository: Send + Sync {
    /// 接続を登録
    async fn register_connection(&self, connection: Connection) -> Result<(), BrokerError>;

    /// 接続を抹消し、待機プール・セッションを連鎖的に掃除（冪等）
    async fn unregister_connection(&self, id: &ConnectionId) -> DisconnectCleanup;

    /// 検索を開始し、その場でマッチを試みる
    async fn start_search(
        &self,
        id: &ConnectionId,
        preferences: Preferences,
        now: Timestamp,
    ) -> Result<MatchOutcome, BrokerError>;

    /// 待機プールから外す（マッチ確定後は no-op で false）
    async fn cancel_search(&self, id: &ConnectionId) -> bool;

    /// セッション中のパートナーを引く
    async fn partner_of(&self, id: &ConnectionId) -> Option<ConnectionId>;

    /// セッションを解消し、残された側の接続 ID を返す
    async fn end_session(&self, id: &ConnectionId) -> Option<ConnectionId>;

    /// 接続の安定識別子を引く
    async fn stable_id_of(&self, id: &ConnectionId) -> Option<StableId>;

    /// 待機プールに残った互換ペアを掃き出す（低頻度バックストップ）
    async fn sweep_matches(&self, now: Timestamp) -> Vec<(ConnectionId, ConnectionId)>;

    /// 指定種別の待機数
    async fn waiting_count(&self, chat_type: ChatType) -> usize;

    /// アクティブなセッション数（ペア数）
    async fn session_count(&self) -> usize;
}

/// Moderation Repository trait
///
/// 通報ログと BAN レコードの永続化コラボレーターへの狭いインターフェース。
/// コアはストレージエンジンに直接触れません。`get_ban` は接続受付のたびに
/// 呼ばれるため、高速で副作用のない読み取りであることが要求されます。
#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// 通報を追記（追記専用、削除・変更なし）
    async fn append_report(&self, report: Report) -> Result<(), RepositoryError>;

    /// 対象の安定識別子に対する通報総数
    async fn count_reports(&self, target: &StableId) -> Result<usize, RepositoryError>;

    /// BAN レコードを引く（副作用のない読み取り）
    async fn get_ban(&self, stable_id: &StableId) -> Result<Option<BanRecord>, RepositoryError>;

    /// BAN レコードを作成/有効化
    async fn set_ban(
        &self,
        stable_id: &StableId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), RepositoryError>;
}
