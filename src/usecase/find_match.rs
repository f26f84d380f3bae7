//! UseCase: マッチング検索
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FindMatchUseCase::execute() / notify_matched() / sweep()
//! - 検索開始から即時マッチまたはエンキューまでの流れ
//!
//! ### なぜこのテストが必要か
//! - マッチは両メンバーへの対称な通知とセットで初めて完結する
//! - 状態遷移違反（検索中・マッチ済みの再検索）は接続を生かしたまま
//!   拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 候補なしでエンキュー、候補ありで即時マッチ
//! - 異常系: 検索中の再検索
//! - バックストップ: sweep による残存互換ペアの掃き出し

use std::sync::Arc;

use crate::common::time::get_unix_timestamp;
use crate::domain::{
    BrokerRepository, ConnectionId, MatchOutcome, MessagePushError, MessagePusher, Preferences,
    Timestamp,
};

use super::error::FindMatchError;

/// マッチング検索のユースケース
pub struct FindMatchUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl FindMatchUseCase {
    /// 新しい FindMatchUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 検索を開始し、その場でマッチを試みる
    ///
    /// エンキュー・走査・確定は Repository 側で1回のアトミックなステップ
    /// として実行されます。
    ///
    /// # Returns
    ///
    /// * `Ok(MatchOutcome::Matched { partner })` - 即時マッチ成立
    /// * `Ok(MatchOutcome::Queued)` - 候補なし、待機プールに追加
    /// * `Err(FindMatchError)` - 状態遷移違反による拒否
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        preferences: Preferences,
    ) -> Result<MatchOutcome, FindMatchError> {
        let now = Timestamp::new(get_unix_timestamp());
        let outcome = self
            .repository
            .start_search(connection_id, preferences, now)
            .await?;
        Ok(outcome)
    }

    /// マッチ成立を両メンバーに通知
    ///
    /// 片側への通知が失敗してももう片側へは送ります（接続断は切断処理側で
    /// 掃除されるため、ここでは配送失敗を返すだけにとどめる）。
    pub async fn notify_matched(
        &self,
        first: &ConnectionId,
        message_for_first: &str,
        second: &ConnectionId,
        message_for_second: &str,
    ) -> Result<(), MessagePushError> {
        let first_result = self.message_pusher.push_to(first, message_for_first).await;
        let second_result = self
            .message_pusher
            .push_to(second, message_for_second)
            .await;
        first_result.and(second_result)
    }

    /// 待機プールに残った互換ペアを掃き出す（低頻度バックストップ）
    ///
    /// # Returns
    ///
    /// 成立したペアのリスト（通知は呼び出し側が行う）
    pub async fn sweep(&self) -> Vec<(ConnectionId, ConnectionId)> {
        let now = Timestamp::new(get_unix_timestamp());
        self.repository.sweep_matches(now).await
    }
}
