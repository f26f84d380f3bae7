//! UseCase: 通報処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ReportUserUseCase::execute() / kick()
//! - 通報の追記 → カウント → 閾値到達で BAN の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - BAN は通報対象の接続ではなく安定識別子に対して記録され、
//!   再接続しても効き続けることを保証する
//! - 閾値未満では絶対に BAN されないこと（2件では BAN されない）
//!
//! ### どのような状況を想定しているか
//! - 正常系: 閾値未満の通報（記録のみ）
//! - 正常系: 閾値到達で BAN 成立
//! - 異常系: 未登録の接続を対象にした通報

use std::sync::Arc;

use crate::common::time::get_unix_timestamp;
use crate::domain::{
    BrokerRepository, ConnectionId, MessagePusher, ModerationRepository, Report, Timestamp,
};

use super::error::ReportError;

/// BAN レコードに記録する理由
const BAN_REASON: &str = "banned for repeated reports";

/// 通報処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// 通報を記録した（閾値未満）
    Recorded { count: usize },
    /// 閾値に到達し、対象を BAN した
    TargetBanned { reason: String },
}

/// 通報処理のユースケース
pub struct ReportUserUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// Moderation Repository（通報ログ・BAN レコード）
    moderation: Arc<dyn ModerationRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// BAN 発動の通報件数閾値
    ban_threshold: usize,
}

impl ReportUserUseCase {
    /// 新しい ReportUserUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        moderation: Arc<dyn ModerationRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        ban_threshold: usize,
    ) -> Self {
        Self {
            repository,
            moderation,
            message_pusher,
            ban_threshold,
        }
    }

    /// 通報を実行
    ///
    /// 通報は対象の接続 ID ではなく安定識別子に対して記録されます。
    /// 件数が閾値に達したら BAN レコードを作成します。対象の切断自体は
    /// 呼び出し側が `kick` で行います（通知メッセージの組み立ては UI 層）。
    pub async fn execute(
        &self,
        reporter: &ConnectionId,
        target: &ConnectionId,
        reason: String,
        details: String,
    ) -> Result<ReportOutcome, ReportError> {
        let reporter_stable_id = self
            .repository
            .stable_id_of(reporter)
            .await
            .ok_or(ReportError::UnknownReporter)?;
        let target_stable_id = self
            .repository
            .stable_id_of(target)
            .await
            .ok_or(ReportError::UnknownTarget)?;

        let now = Timestamp::new(get_unix_timestamp());
        self.moderation
            .append_report(Report::new(
                reporter_stable_id,
                target_stable_id.clone(),
                reason,
                details,
                now,
            ))
            .await?;

        let count = self.moderation.count_reports(&target_stable_id).await?;
        if count < self.ban_threshold {
            return Ok(ReportOutcome::Recorded { count });
        }

        self.moderation
            .set_ban(&target_stable_id, BAN_REASON, now)
            .await?;
        // set_ban は先勝ちのため、記録済みの理由を読み直して返す
        let reason = self
            .moderation
            .get_ban(&target_stable_id)
            .await?
            .map(|ban| ban.reason)
            .unwrap_or_else(|| BAN_REASON.to_string());
        Ok(ReportOutcome::TargetBanned { reason })
    }

    /// BAN した対象に通知を送り、強制切断する
    ///
    /// チャンネルの登録解除で対象のポンプループが（通知を流し切った後で）
    /// 終了し、通常の切断掃除が走ります。通知の失敗は切断を妨げません。
    pub async fn kick(&self, target: &ConnectionId, banned_message: &str) {
        if let Err(e) = self.message_pusher.push_to(target, banned_message).await {
            tracing::warn!("Failed to push ban notice to '{}': {}", target, e);
        }
        self.message_pusher.unregister_client(target).await;
    }
}
