//! UseCase: チャットメッセージ送信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() / filter_text()
//! - 認可つき配送と、配送前の本文サニタイズ
//!
//! ### なぜこのテストが必要か
//! - チャット本文はシグナリングと同じ fail-closed 認可を通ることを保証
//! - フィルタは fail-open: マスク対象がなくても配送は止まらない
//!
//! ### どのような状況を想定しているか
//! - 正常系: パートナー宛のテキスト配送（マスクあり・なし）
//! - 異常系: セッション外からの送信

use std::sync::Arc;

use crate::domain::{BrokerRepository, ConnectionId, MessagePusher, ProfanityFilter};

use super::error::RelayError;

/// チャットメッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 本文サニタイズ用フィルタ
    filter: Arc<dyn ProfanityFilter>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        filter: Arc<dyn ProfanityFilter>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            filter,
        }
    }

    /// 配送前に本文をサニタイズ
    ///
    /// フィルタは常に成功します。呼び出し側は返り値をそのまま配送用の
    /// JSON に組み立てます。
    pub fn filter_text(&self, text: &str) -> String {
        self.filter.clean(text)
    }

    /// メッセージ配送を実行
    ///
    /// 認可はシグナリング転送と同じ: 送信者のセッションを解決し、宛先が
    /// 実際のパートナーでなければ配送しません（fail-closed）。
    pub async fn execute(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        message: &str,
    ) -> Result<(), RelayError> {
        let partner = self
            .repository
            .partner_of(from)
            .await
            .ok_or(RelayError::NoPartner)?;
        if partner != *to {
            return Err(RelayError::NotPartner);
        }
        self.message_pusher.push_to(&partner, message).await?;
        Ok(())
    }
}
