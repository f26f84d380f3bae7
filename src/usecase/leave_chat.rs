//! UseCase: チャット離脱
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveChatUseCase::execute() メソッド
//! - セッション解消・検索キャンセル・アイドル時 no-op の3分岐
//!
//! ### なぜこのテストが必要か
//! - 離脱はクライアントの現在状態によって効果が変わる操作であり、
//!   どの状態からでも安全に呼べることを保証する
//! - 離脱後に接続自体は維持される（再検索できる）ことが前提
//!
//! ### どのような状況を想定しているか
//! - 正常系: マッチ済みからの離脱（パートナーへの通知対象を返す）
//! - 正常系: 検索中の離脱（待機エントリの取り下げ）
//! - エッジケース: どの状態にもいないクライアントの離脱

use std::sync::Arc;

use crate::domain::{BrokerRepository, ConnectionId, MessagePushError, MessagePusher};

/// 離脱処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// セッションを解消した（残された側に通知が必要）
    SessionEnded { partner: ConnectionId },
    /// 待機エントリを取り下げた
    SearchCancelled,
    /// 何もしなかった（検索中でもマッチ済みでもない）
    Idle,
}

/// チャット離脱のユースケース
pub struct LeaveChatUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveChatUseCase {
    /// 新しい LeaveChatUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 離脱を実行
    ///
    /// セッションがあれば解消、なければ待機エントリの取り下げを試みます。
    /// 並行するマッチ確定と競合した場合は、先にコミットした方の結果を
    /// 観測します（セッション解消側に倒れる）。
    pub async fn execute(&self, connection_id: &ConnectionId) -> LeaveOutcome {
        if let Some(partner) = self.repository.end_session(connection_id).await {
            return LeaveOutcome::SessionEnded { partner };
        }
        if self.repository.cancel_search(connection_id).await {
            return LeaveOutcome::SearchCancelled;
        }
        LeaveOutcome::Idle
    }

    /// セッション解消を残された側に通知
    pub async fn notify_partner_left(
        &self,
        partner: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(partner, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Broker, ChatType, Connection, InterestTags, Preferences, StableId, Timestamp,
    };
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryBrokerRepository,
    };
    use tokio::sync::Mutex;

    fn create_test_repository() -> Arc<InMemoryBrokerRepository> {
        Arc::new(InMemoryBrokerRepository::new(Arc::new(Mutex::new(
            Broker::new(),
        ))))
    }

    fn connection(id: &str) -> Connection {
        Connection::new(
            ConnectionId::new(id.to_string()).unwrap(),
            StableId::new(format!("198.51.100.{}", id.len())).unwrap(),
            Timestamp::new(1000),
        )
    }

    fn open_prefs() -> Preferences {
        Preferences::new(ChatType::Video, None, InterestTags::none())
    }

    #[tokio::test]
    async fn test_leave_ends_session_and_reports_partner() {
        // テスト項目: マッチ済みからの離脱でセッションが解消される
        // given (前提条件):
        let repository = create_test_repository();
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = LeaveChatUseCase::new(repository.clone(), message_pusher);
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        let bob = ConnectionId::new("bob".to_string()).unwrap();
        repository.register_connection(connection("alice")).await.unwrap();
        repository.register_connection(connection("bob")).await.unwrap();
        repository
            .start_search(&alice, open_prefs(), Timestamp::new(1))
            .await
            .unwrap();
        repository
            .start_search(&bob, open_prefs(), Timestamp::new(2))
            .await
            .unwrap();

        // when (操作):
        let outcome = usecase.execute(&bob).await;

        // then (期待する結果): alice が通知対象になり、両方向のリンクが消える
        assert_eq!(outcome, LeaveOutcome::SessionEnded { partner: alice.clone() });
        assert_eq!(repository.partner_of(&alice).await, None);
        assert_eq!(repository.partner_of(&bob).await, None);
    }

    #[tokio::test]
    async fn test_leave_cancels_pending_search() {
        // テスト項目: 検索中の離脱で待機エントリが取り下げられる
        // given (前提条件):
        let repository = create_test_repository();
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = LeaveChatUseCase::new(repository.clone(), message_pusher);
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        repository.register_connection(connection("alice")).await.unwrap();
        repository
            .start_search(&alice, open_prefs(), Timestamp::new(1))
            .await
            .unwrap();

        // when (操作):
        let outcome = usecase.execute(&alice).await;

        // then (期待する結果):
        assert_eq!(outcome, LeaveOutcome::SearchCancelled);
        assert_eq!(repository.waiting_count(ChatType::Video).await, 0);
    }

    #[tokio::test]
    async fn test_leave_is_noop_when_idle() {
        // テスト項目: どの状態にもいないクライアントの離脱は no-op
        // given (前提条件):
        let repository = create_test_repository();
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = LeaveChatUseCase::new(repository.clone(), message_pusher);
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        repository.register_connection(connection("alice")).await.unwrap();

        // when (操作):
        let outcome = usecase.execute(&alice).await;

        // then (期待する結果):
        assert_eq!(outcome, LeaveOutcome::Idle);
    }
}
