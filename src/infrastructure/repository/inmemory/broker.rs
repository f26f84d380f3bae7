//! InMemory Broker Repository 実装
//!
//! ドメイン層が定義する BrokerRepository trait の具体的な実装。
//! `Arc<Mutex<Broker>>` を保持し、各メソッドがロックを1回だけ取得する
//! ことで、待機プール・セッションテーブルへの変更を単一の直列化ポイント
//! に集約します。プール・セッションの変更自体はインメモリで非ブロッキング
//! です（await するのはロック取得のみ）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Broker, BrokerError, BrokerRepository, ChatType, Connection, ConnectionId, DisconnectCleanup,
    MatchOutcome, Preferences, StableId, Timestamp,
};

/// インメモリ Broker Repository 実装
pub struct InMemoryBrokerRepository {
    /// Broker ドメインモデル（単一の所有者）
    broker: Arc<Mutex<Broker>>,
}

impl InMemoryBrokerRepository {
    /// 新しい InMemoryBrokerRepository を作成
    pub fn new(broker: Arc<Mutex<Broker>>) -> Self {
        Self { broker }
    }
}

#[async_trait]
impl BrokerRepository for InMemoryBrokerRepository {
    async fn register_connection(&self, connection: Connection) -> Result<(), BrokerError> {
        let mut broker = self.broker.lock().await;
        broker.register(connection)
    }

    async fn unregister_connection(&self, id: &ConnectionId) -> DisconnectCleanup {
        let mut broker = self.broker.lock().await;
        broker.unregister(id)
    }

    async fn start_search(
        &self,
        id: &ConnectionId,
        preferences: Preferences,
        now: Timestamp,
    ) -> Result<MatchOutcome, BrokerError> {
        // エンキュー・走査・確定がこのロック1回の中で完結する
        let mut broker = self.broker.lock().await;
        broker.start_search(id, preferences, now)
    }

    async fn cancel_search(&self, id: &ConnectionId) -> bool {
        let mut broker = self.broker.lock().await;
        broker.cancel_search(id)
    }

    async fn partner_of(&self, id: &ConnectionId) -> Option<ConnectionId> {
        let broker = self.broker.lock().await;
        broker.partner_of(id)
    }

    async fn end_session(&self, id: &ConnectionId) -> Option<ConnectionId> {
        let mut broker = self.broker.lock().await;
        broker.end_session(id)
    }

    async fn stable_id_of(&self, id: &ConnectionId) -> Option<StableId> {
        let broker = self.broker.lock().await;
        broker.stable_id_of(id)
    }

    async fn sweep_matches(&self, now: Timestamp) -> Vec<(ConnectionId, ConnectionId)> {
        let mut broker = self.broker.lock().await;
        broker.sweep_matches(now)
    }

    async fn waiting_count(&self, chat_type: ChatType) -> usize {
        let broker = self.broker.lock().await;
        broker.waiting_count(chat_type)
    }

    async fn session_count(&self) -> usize {
        let broker = self.broker.lock().await;
        broker.session_count()
    }
}
